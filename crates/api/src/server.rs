//! HTTP/1 accept loop with per-connection timeouts and a bounded drain.
//!
//! `axum::serve` has no connection-level knobs, so connections are driven
//! by hyper directly and the router is adapted with `TowerToHyperService`.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;

/// Connection-level limits for [`serve`].
#[derive(Debug, Clone, Copy)]
pub struct ServeOptions {
    /// How long a connection may take to deliver a request head. This also
    /// bounds how long an idle keep-alive connection waits for its next
    /// request.
    pub idle_timeout: Duration,
    /// How long open connections may drain once `shutdown` resolves
    pub shutdown_grace: Duration,
}

/// Accept connections until `shutdown` resolves, then stop accepting and
/// give open connections `shutdown_grace` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    options: ServeOptions,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    let mut shutdown = std::pin::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    // Usually fd exhaustion; back off instead of spinning.
                    tracing::warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
            _ = &mut shutdown => break,
        };

        let io = TokioIo::new(stream);
        let service = TowerToHyperService::new(app.clone());
        let conn = http1::Builder::new()
            .timer(TokioTimer::new())
            .header_read_timeout(options.idle_timeout)
            .keep_alive(true)
            .serve_connection(io, service);
        let conn = graceful.watch(conn);

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(%peer, error = %e, "Connection closed with error");
            }
        });
    }

    drop(listener);

    tokio::select! {
        _ = graceful.shutdown() => {
            tracing::info!("All connections drained");
        }
        _ = tokio::time::sleep(options.shutdown_grace) => {
            tracing::warn!(
                grace_secs = options.shutdown_grace.as_secs(),
                "In-flight requests did not finish in time, forcing shutdown"
            );
        }
    }

    Ok(())
}
