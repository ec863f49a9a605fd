//! Beacon intake server binary entrypoint.

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use beacon_common::config::AppConfig;
use beacon_common::types::NetworkRegistry;

use beacon_api::routes::create_router;
use beacon_api::server::{ServeOptions, serve};
use beacon_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (also loads .env, which may set RUST_LOG)
    let config = AppConfig::from_env()?;

    init_tracing();

    tracing::info!("Starting Beacon intake server...");

    let networks = NetworkRegistry::builtin();
    tracing::info!(
        networks = networks.len(),
        config_path = %config.config_path.display(),
        env_path = %config.env_path.display(),
        write_policy = %config.write_policy,
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let options = ServeOptions {
        idle_timeout: config.idle_timeout,
        shutdown_grace: config.shutdown_grace,
    };

    // Build application state
    let state = AppState::new(config, networks);
    let launcher = state.launcher.clone();

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    serve(listener, app, options, shutdown_signal()).await?;

    launcher.shutdown();
    tracing::info!("Beacon intake server stopped.");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("beacon_api=debug,beacon_engine=debug,tower_http=debug")
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal, draining in-flight requests...");
}
