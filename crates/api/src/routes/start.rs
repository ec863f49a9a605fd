//! Confirmation page that kicks off the external monitor.

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use beacon_common::error::AppError;
use beacon_engine::launcher::LaunchOutcome;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/start", get(start))
}

/// GET /start — Render the confirmation page and start the monitor in the
/// background. The response never waits on the monitor process.
async fn start(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = state.templates.render_start().await?;

    match state.launcher.launch() {
        LaunchOutcome::Started => tracing::info!("Monitor launch requested"),
        LaunchOutcome::AlreadyRunning => {
            tracing::debug!("Monitor launch skipped, previous run still active")
        }
    }

    Ok(page)
}
