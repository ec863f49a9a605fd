//! Intake form page.

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use beacon_common::error::AppError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(show_form))
}

/// GET / — Render the intake form with the supported networks as options.
async fn show_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    state.templates.render_form(&state.networks).await
}
