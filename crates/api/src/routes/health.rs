//! Health check endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "beacon-intake",
        "version": env!("CARGO_PKG_VERSION"),
        "write_policy": state.config_writer.policy().to_string(),
        "monitor": state.launcher.status(),
    }))
}
