pub mod form;
pub mod health;
pub mod start;
pub mod submit;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::middleware::security::with_security_headers;
use crate::state::AppState;

/// Build the complete router with all routes, body/timeout limits and
/// security headers.
pub fn create_router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout;

    let router = Router::new()
        .merge(form::router())
        .merge(submit::router())
        .merge(start::router())
        .merge(health::router())
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    with_security_headers(router)
}
