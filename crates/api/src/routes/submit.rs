//! Form submission: validate, persist, redirect.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::response::Redirect;
use axum::routing::post;

use beacon_common::error::AppError;
use beacon_common::types::RawSubmission;
use beacon_engine::validator::Validator;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/submit", post(submit))
}

/// POST /submit — Validate the form, write the monitor config then the env
/// file, and redirect to the confirmation page.
///
/// A rejected submission returns 400 with the reason and touches no file.
async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Redirect, AppError> {
    let raw = parse_form(&headers, &body);

    let submission = Validator::validate(&state.networks, &raw).inspect_err(|reason| {
        tracing::info!(%reason, network = %raw.network, "Submission rejected");
    })?;

    let record = &submission.record;
    tracing::info!(
        address = %record.address,
        chain = %record.chain,
        rpc_url = %record.rpc_url,
        alert_balance = record.alert_balance,
        "Received intake submission"
    );
    tracing::debug!(webhook_url = %submission.webhook_url, "Submission webhook");

    // Both files must describe the same submission.
    let _guard = state.submission_lock.lock().await;
    state.config_writer.write(record).await?;
    state.env_writer.append_webhook(&submission.webhook_url).await?;

    Ok(Redirect::to("/start"))
}

/// Decode a url-encoded body, keeping the first value of a repeated field.
/// Any other content type yields empty fields, which fail validation.
fn parse_form(headers: &HeaderMap, body: &[u8]) -> RawSubmission {
    let is_form = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        });

    if !is_form {
        return RawSubmission::default();
    }

    RawSubmission::from_pairs(url::form_urlencoded::parse(body))
}
