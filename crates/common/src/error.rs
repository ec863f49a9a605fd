use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Which URL field of the intake form failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlField {
    Webhook,
    Rpc,
}

impl std::fmt::Display for UrlField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlField::Webhook => write!(f, "webhook"),
            UrlField::Rpc => write!(f, "RPC"),
        }
    }
}

/// Client-caused rejection of a form submission.
///
/// The `Display` text is the exact reason returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid {0} URL")]
    InvalidUrl(UrlField),

    #[error("Invalid network")]
    UnsupportedNetwork(String),

    #[error("Invalid address format")]
    MalformedAddress,

    #[error("Invalid alert balance")]
    InvalidThreshold,
}

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Template error: {0}")]
    Template(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(reason) => (StatusCode::BAD_REQUEST, reason.to_string()),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render page".to_string(),
            ),
            AppError::Io(_) | AppError::TomlSerialize(_) | AppError::TomlParse(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_reasons() {
        assert_eq!(
            ValidationError::InvalidUrl(UrlField::Webhook).to_string(),
            "Invalid webhook URL"
        );
        assert_eq!(
            ValidationError::InvalidUrl(UrlField::Rpc).to_string(),
            "Invalid RPC URL"
        );
        assert_eq!(
            ValidationError::UnsupportedNetwork("Dogecoin".into()).to_string(),
            "Invalid network"
        );
        assert_eq!(
            ValidationError::MalformedAddress.to_string(),
            "Invalid address format"
        );
        assert_eq!(
            ValidationError::InvalidThreshold.to_string(),
            "Invalid alert balance"
        );
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = AppError::from(ValidationError::MalformedAddress).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_io_maps_to_internal_error() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_template_maps_to_internal_error() {
        let response = AppError::Template("form.html missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
