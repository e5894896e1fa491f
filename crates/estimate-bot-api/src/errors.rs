//! Error types for the HTTP service

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use estimate_bot_core::WebhookError;
use tracing::{error, warn};

/// Webhook handler errors with HTTP status code mapping
///
/// Response bodies are short plaintext tokens; the detailed error is only
/// logged.
///
/// - `400 Bad Request`: unreadable body or undecodable payload
/// - `401 Unauthorized`: signature verification failed
/// - `413 Payload Too Large`: body over the configured limit
/// - `500 Internal Server Error`: GitHub could not be reached or refused the
///   request; GitHub's redelivery may retry
#[derive(Debug, thiserror::Error)]
pub enum WebhookHandlerError {
    /// Webhook processing pipeline failure
    #[error("Processing failed: {0}")]
    ProcessingFailed(#[from] WebhookError),

    /// The request body could not be read
    #[error("Failed to read request body: {message}")]
    BodyUnreadable { message: String },

    /// The request body exceeded `server.max_body_size`
    #[error("Payload too large: {message}")]
    PayloadTooLarge { message: String },
}

impl From<BytesRejection> for WebhookHandlerError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge {
                message: rejection.body_text(),
            }
        } else {
            Self::BodyUnreadable {
                message: rejection.body_text(),
            }
        }
    }
}

impl WebhookHandlerError {
    /// Status code and plaintext body sent to the caller.
    pub fn status_and_body(&self) -> (StatusCode, &'static str) {
        match self {
            Self::ProcessingFailed(e) => match e {
                WebhookError::InvalidSignature => {
                    (StatusCode::UNAUTHORIZED, "signature verification failed")
                }
                WebhookError::MalformedPayload { .. } => (StatusCode::BAD_REQUEST, "bad payload"),
                WebhookError::ClientUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to auth")
                }
                WebhookError::CommentFailed(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "failed to comment")
                }
            },
            Self::BodyUnreadable { .. } => (StatusCode::BAD_REQUEST, "failed to read body"),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "payload too large"),
        }
    }
}

impl IntoResponse for WebhookHandlerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();

        if status.is_server_error() {
            error!(error = %self, status = %status, "Webhook handling failed");
        } else {
            warn!(error = %self, status = %status, "Webhook rejected");
        }

        (status, body).into_response()
    }
}

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to bind to address {address}: {message}")]
    BindFailed { address: String, message: String },

    #[error("Server failed: {message}")]
    ServerFailed { message: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl ServiceError {
    /// Process exit code reported by the service binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::BindFailed { .. } => 1,
            Self::ServerFailed { .. } => 2,
            Self::Configuration(_) => 3,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
