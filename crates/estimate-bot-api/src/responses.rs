//! Success responses for the webhook endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use estimate_bot_core::{Decision, IgnoreReason};

/// Plaintext acknowledgement of a handled delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionResponse(pub Decision);

impl DecisionResponse {
    /// Status code and body token for the wrapped decision.
    pub fn status_and_body(&self) -> (StatusCode, &'static str) {
        match self.0 {
            Decision::EstimatePresent => (StatusCode::OK, "estimate present"),
            Decision::ReminderAlreadyPosted => (StatusCode::OK, "reminder already posted"),
            Decision::ReminderPosted => (StatusCode::OK, "comment posted"),
            Decision::Ignored(IgnoreReason::UnsupportedEvent) => (StatusCode::OK, "ignored"),
            Decision::Ignored(IgnoreReason::NonOpenedAction) => {
                (StatusCode::OK, "non-opened action ignored")
            }
            Decision::AuthFailed => (StatusCode::UNAUTHORIZED, "signature verification failed"),
            Decision::Error => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        }
    }
}

impl IntoResponse for DecisionResponse {
    fn into_response(self) -> Response {
        self.status_and_body().into_response()
    }
}
