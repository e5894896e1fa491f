//! Per-delivery processing: authenticate, classify, decide.
//!
//! See [`WebhookPipeline::process`] for the full control flow.

use crate::collaborator::CollaboratorError;
use crate::reminder::ReminderCoordinator;
use crate::routing::{EventRouter, Route};
use crate::{signature, Decision, WebhookSecret};
use bytes::Bytes;
use tracing::{info, instrument, warn};

/// Header-derived fields and raw body of one webhook delivery.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// `X-GitHub-Event`; empty when the header is absent
    pub event_type: String,

    /// `X-Hub-Signature-256`; empty when the header is absent
    pub signature: String,

    /// `X-GitHub-Delivery`, used only for log correlation
    pub delivery_id: Option<String>,

    pub body: Bytes,
}

impl InboundEvent {
    pub fn new(event_type: impl Into<String>, signature: impl Into<String>, body: Bytes) -> Self {
        Self {
            event_type: event_type.into(),
            signature: signature.into(),
            delivery_id: None,
            body,
        }
    }

    pub fn with_delivery_id(mut self, delivery_id: impl Into<String>) -> Self {
        self.delivery_id = Some(delivery_id.into());
        self
    }
}

/// Failures that end processing of a delivery.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Missing, malformed or mismatching `X-Hub-Signature-256`
    #[error("Signature verification failed")]
    InvalidSignature,

    /// An `issues` body that cannot be decoded
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// No installation-scoped client could be obtained
    #[error("Installation client unavailable: {0}")]
    ClientUnavailable(#[source] CollaboratorError),

    /// The reminder comment could not be created
    #[error("Reminder comment failed: {0}")]
    CommentFailed(#[source] CollaboratorError),
}

impl WebhookError {
    /// Check if the failure is caused by the request itself (4xx).
    ///
    /// Client errors are final; server errors are left to GitHub's
    /// redelivery.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidSignature | Self::MalformedPayload { .. })
    }

    /// Terminal decision recorded for this failure
    pub fn decision(&self) -> Decision {
        match self {
            Self::InvalidSignature => Decision::AuthFailed,
            Self::MalformedPayload { .. } | Self::ClientUnavailable(_) | Self::CommentFailed(_) => {
                Decision::Error
            }
        }
    }
}

/// Composes signature verification, routing and the reminder decision.
#[derive(Debug, Clone)]
pub struct WebhookPipeline {
    secret: WebhookSecret,
    router: EventRouter,
    coordinator: ReminderCoordinator,
}

impl WebhookPipeline {
    pub fn new(secret: WebhookSecret, coordinator: ReminderCoordinator) -> Self {
        Self {
            secret,
            router: EventRouter::new(),
            coordinator,
        }
    }

    /// Process one delivery.
    ///
    /// 1. Verify the body signature; failure ends with no further work.
    /// 2. Classify the event; anything but `issues.opened` is ignored.
    /// 3. Hand the decoded payload to the [`ReminderCoordinator`].
    ///
    /// # Errors
    ///
    /// See [`WebhookError`]; `InvalidSignature` and `MalformedPayload` never
    /// involve a GitHub call.
    #[instrument(skip(self, event), fields(
        event_type = %event.event_type,
        delivery_id = event.delivery_id.as_deref().unwrap_or("-"),
    ))]
    pub async fn process(&self, event: &InboundEvent) -> Result<Decision, WebhookError> {
        if !signature::verify(&event.signature, &event.body, self.secret.expose_bytes()) {
            warn!("Webhook signature verification failed");
            return Err(WebhookError::InvalidSignature);
        }

        match self.router.route(&event.event_type, &event.body)? {
            Route::Ignored(reason) => Ok(Decision::Ignored(reason)),
            Route::Proceed(payload) => {
                info!(
                    owner = %payload.owner,
                    repo = %payload.repo_name,
                    issue = payload.issue_number,
                    author = %payload.author,
                    "issues.opened received"
                );
                self.coordinator.handle(&payload).await
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
