//! Event classification and `issues.opened` payload decoding.
//!
//! Only `issues` events with the `opened` action reach the reminder logic.
//! Everything else is acknowledged and dropped before any GitHub call.

use crate::pipeline::WebhookError;
use crate::{IgnoreReason, InstallationId, IssueRef};
use serde::Deserialize;
use tracing::debug;

/// Event type tag for issue events.
pub const ISSUES_EVENT: &str = "issues";

/// Action that triggers the estimate check.
pub const OPENED_ACTION: &str = "opened";

/// Decoded view of an `issues.opened` delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOpenedPayload {
    pub owner: String,
    pub repo_name: String,
    pub issue_number: u64,
    pub author: String,
    pub issue_body: String,

    /// Absent when the delivery carries no `installation` object; only
    /// needed once a reminder has to be posted
    pub installation_id: Option<InstallationId>,
}

impl IssueOpenedPayload {
    /// Reference to the issue this payload describes
    pub fn issue_ref(&self) -> IssueRef {
        IssueRef::new(&self.owner, &self.repo_name, self.issue_number)
    }
}

/// Routing result for an authenticated event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Proceed(IssueOpenedPayload),
    Ignored(IgnoreReason),
}

// ============================================================================
// Wire model
// ============================================================================

// Nothing is required at the top level; a missing or null `action` reads as
// "not opened".
#[derive(Debug, Deserialize)]
struct IssuesEventPayload {
    #[serde(default)]
    action: Option<String>,
    issue: Option<IssuePayload>,
    repository: Option<RepositoryPayload>,
    installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    number: u64,
    body: Option<String>,
    user: AccountPayload,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    owner: AccountPayload,
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct InstallationPayload {
    id: u64,
}

// ============================================================================
// Router
// ============================================================================

/// Classifies events by type and action.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRouter;

impl EventRouter {
    pub fn new() -> Self {
        Self
    }

    /// Classify an authenticated event.
    ///
    /// The body is only decoded for `issues` events.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MalformedPayload`] when an `issues` body does
    /// not start with a JSON object of the expected shape, or when an
    /// `opened` delivery has no `issue` or `repository`.
    pub fn route(&self, event_type: &str, body: &[u8]) -> Result<Route, WebhookError> {
        if event_type != ISSUES_EVENT {
            debug!(event_type = %event_type, "Ignoring unsupported event type");
            return Ok(Route::Ignored(IgnoreReason::UnsupportedEvent));
        }

        let event = decode_first_value(body)?;

        if event.action.as_deref() != Some(OPENED_ACTION) {
            debug!(
                action = event.action.as_deref().unwrap_or("-"),
                "Ignoring non-opened issues action"
            );
            return Ok(Route::Ignored(IgnoreReason::NonOpenedAction));
        }

        Ok(Route::Proceed(Self::into_opened_payload(event)?))
    }

    fn into_opened_payload(event: IssuesEventPayload) -> Result<IssueOpenedPayload, WebhookError> {
        let issue = event.issue.ok_or_else(|| missing_field("issue"))?;
        let repository = event.repository.ok_or_else(|| missing_field("repository"))?;

        Ok(IssueOpenedPayload {
            owner: repository.owner.login,
            repo_name: repository.name,
            issue_number: issue.number,
            author: issue.user.login,
            issue_body: issue.body.unwrap_or_default(),
            installation_id: event
                .installation
                .map(|installation| InstallationId::new(installation.id)),
        })
    }
}

/// Decode the first JSON value in `body`; anything after it is not read.
fn decode_first_value(body: &[u8]) -> Result<IssuesEventPayload, WebhookError> {
    let malformed = |message: String| WebhookError::MalformedPayload { message };

    serde_json::Deserializer::from_slice(body)
        .into_iter::<IssuesEventPayload>()
        .next()
        .ok_or_else(|| malformed("empty body".to_string()))?
        .map_err(|e| malformed(e.to_string()))
}

pub(crate) fn missing_field(field: &str) -> WebhookError {
    WebhookError::MalformedPayload {
        message: format!("missing required field: {}", field),
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod tests;
