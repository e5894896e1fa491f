//! Reminder decision for newly opened issues.
//!
//! Idempotency rests entirely on the issue's remote comment history: every
//! reminder starts with [`REMINDER_MARKER`], and a delivery that finds the
//! marker among recent comments does not post again. No in-process state is
//! kept, so any number of service replicas can handle redeliveries.

use crate::collaborator::{ClientProvider, IssueCommentClient};
use crate::estimate::has_estimate;
use crate::pipeline::WebhookError;
use crate::routing::{missing_field, IssueOpenedPayload};
use crate::{Decision, IssueRef};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Fingerprint placed at the very start of every comment the bot writes.
///
/// It is an HTML comment, so it does not render on GitHub.
pub const REMINDER_MARKER: &str = "<!-- estimate-reminder -->";

/// Default window searched for an earlier reminder.
///
/// A bound on API cost, not a correctness guarantee: a redelivery of an
/// `opened` event older than the window would post a second reminder.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Render the reminder comment addressed to `author`.
pub fn compose_reminder(author: &str) -> String {
    format!(
        "{}Hi @{}! Please add an estimate in the format **\"Estimate: X days\"** \
         to help us plan and schedule work. Thanks!",
        REMINDER_MARKER, author
    )
}

/// Decides whether an opened issue needs a reminder and posts it.
#[derive(Clone)]
pub struct ReminderCoordinator {
    provider: Arc<dyn ClientProvider>,
    lookback: Duration,
}

impl ReminderCoordinator {
    /// Create a coordinator using the default 30-day lookback.
    pub fn new(provider: Arc<dyn ClientProvider>) -> Self {
        Self {
            provider,
            lookback: Duration::days(DEFAULT_LOOKBACK_DAYS),
        }
    }

    /// Override the window searched for an earlier reminder.
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Handle one `issues.opened` delivery.
    ///
    /// No GitHub call is made when the body already carries an estimate. A
    /// failed comment lookup counts as "no reminder found"; a failed client
    /// acquisition or comment creation is returned as an error. Nothing is
    /// retried here; GitHub redelivers on a non-2xx response.
    ///
    /// # Errors
    ///
    /// - [`WebhookError::MalformedPayload`] when a reminder is needed but the delivery names no installation
    /// - [`WebhookError::ClientUnavailable`] when no installation client can be obtained
    /// - [`WebhookError::CommentFailed`] when the reminder cannot be created
    #[instrument(skip(self, payload), fields(issue = %payload.issue_ref(), author = %payload.author))]
    pub async fn handle(&self, payload: &IssueOpenedPayload) -> Result<Decision, WebhookError> {
        if has_estimate(&payload.issue_body) {
            info!("Estimate found; no action needed");
            return Ok(Decision::EstimatePresent);
        }

        let installation_id = payload
            .installation_id
            .ok_or_else(|| missing_field("installation"))?;

        let client = self
            .provider
            .acquire_client(installation_id)
            .await
            .map_err(|e| {
                error!(
                    installation_id = %installation_id,
                    error = %e,
                    "Failed to create installation client"
                );
                WebhookError::ClientUnavailable(e)
            })?;

        let issue = payload.issue_ref();
        if self.reminder_exists(client.as_ref(), &issue).await {
            info!("Existing reminder found; skipping new comment");
            return Ok(Decision::ReminderAlreadyPosted);
        }

        let body = compose_reminder(&payload.author);
        let comment = client.create_comment(&issue, &body).await.map_err(|e| {
            error!(error = %e, "Failed to create reminder comment");
            WebhookError::CommentFailed(e)
        })?;

        info!(comment_id = comment.id, "Reminder comment posted");
        Ok(Decision::ReminderPosted)
    }

    async fn reminder_exists(&self, client: &dyn IssueCommentClient, issue: &IssueRef) -> bool {
        let since = Utc::now() - self.lookback;

        match client.list_recent_comments(issue, since).await {
            Ok(comments) => comments
                .iter()
                .any(|comment| comment.body.contains(REMINDER_MARKER)),
            Err(e) => {
                warn!(error = %e, "Reminder lookup failed; assuming no earlier reminder");
                false
            }
        }
    }
}

impl std::fmt::Debug for ReminderCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderCoordinator")
            .field("provider", &"<ClientProvider>")
            .field("lookback_days", &self.lookback.num_days())
            .finish()
    }
}

#[cfg(test)]
#[path = "reminder_tests.rs"]
mod tests;
