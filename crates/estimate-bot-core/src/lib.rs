//! # Estimate Bot Core
//!
//! Decision logic for the issue estimate reminder bot.
//!
//! The bot watches `issues` webhooks and, when a newly opened issue does not
//! carry an `Estimate: X days` annotation, posts a single reminder comment
//! addressed to the author.
//!
//! ## Architecture
//!
//! - [`estimate`] detects a conforming annotation in free text
//! - [`signature`] authenticates the raw webhook body
//! - [`routing`] classifies events and decodes `issues.opened` payloads
//! - [`reminder`] decides whether a reminder is needed and posts it
//! - [`pipeline`] composes the above into one call per inbound request
//!
//! All GitHub access goes through the traits in [`collaborator`], so the
//! decision logic runs against in-memory fakes in tests.
//!
//! ## Usage
//!
//! ```rust
//! use estimate_bot_core::estimate::has_estimate;
//!
//! assert!(has_estimate("Estimate: 2 days"));
//! assert!(!has_estimate("ETA: 2d"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

pub mod collaborator;
pub mod estimate;
pub mod pipeline;
pub mod reminder;
pub mod routing;
pub mod signature;

#[cfg(test)]
mod test_support;

pub use collaborator::{ClientProvider, CollaboratorError, IssueComment, IssueCommentClient};
pub use pipeline::{InboundEvent, WebhookError, WebhookPipeline};
pub use reminder::{compose_reminder, ReminderCoordinator, REMINDER_MARKER};
pub use routing::{EventRouter, IssueOpenedPayload, Route};

// ============================================================================
// Domain Identifier Types
// ============================================================================

/// GitHub App installation identifier carried by every app webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallationId(u64);

impl InstallationId {
    /// Create new installation ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified reference to a single issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

// ============================================================================
// Secrets
// ============================================================================

/// Shared webhook secret.
///
/// The bytes are wiped when the value is dropped and are never included in
/// `Debug` output.
#[derive(Clone)]
pub struct WebhookSecret {
    inner: Zeroizing<Vec<u8>>,
}

impl WebhookSecret {
    /// Create secret from its raw (not hex or Base64 encoded) value
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: Zeroizing::new(value.into()),
        }
    }

    /// Get secret bytes (only for immediate use)
    pub fn expose_bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Check if secret is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get secret length without exposing content
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecret")
            .field("length", &self.len())
            .field("value", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Decisions
// ============================================================================

/// Why an authenticated event was acknowledged without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The `X-GitHub-Event` type is not `issues`
    UnsupportedEvent,

    /// An `issues` event whose action is not `opened`
    NonOpenedAction,
}

/// Terminal outcome of handling one webhook delivery.
///
/// Never stored; it only shapes the HTTP response and the final log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The issue body already carries a conforming estimate
    EstimatePresent,

    /// A comment carrying the reminder marker already exists
    ReminderAlreadyPosted,

    /// A new reminder comment was created
    ReminderPosted,

    /// The event is not one the bot acts on
    Ignored(IgnoreReason),

    /// Signature verification failed
    AuthFailed,

    /// Configuration, decoding or upstream failure
    Error,
}

impl Decision {
    /// Short machine-friendly label used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EstimatePresent => "estimate_present",
            Self::ReminderAlreadyPosted => "reminder_already_posted",
            Self::ReminderPosted => "reminder_posted",
            Self::Ignored(_) => "ignored",
            Self::AuthFailed => "auth_failed",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
