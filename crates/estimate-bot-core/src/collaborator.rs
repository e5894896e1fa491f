//! Port traits for the GitHub API.
//!
//! The reminder logic only needs three capabilities: obtain a client scoped
//! to an installation, list recent comments on an issue, and create a
//! comment. Infrastructure crates implement these against the real API.

use crate::{InstallationId, IssueRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A comment on an issue, reduced to what the bot inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Failures reported by a collaborator implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// App identity or key material is missing or unusable
    #[error("GitHub App configuration error: {message}")]
    Configuration { message: String },

    /// GitHub refused the app or installation credentials
    #[error("GitHub authentication failed: {message}")]
    Authentication { message: String },

    /// Any other API or transport failure
    #[error("GitHub API call failed: {message}")]
    Upstream { message: String },
}

/// Installation-scoped operations on issue comments.
#[async_trait]
pub trait IssueCommentClient: Send + Sync {
    /// List comments on `issue` created or updated at or after `since`.
    async fn list_recent_comments(
        &self,
        issue: &IssueRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, CollaboratorError>;

    /// Create a comment on `issue`.
    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<IssueComment, CollaboratorError>;
}

/// Source of installation-scoped clients.
///
/// Each call performs its own authentication handshake; clients are not
/// cached or shared between deliveries.
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn acquire_client(
        &self,
        installation_id: InstallationId,
    ) -> Result<Arc<dyn IssueCommentClient>, CollaboratorError>;
}
