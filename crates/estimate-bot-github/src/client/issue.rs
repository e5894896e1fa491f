//! Issue comment operations.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::installation::{error_from_response, InstallationClient};
use crate::error::ApiError;
use estimate_bot_core::{CollaboratorError, IssueComment, IssueCommentClient, IssueRef};

/// Largest page size GitHub accepts.
const MAX_PER_PAGE: &str = "100";

/// Comment on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,

    /// Markdown body; GitHub omits it for some minimized comments
    #[serde(default)]
    pub body: Option<String>,

    pub user: IssueUser,
    pub created_at: DateTime<Utc>,
}

/// User associated with a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUser {
    pub login: String,
    pub id: u64,
}

/// Request to create a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

impl From<Comment> for IssueComment {
    fn from(comment: Comment) -> Self {
        IssueComment {
            id: comment.id,
            body: comment.body.unwrap_or_default(),
            author: comment.user.login,
            created_at: comment.created_at,
        }
    }
}

fn comments_path(issue: &IssueRef) -> String {
    format!(
        "/repos/{}/{}/issues/{}/comments",
        issue.owner, issue.repo, issue.number
    )
}

impl InstallationClient {
    /// List comments on an issue updated at or after `since`.
    ///
    /// Only the first page (up to 100 comments) is fetched.
    pub async fn list_issue_comments(
        &self,
        issue: &IssueRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, ApiError> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        let query = [("since", since.as_str()), ("per_page", MAX_PER_PAGE)];

        let response = self.get(&comments_path(issue), &query).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Create a comment on an issue.
    pub async fn create_issue_comment(
        &self,
        issue: &IssueRef,
        request: CreateCommentRequest,
    ) -> Result<Comment, ApiError> {
        let response = self.post(&comments_path(issue), &request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl IssueCommentClient for InstallationClient {
    #[instrument(skip(self, issue), fields(issue = %issue))]
    async fn list_recent_comments(
        &self,
        issue: &IssueRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, CollaboratorError> {
        let comments = self.list_issue_comments(issue, since).await?;
        Ok(comments.into_iter().map(IssueComment::from).collect())
    }

    #[instrument(skip(self, issue, body), fields(issue = %issue))]
    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<IssueComment, CollaboratorError> {
        let request = CreateCommentRequest {
            body: body.to_string(),
        };
        let comment = self.create_issue_comment(issue, request).await?;
        Ok(comment.into())
    }
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
