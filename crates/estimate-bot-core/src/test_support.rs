//! In-memory GitHub fake shared by the unit tests.

use crate::collaborator::{ClientProvider, CollaboratorError, IssueComment, IssueCommentClient};
use crate::{InstallationId, IssueRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    comments: Vec<(IssueRef, IssueComment)>,
    acquired: Vec<InstallationId>,
    list_since: Vec<DateTime<Utc>>,
    created: Vec<(IssueRef, String)>,
    acquire_error: Option<CollaboratorError>,
    list_error: Option<CollaboratorError>,
    create_error: Option<CollaboratorError>,
}

/// Acts as both the client provider and the installation client.
///
/// Comments created through the fake become visible to later listings, so
/// redelivery scenarios can be exercised end to end.
#[derive(Clone, Default)]
pub struct FakeGitHub {
    state: Arc<Mutex<FakeState>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(self, issue: &IssueRef, body: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.comments.len() as u64 + 1;
            state.comments.push((
                issue.clone(),
                IssueComment {
                    id,
                    body: body.to_string(),
                    author: "someone".to_string(),
                    created_at: Utc::now(),
                },
            ));
        }
        self
    }

    pub fn fail_acquire(self, error: CollaboratorError) -> Self {
        self.state.lock().unwrap().acquire_error = Some(error);
        self
    }

    pub fn fail_list(self, error: CollaboratorError) -> Self {
        self.state.lock().unwrap().list_error = Some(error);
        self
    }

    pub fn fail_create(self, error: CollaboratorError) -> Self {
        self.state.lock().unwrap().create_error = Some(error);
        self
    }

    pub fn acquire_count(&self) -> usize {
        self.state.lock().unwrap().acquired.len()
    }

    pub fn acquired_installations(&self) -> Vec<InstallationId> {
        self.state.lock().unwrap().acquired.clone()
    }

    pub fn list_count(&self) -> usize {
        self.state.lock().unwrap().list_since.len()
    }

    pub fn list_since(&self) -> Vec<DateTime<Utc>> {
        self.state.lock().unwrap().list_since.clone()
    }

    pub fn created(&self) -> Vec<(IssueRef, String)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn create_count(&self) -> usize {
        self.state.lock().unwrap().created.len()
    }

    pub fn total_calls(&self) -> usize {
        self.acquire_count() + self.list_count() + self.create_count()
    }
}

#[async_trait]
impl ClientProvider for FakeGitHub {
    async fn acquire_client(
        &self,
        installation_id: InstallationId,
    ) -> Result<Arc<dyn IssueCommentClient>, CollaboratorError> {
        let mut state = self.state.lock().unwrap();
        state.acquired.push(installation_id);
        if let Some(error) = state.acquire_error.clone() {
            return Err(error);
        }
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl IssueCommentClient for FakeGitHub {
    async fn list_recent_comments(
        &self,
        issue: &IssueRef,
        since: DateTime<Utc>,
    ) -> Result<Vec<IssueComment>, CollaboratorError> {
        let mut state = self.state.lock().unwrap();
        state.list_since.push(since);
        if let Some(error) = state.list_error.clone() {
            return Err(error);
        }
        Ok(state
            .comments
            .iter()
            .filter(|(on, comment)| on == issue && comment.created_at >= since)
            .map(|(_, comment)| comment.clone())
            .collect())
    }

    async fn create_comment(
        &self,
        issue: &IssueRef,
        body: &str,
    ) -> Result<IssueComment, CollaboratorError> {
        let mut state = self.state.lock().unwrap();
        state.created.push((issue.clone(), body.to_string()));
        if let Some(error) = state.create_error.clone() {
            return Err(error);
        }
        let comment = IssueComment {
            id: state.comments.len() as u64 + 1,
            body: body.to_string(),
            author: "estimate-bot[bot]".to_string(),
            created_at: Utc::now(),
        };
        state.comments.push((issue.clone(), comment.clone()));
        Ok(comment)
    }
}
