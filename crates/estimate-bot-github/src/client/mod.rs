//! GitHub API client for the app and its installations.
//!
//! [`GitHubAppClientProvider`] authenticates as the app and exchanges the
//! app JWT for an installation token. The resulting [`InstallationClient`]
//! carries that token for the issue comment calls.

mod installation;
mod issue;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::auth::{AppCredentialSource, InstallationToken, RS256JwtGenerator};
use crate::error::{ApiError, AuthError};
use estimate_bot_core::{ClientProvider, CollaboratorError, InstallationId, IssueCommentClient};

pub use installation::InstallationClient;
pub use issue::{Comment, CreateCommentRequest, IssueUser};

/// `Accept` header for the GitHub REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// REST API version pinned on every request.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// HTTP settings shared by app and installation requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub github_api_url: String,

    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            github_api_url: "https://api.github.com".to_string(),
            user_agent: format!("estimate-bot/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_github_api_url(mut self, url: impl Into<String>) -> Self {
        self.github_api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        let normalized_path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.github_api_url, normalized_path)
    }
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Hands out installation clients authenticated as the configured GitHub App.
///
/// Every acquisition resolves credentials, signs a fresh JWT and requests a
/// new installation token. Nothing is cached between calls.
#[derive(Clone)]
pub struct GitHubAppClientProvider {
    credentials: AppCredentialSource,
    http_client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl GitHubAppClientProvider {
    /// Create a provider.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientError`] if the HTTP client cannot be built.
    pub fn new(credentials: AppCredentialSource, config: ClientConfig) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::HttpClientError)?;

        Ok(Self {
            credentials,
            http_client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Exchange a freshly signed app JWT for an installation token.
    ///
    /// # Errors
    ///
    /// - Configuration variants of [`AuthError`] when the app identity cannot be resolved
    /// - [`AuthError::InvalidCredentials`] on 401
    /// - [`AuthError::InstallationNotFound`] on 403 or 404
    /// - [`AuthError::GitHubApiError`] / [`AuthError::NetworkError`] otherwise
    #[instrument(skip(self), fields(installation_id = %installation_id))]
    pub async fn create_installation_token(
        &self,
        installation_id: InstallationId,
    ) -> Result<InstallationToken, AuthError> {
        let (app_id, private_key) = self.credentials.resolve().await?;
        let jwt = RS256JwtGenerator::new(private_key).generate_jwt(app_id)?;

        let url = self.config.url(&format!(
            "/app/installations/{}/access_tokens",
            installation_id.as_u64()
        ));

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", jwt.token()))
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => AuthError::InvalidCredentials,
                403 | 404 => AuthError::InstallationNotFound { installation_id },
                _ => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    AuthError::GitHubApiError {
                        status: status.as_u16(),
                        message,
                    }
                }
            });
        }

        let body: AccessTokenResponse =
            response
                .json()
                .await
                .map_err(|e| AuthError::GitHubApiError {
                    status: status.as_u16(),
                    message: format!("Failed to parse access token response: {}", e),
                })?;

        debug!(app_id = %app_id, expires_at = %body.expires_at, "Installation token issued");

        Ok(InstallationToken::new(
            body.token,
            installation_id,
            body.expires_at,
        ))
    }
}

#[async_trait]
impl ClientProvider for GitHubAppClientProvider {
    async fn acquire_client(
        &self,
        installation_id: InstallationId,
    ) -> Result<Arc<dyn IssueCommentClient>, CollaboratorError> {
        let token = self.create_installation_token(installation_id).await?;

        Ok(Arc::new(InstallationClient::new(
            self.http_client.clone(),
            Arc::clone(&self.config),
            token,
        )))
    }
}

impl std::fmt::Debug for GitHubAppClientProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAppClientProvider")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
