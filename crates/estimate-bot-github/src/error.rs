//! Error types for GitHub App authentication and API calls.
//!
//! Both types collapse into [`CollaboratorError`] at the port boundary, which
//! is all the reminder logic ever sees.

use estimate_bot_core::{CollaboratorError, InstallationId};
use thiserror::Error;

/// Failures while obtaining app or installation credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No GitHub App ID has been configured.
    #[error("GitHub App ID is not configured")]
    MissingAppId,

    /// The configured GitHub App ID is not a positive integer.
    #[error("Invalid GitHub App ID: '{value}'")]
    InvalidAppId { value: String },

    /// Neither an inline key nor a key path has been configured.
    #[error("GitHub App private key is not configured")]
    MissingPrivateKey,

    /// The configured key file could not be read.
    #[error("Failed to read private key file {path}: {message}")]
    KeyFileUnreadable { path: String, message: String },

    /// Invalid private key format or data.
    #[error("Invalid private key: {message}")]
    InvalidPrivateKey { message: String },

    /// JWT signing failed.
    #[error("JWT generation failed: {message}")]
    JwtGenerationFailed { message: String },

    /// GitHub rejected the app JWT.
    #[error("Invalid GitHub App credentials")]
    InvalidCredentials,

    /// Installation not found or access denied.
    #[error("Installation {installation_id} not found or access denied")]
    InstallationNotFound { installation_id: InstallationId },

    /// GitHub returned an unexpected error response.
    #[error("GitHub API error: {status} - {message}")]
    GitHubApiError { status: u16, message: String },

    /// Network connectivity or transport error.
    #[error("Network error: {0}")]
    NetworkError(String),
}

impl AuthError {
    /// Check if the failure is caused by local configuration rather than GitHub.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingAppId
                | Self::InvalidAppId { .. }
                | Self::MissingPrivateKey
                | Self::KeyFileUnreadable { .. }
                | Self::InvalidPrivateKey { .. }
                | Self::JwtGenerationFailed { .. }
        )
    }
}

impl From<AuthError> for CollaboratorError {
    fn from(error: AuthError) -> Self {
        let message = error.to_string();
        match error {
            e if e.is_configuration() => CollaboratorError::Configuration { message },
            AuthError::InvalidCredentials | AuthError::InstallationNotFound { .. } => {
                CollaboratorError::Authentication { message }
            }
            _ => CollaboratorError::Upstream { message },
        }
    }
}

/// Errors during installation-scoped GitHub API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP error response from GitHub API.
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    /// Request to GitHub API timed out.
    #[error("Request timeout")]
    Timeout,

    /// The request was rejected as invalid (422).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The installation token was rejected.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// The installation lacks the required permission.
    #[error("Authorization failed")]
    AuthorizationFailed,

    /// The repository or issue was not found.
    #[error("Resource not found")]
    NotFound,

    /// Failed to parse JSON response from GitHub API.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// HTTP client error (network, TLS, etc.).
    #[error("HTTP client error: {0}")]
    HttpClientError(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::HttpClientError(error)
        }
    }
}

impl From<ApiError> for CollaboratorError {
    fn from(error: ApiError) -> Self {
        let message = error.to_string();
        match error {
            ApiError::AuthenticationFailed | ApiError::AuthorizationFailed => {
                CollaboratorError::Authentication { message }
            }
            _ => CollaboratorError::Upstream { message },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
