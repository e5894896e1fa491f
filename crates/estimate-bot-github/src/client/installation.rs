//! Installation-scoped GitHub API access.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};

use crate::auth::InstallationToken;
use crate::client::{ClientConfig, GITHUB_ACCEPT, GITHUB_API_VERSION};
use crate::error::ApiError;
use estimate_bot_core::InstallationId;

/// GitHub API client bound to one installation token.
///
/// Cheap to clone; the HTTP connection pool and config are shared with the
/// provider that created it.
#[derive(Debug, Clone)]
pub struct InstallationClient {
    http_client: reqwest::Client,
    config: Arc<ClientConfig>,
    token: InstallationToken,
}

impl InstallationClient {
    pub fn new(
        http_client: reqwest::Client,
        config: Arc<ClientConfig>,
        token: InstallationToken,
    ) -> Self {
        Self {
            http_client,
            config,
            token,
        }
    }

    /// Get the installation ID this client is bound to.
    pub fn installation_id(&self) -> InstallationId {
        self.token.installation_id()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token.token()))
            .header("Accept", GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    /// Make an authenticated GET request.
    pub async fn get<Q: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response, ApiError> {
        let request = self.http_client.get(self.config.url(path)).query(query);
        Ok(self.authorize(request).send().await?)
    }

    /// Make an authenticated POST request with a JSON body.
    pub async fn post<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ApiError> {
        let request = self.http_client.post(self.config.url(path)).json(body);
        Ok(self.authorize(request).send().await?)
    }
}

/// Convert a non-success response into an [`ApiError`].
pub(crate) async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    match status {
        401 => ApiError::AuthenticationFailed,
        403 => ApiError::AuthorizationFailed,
        404 => ApiError::NotFound,
        422 => ApiError::InvalidRequest {
            message: response
                .text()
                .await
                .unwrap_or_else(|_| "Validation failed".to_string()),
        },
        _ => ApiError::HttpError {
            status,
            message: response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string()),
        },
    }
}
