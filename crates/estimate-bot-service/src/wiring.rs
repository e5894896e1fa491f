//! Builds the processing pipeline from the loaded configuration.

use estimate_bot_api::{GitHubConfig, ServiceConfig};
use estimate_bot_core::{ReminderCoordinator, WebhookPipeline, WebhookSecret};
use estimate_bot_github::{AppCredentialSource, ClientConfig, GitHubAppClientProvider, GitHubAppId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Collect the app identity settings.
///
/// An inline key takes precedence over a key path.
pub fn app_credentials(github: &GitHubConfig) -> AppCredentialSource {
    let mut credentials = AppCredentialSource::new();

    if let Some(app_id) = github.app_id {
        credentials = credentials.with_app_id(GitHubAppId::new(app_id));
    }

    if let Some(pem) = github.private_key.as_deref().filter(|k| !k.is_empty()) {
        credentials = credentials.with_inline_key(pem);
    } else if let Some(path) = github.private_key_path.as_deref().filter(|p| !p.is_empty()) {
        credentials = credentials.with_key_file(path);
    }

    credentials
}

/// HTTP settings for the GitHub API client.
pub fn client_config(github: &GitHubConfig) -> ClientConfig {
    ClientConfig::default()
        .with_github_api_url(github.api_url.as_str())
        .with_user_agent(github.user_agent.as_str())
        .with_timeout(Duration::from_secs(github.timeout_seconds))
}

/// Assemble the webhook pipeline.
///
/// Missing app identity is logged but not fatal; affected deliveries fail
/// with an authentication error until it is configured.
pub fn build_pipeline(config: &ServiceConfig) -> anyhow::Result<WebhookPipeline> {
    let credentials = app_credentials(&config.github);
    if !credentials.is_configured() {
        warn!("GitHub App ID or private key not configured; reminders cannot be posted");
    }

    let provider = GitHubAppClientProvider::new(credentials, client_config(&config.github))?;

    let lookback = chrono::Duration::days(i64::from(config.reminder.lookback_days));
    let coordinator = ReminderCoordinator::new(Arc::new(provider)).with_lookback(lookback);

    info!(
        api_url = %config.github.api_url,
        lookback_days = config.reminder.lookback_days,
        "Webhook pipeline ready"
    );

    Ok(WebhookPipeline::new(
        WebhookSecret::new(config.webhooks.secret.as_bytes()),
        coordinator,
    ))
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
