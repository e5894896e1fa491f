//! Configuration types for the HTTP service

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ConfigError;

/// Paths served by the router itself.
const RESERVED_PATHS: &[&str] = &["/healthz", "/metrics"];

/// Service configuration
///
/// Every section carries defaults so a partial file (or none at all) still
/// deserializes; [`ServiceConfig::validate`] catches the values that cannot
/// be defaulted.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Webhook endpoint settings
    pub webhooks: WebhookConfig,

    /// GitHub App identity and API settings
    pub github: GitHubConfig,

    /// Reminder decision settings
    pub reminder: ReminderConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Check the values that have no safe default.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when the webhook secret is empty
    /// - [`ConfigError::Invalid`] for out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhooks.secret.is_empty() {
            return Err(ConfigError::Missing {
                key: "webhooks.secret".to_string(),
            });
        }

        if !self.webhooks.endpoint_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                message: format!(
                    "webhooks.endpoint_path must start with '/', got '{}'",
                    self.webhooks.endpoint_path
                ),
            });
        }

        if RESERVED_PATHS.contains(&self.webhooks.endpoint_path.as_str()) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "webhooks.endpoint_path '{}' collides with a built-in endpoint",
                    self.webhooks.endpoint_path
                ),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            });
        }

        if self.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                message: "server.max_body_size must be non-zero".to_string(),
            });
        }

        if self.reminder.lookback_days == 0 {
            return Err(ConfigError::Invalid {
                message: "reminder.lookback_days must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,

    /// Maximum request size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_seconds: 30,
            max_body_size: 25 * 1024 * 1024, // GitHub caps payloads at 25MB
        }
    }
}

/// Webhook endpoint configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Webhook endpoint path
    pub endpoint_path: String,

    /// Shared secret used to sign deliveries
    #[serde(skip_serializing)]
    pub secret: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            endpoint_path: "/webhook".to_string(),
            secret: String::new(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("endpoint_path", &self.endpoint_path)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// GitHub App configuration
///
/// Missing identity settings are not a startup error; deliveries that need
/// GitHub access fail individually until they are supplied.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Numeric GitHub App ID
    pub app_id: Option<u64>,

    /// Path to the app's PEM private key, re-read on every delivery
    pub private_key_path: Option<String>,

    /// Inline PEM private key; wins over `private_key_path`
    #[serde(skip_serializing)]
    pub private_key: Option<String>,

    /// REST API base URL
    pub api_url: String,

    /// `User-Agent` sent with every API request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            private_key_path: None,
            private_key: None,
            api_url: "https://api.github.com".to_string(),
            user_agent: format!("estimate-bot/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("app_id", &self.app_id)
            .field("private_key_path", &self.private_key_path)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Reminder decision configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// How far back to look for an earlier reminder comment
    pub lookback_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { lookback_days: 30 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logging level used when `RUST_LOG` is not set
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
