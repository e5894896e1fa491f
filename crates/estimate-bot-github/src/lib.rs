//! # Estimate Bot GitHub
//!
//! GitHub App plumbing for the estimate reminder bot.
//!
//! The bot authenticates as a GitHub App: it signs a short-lived RS256 JWT
//! with the app's private key, exchanges it for an installation access token
//! and uses that token for the two issue comment calls the reminder logic
//! needs.
//!
//! [`GitHubAppClientProvider`] implements the
//! [`ClientProvider`](estimate_bot_core::ClientProvider) port, and the
//! [`InstallationClient`] it hands out implements
//! [`IssueCommentClient`](estimate_bot_core::IssueCommentClient).

pub mod auth;
pub mod client;
pub mod error;

pub use auth::{AppCredentialSource, GitHubAppId, PrivateKey};
pub use client::{ClientConfig, GitHubAppClientProvider, InstallationClient};
pub use error::{ApiError, AuthError};
