//! GitHub App authentication types.
//!
//! This module provides:
//! - [`GitHubAppId`] and the RSA [`PrivateKey`] used to sign app JWTs
//! - Token types ([`JsonWebToken`], [`InstallationToken`])
//! - [`AppCredentialSource`], which resolves the app identity on every use
//!
//! Nothing here caches credentials. Each installation client acquisition
//! re-reads the key and mints a fresh JWT.

use chrono::{DateTime, Utc};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::AuthError;
use estimate_bot_core::InstallationId;

pub mod jwt;

pub use jwt::RS256JwtGenerator;

// ============================================================================
// Core ID Types
// ============================================================================

/// GitHub App identifier assigned during app registration.
///
/// # Examples
///
/// ```
/// use estimate_bot_github::auth::GitHubAppId;
///
/// let app_id: GitHubAppId = "123456".parse().unwrap();
/// assert_eq!(app_id.as_u64(), 123456);
/// assert_eq!(app_id.to_string(), "123456");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubAppId(u64);

impl GitHubAppId {
    /// Create a new GitHub App ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GitHubAppId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GitHubAppId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self::new)
            .map_err(|_| AuthError::InvalidAppId {
                value: s.to_string(),
            })
    }
}

// ============================================================================
// Key Material
// ============================================================================

/// RSA private key for JWT signing.
///
/// Accepts PKCS#1 (`BEGIN RSA PRIVATE KEY`) and PKCS#8 (`BEGIN PRIVATE KEY`)
/// PEM and keeps a normalised PKCS#1 DER copy. The key bytes are wiped on
/// drop and never appear in `Debug` output.
#[derive(Clone)]
pub struct PrivateKey {
    der: Zeroizing<Vec<u8>>,
}

impl PrivateKey {
    /// Parse a PEM-encoded RSA private key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPrivateKey`] if the PEM is empty, lacks
    /// BEGIN/END markers or does not hold an RSA key.
    pub fn from_pem(pem: &str) -> Result<Self, AuthError> {
        let pem = pem.trim();

        if pem.is_empty() {
            return Err(AuthError::InvalidPrivateKey {
                message: "PEM string cannot be empty".to_string(),
            });
        }

        if !pem.contains("-----BEGIN") || !pem.contains("-----END") {
            return Err(AuthError::InvalidPrivateKey {
                message: "Invalid PEM format: missing BEGIN/END markers".to_string(),
            });
        }

        let key = match RsaPrivateKey::from_pkcs1_pem(pem) {
            Ok(key) => key,
            Err(_) => {
                RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| AuthError::InvalidPrivateKey {
                    message: format!("Failed to parse RSA private key: {}", e),
                })?
            }
        };

        let der = key
            .to_pkcs1_der()
            .map_err(|e| AuthError::InvalidPrivateKey {
                message: format!("Failed to encode RSA private key: {}", e),
            })?;

        Ok(Self {
            der: Zeroizing::new(der.as_bytes().to_vec()),
        })
    }

    /// PKCS#1 DER encoding of the key.
    pub(crate) fn pkcs1_der(&self) -> &[u8] {
        &self.der
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &"RS256")
            .field("key_data", &"<REDACTED>")
            .finish()
    }
}

// ============================================================================
// Token Types
// ============================================================================

/// JWT claims structure for GitHub App authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Issuer (GitHub App ID)
    pub iss: GitHubAppId,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Signed JWT authenticating as the GitHub App.
#[derive(Clone)]
pub struct JsonWebToken {
    token: String,
    app_id: GitHubAppId,
    expires_at: DateTime<Utc>,
}

impl JsonWebToken {
    pub fn new(token: String, app_id: GitHubAppId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            app_id,
            expires_at,
        }
    }

    /// Encoded token for the `Authorization: Bearer` header
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn app_id(&self) -> GitHubAppId {
        self.app_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for JsonWebToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonWebToken")
            .field("app_id", &self.app_id)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Installation-scoped access token.
#[derive(Clone)]
pub struct InstallationToken {
    token: Zeroizing<String>,
    installation_id: InstallationId,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    pub fn new(token: String, installation_id: InstallationId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: Zeroizing::new(token),
            installation_id,
            expires_at,
        }
    }

    /// Token string for the `Authorization: Bearer` header
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("installation_id", &self.installation_id)
            .field("expires_at", &self.expires_at)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

// ============================================================================
// Credential Source
// ============================================================================

/// Where the app private key comes from.
#[derive(Clone, Default)]
pub enum KeySource {
    #[default]
    Unset,

    /// PEM text held in memory
    Inline(Zeroizing<String>),

    /// Path to a PEM file, read on every resolution
    File(PathBuf),
}

/// App identity as configured, resolved into signing material on demand.
///
/// A key file is re-read on every [`resolve`](Self::resolve) call, so a
/// rotated key takes effect without a restart.
#[derive(Clone, Default)]
pub struct AppCredentialSource {
    app_id: Option<GitHubAppId>,
    key: KeySource,
}

impl AppCredentialSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_id(mut self, app_id: GitHubAppId) -> Self {
        self.app_id = Some(app_id);
        self
    }

    /// Use PEM text directly. Literal `\n` sequences are expanded so that a
    /// key can be supplied through a single-line environment variable.
    pub fn with_inline_key(mut self, pem: impl Into<String>) -> Self {
        let pem = pem.into().replace("\\n", "\n");
        self.key = KeySource::Inline(Zeroizing::new(pem));
        self
    }

    pub fn with_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.key = KeySource::File(path.into());
        self
    }

    pub fn app_id(&self) -> Option<GitHubAppId> {
        self.app_id
    }

    /// Check if both an app ID and a key source are present.
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && !matches!(self.key, KeySource::Unset)
    }

    /// Resolve the app ID and load the private key.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingAppId`] / [`AuthError::MissingPrivateKey`] when unset
    /// - [`AuthError::KeyFileUnreadable`] when the key file cannot be read
    /// - [`AuthError::InvalidPrivateKey`] when the PEM does not parse
    pub async fn resolve(&self) -> Result<(GitHubAppId, PrivateKey), AuthError> {
        let app_id = self.app_id.ok_or(AuthError::MissingAppId)?;

        let key = match &self.key {
            KeySource::Unset => return Err(AuthError::MissingPrivateKey),
            KeySource::Inline(pem) => PrivateKey::from_pem(pem)?,
            KeySource::File(path) => {
                debug!(path = %path.display(), "Loading GitHub App private key");
                let pem = tokio::fs::read_to_string(path).await.map_err(|e| {
                    AuthError::KeyFileUnreadable {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    }
                })?;
                PrivateKey::from_pem(&Zeroizing::new(pem))?
            }
        };

        Ok((app_id, key))
    }
}

impl std::fmt::Debug for AppCredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match &self.key {
            KeySource::Unset => "unset".to_string(),
            KeySource::Inline(_) => "inline <REDACTED>".to_string(),
            KeySource::File(path) => format!("file {}", path.display()),
        };
        f.debug_struct("AppCredentialSource")
            .field("app_id", &self.app_id)
            .field("key", &key)
            .finish()
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
