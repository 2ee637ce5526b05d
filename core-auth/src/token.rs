//! OAuth token file
//!
//! The token file is the JSON document written by standard OAuth 2.0 client
//! tooling:
//!
//! ```json
//! {
//!   "access_token": "ya29.a0...",
//!   "token_type": "Bearer",
//!   "refresh_token": "1//0g...",
//!   "expiry": "2024-05-01T12:00:00.123456+02:00"
//! }
//! ```

use crate::error::{AuthError, Result};
use chrono::{DateTime, Datelike, Utc};
use core_runtime::logging::redact_if_sensitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// OAuth 2.0 token set read from the token file.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
/// use chrono::{Duration, Utc};
///
/// let tokens = OAuthTokens {
///     access_token: "ya29.a0...".to_string(),
///     token_type: "Bearer".to_string(),
///     refresh_token: None,
///     expiry: Some(Utc::now() + Duration::hours(1)),
/// };
///
/// assert!(!tokens.is_expired());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// Token type, normally `Bearer`
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// The refresh token, when the authorization step issued one
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC), `None` if it never does
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthTokens {
    /// The value to send after `Authorization: Bearer`
    pub fn bearer_token(&self) -> &str {
        &self.access_token
    }

    /// Check if the access token is already expired
    ///
    /// Tokens without an expiry never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Load and validate the token file at `path`.
///
/// A missing or unreadable file, malformed JSON and an empty access token are
/// errors. An expired token is only reported as a warning: the request that
/// uses it will be rejected by the service.
pub async fn load_token_file(path: &Path) -> Result<OAuthTokens> {
    let contents = tokio::fs::read(path)
        .await
        .map_err(|source| AuthError::TokenFileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let tokens = parse_tokens(path, &contents)?;

    debug!(
        path = ?path,
        token_type = %tokens.token_type,
        access_token = %redact_if_sensitive("access_token", &tokens.access_token),
        expiry = ?tokens.expiry,
        "Loaded OAuth token"
    );

    if tokens.is_expired() {
        warn!(
            path = ?path,
            expiry = ?tokens.expiry,
            "OAuth access token has expired; requests are likely to be rejected"
        );
    }

    Ok(tokens)
}

fn parse_tokens(path: &Path, contents: &[u8]) -> Result<OAuthTokens> {
    let mut tokens: OAuthTokens =
        serde_json::from_slice(contents).map_err(|e| AuthError::InvalidTokenFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if tokens.access_token.trim().is_empty() {
        return Err(AuthError::NotAuthenticated);
    }

    // Token writers encode "no expiry" as the zero time (year 1)
    if tokens.expiry.is_some_and(|expiry| expiry.year() <= 1) {
        tokens.expiry = None;
    }

    Ok(tokens)
}
