//! Signed session tokens (JWT, HS256).
//!
//! Two token kinds with separate signing secrets: short-lived access tokens
//! presented on every request, and long-lived refresh tokens whose current
//! digest is stored on the user record.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use super::AuthError;

/// Access token lifetime: 15 minutes.
const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
const REFRESH_TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Which of the two session tokens a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn lifetime_secs(self) -> i64 {
        match self {
            TokenKind::Access => ACCESS_TOKEN_EXPIRY_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_EXPIRY_SECS,
        }
    }
}

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id.
    pub id: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
}

/// Signing secrets, one per token kind. A token signed with one kind's
/// secret never verifies as the other kind.
#[derive(Debug, Clone)]
pub struct TokenSecrets {
    pub access: String,
    pub refresh: String,
}

impl TokenSecrets {
    /// Resolve both secrets: env vars first, then persisted files.
    pub fn resolve() -> Self {
        Self {
            access: resolve_secret(&["SECRET_KEY", "ACCESS_TOKEN_SECRET"], "access-token-secret"),
            refresh: resolve_secret(&["REFRESH_TOKEN_SECRET"], "refresh-token-secret"),
        }
    }

    fn secret_for(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access.as_bytes(),
            TokenKind::Refresh => self.refresh.as_bytes(),
        }
    }
}

/// Generate a signed token of the given kind (HS256, kind-specific expiry).
pub fn generate_token(
    kind: TokenKind,
    user_id: &str,
    secrets: &TokenSecrets,
) -> Result<String, AuthError> {
    generate_with_lifetime(kind, user_id, secrets, kind.lifetime_secs())
}

fn generate_with_lifetime(
    kind: TokenKind,
    user_id: &str,
    secrets: &TokenSecrets,
    lifetime_secs: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        id: user_id.to_string(),
        exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secrets.secret_for(kind)),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify a token of the given kind, returning the claims on success.
///
/// Failures are distinguished: bad signature or structure is
/// [`AuthError::InvalidToken`], a lapsed expiry is [`AuthError::ExpiredToken`],
/// and a payload without the subject id is [`AuthError::MalformedToken`].
pub fn verify_token(
    kind: TokenKind,
    token: &str,
    secrets: &TokenSecrets,
) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secrets.secret_for(kind));
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => AuthError::MalformedToken,
            _ => AuthError::InvalidToken,
        })
}

/// SHA-256 hex digest of a token, the at-rest form of stored refresh tokens.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve a signing secret: the given env vars in order, then a persisted
/// file, generating one on first run.
fn resolve_secret(env_keys: &[&str], file_name: &str) -> String {
    for key in env_keys {
        if let Ok(secret) = std::env::var(key)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    let secret_path = secret_path(file_name);
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new token secret");
    secret
}

/// Path to a persisted secret file.
fn secret_path(file_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("triage")
        .join(file_name)
}
