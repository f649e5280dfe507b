//! Authentication primitives: password hashing and signed session tokens.
//!
//! Shared between the API layer's session flows and the request
//! authenticator middleware.

pub mod password;
pub mod token;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Signature or structural verification failed.
    #[error("Invalid token")]
    InvalidToken,

    /// The token verified but is past its expiry.
    #[error("Expired token")]
    ExpiredToken,

    /// The token verified but its payload is missing the subject id.
    #[error("Malformed token payload")]
    MalformedToken,

    #[error("Internal error: {0}")]
    Internal(String),
}
