//! Session lifecycle: signup, login, refresh and logout.
//!
//! Sessions are a pair of JWTs. The short-lived access token authenticates
//! API calls; the long-lived refresh token is stored hashed on the user row
//! and rotated on every use, so a replayed refresh token kills the session
//! it was stolen from.

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use triage_core::auth::AuthError;
use triage_core::auth::password;
use triage_core::auth::token::{self, TokenKind, TokenSecrets, token_digest};
use triage_core::models::{Role, SafeUser};
use triage_core::store::Store;

/// Freshly issued access and refresh tokens.
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Create an account and open a session for it.
///
/// New accounts always get the default role; elevated roles are granted
/// through the user management API by an admin.
pub async fn signup(
    store: &dyn Store,
    secrets: &TokenSecrets,
    email: &str,
    password: &str,
) -> AppResult<(SafeUser, TokenPair)> {
    validate_email(email)?;
    validate_password(password)?;
    if store.user_by_email(email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let password_hash = password::hash_password(password)?;
    let user = store.create_user(email, &password_hash, Role::default()).await?;
    let pair = open_session(store, secrets, &user.id).await?;
    info!(user_id = %user.id, "user signed up");
    Ok((user.safe(), pair))
}

/// Open a session for an existing account.
///
/// Unknown email and wrong password collapse into one error so the response
/// does not reveal which accounts exist.
pub async fn login(
    store: &dyn Store,
    secrets: &TokenSecrets,
    email: &str,
    password: &str,
) -> AppResult<(SafeUser, TokenPair)> {
    let Some(user) = store.user_by_email(email).await? else {
        return Err(AppError::InvalidCredentials);
    };
    if !password::verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let pair = open_session(store, secrets, &user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok((user.safe(), pair))
}

/// Exchange a refresh token for a fresh token pair, rotating the stored
/// digest.
///
/// A token that verifies but does not match the stored digest has been
/// rotated away already. That is treated as replay: the session is cleared
/// and the holder of the current token must log in again.
pub async fn refresh(
    store: &dyn Store,
    secrets: &TokenSecrets,
    refresh_token: &str,
) -> AppResult<TokenPair> {
    let claims =
        token::verify_token(TokenKind::Refresh, refresh_token, secrets).map_err(|e| match e {
            AuthError::Internal(detail) => AppError::Internal(detail),
            _ => AppError::InvalidRefreshToken,
        })?;

    let Some(user) = store.user_by_id(&claims.id).await? else {
        return Err(AppError::NotFound("User doesn't exist".to_string()));
    };

    let presented = token_digest(refresh_token);
    if user.refresh_token_hash.as_deref() != Some(presented.as_str()) {
        warn!(user_id = %user.id, "refresh token replayed, clearing session");
        store.set_refresh_token(&user.id, None).await?;
        return Err(AppError::RefreshTokenInvalidated);
    }

    open_session(store, secrets, &user.id).await
}

/// Close the session. Safe to call when no session is open.
pub async fn logout(store: &dyn Store, user_id: &str) -> AppResult<()> {
    if !store.set_refresh_token(user_id, None).await? {
        return Err(AppError::NotFound("User doesn't exist".to_string()));
    }
    info!(user_id = %user_id, "user logged out");
    Ok(())
}

/// Issue a token pair and store the refresh token's digest on the user row.
async fn open_session(
    store: &dyn Store,
    secrets: &TokenSecrets,
    user_id: &str,
) -> AppResult<TokenPair> {
    let pair = TokenPair {
        access: token::generate_token(TokenKind::Access, user_id, secrets)?,
        refresh: token::generate_token(TokenKind::Refresh, user_id, secrets)?,
    };
    store
        .set_refresh_token(user_id, Some(token_digest(&pair.refresh).as_str()))
        .await?;
    Ok(pair)
}

pub(crate) fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if !(9..=32).contains(&length) {
        return Err(AppError::Validation(
            "Password must be between 9 and 32 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::store::{MemoryStore, UserStore};

    fn secrets() -> TokenSecrets {
        TokenSecrets {
            access: "access-test-secret".to_string(),
            refresh: "refresh-test-secret".to_string(),
        }
    }

    // Token payloads have second-resolution timestamps, so two tokens for
    // the same user issued within one second are identical. Tests that need
    // a distinct second pair wait out the clock.
    fn next_second() {
        std::thread::sleep(std::time::Duration::from_millis(1100));
    }

    #[tokio::test]
    async fn signup_rejects_invalid_input() {
        let store = MemoryStore::default();
        let secrets = secrets();

        let err = signup(&store, &secrets, "not-an-email", "long enough pw").await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = signup(&store, &secrets, "a@b.c", "short").await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = signup(&store, &secrets, "a@b.c", &"x".repeat(33)).await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn signup_twice_is_email_taken() {
        let store = MemoryStore::default();
        let secrets = secrets();

        signup(&store, &secrets, "dup@example.com", "password123").await.unwrap();
        let err = signup(&store, &secrets, "dup@example.com", "password456").await;
        assert!(matches!(err, Err(AppError::EmailTaken)));
    }

    #[tokio::test]
    async fn login_hides_which_part_was_wrong() {
        let store = MemoryStore::default();
        let secrets = secrets();
        signup(&store, &secrets, "who@example.com", "password123").await.unwrap();

        let unknown = login(&store, &secrets, "nobody@example.com", "password123").await;
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

        let wrong = login(&store, &secrets, "who@example.com", "wrong password").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn signup_stores_refresh_digest_not_token() {
        let store = MemoryStore::default();
        let secrets = secrets();

        let (user, pair) = signup(&store, &secrets, "d@example.com", "password123").await.unwrap();
        let stored = store.user_by_id(&user.id).await.unwrap().unwrap();
        let digest = stored.refresh_token_hash.unwrap();
        assert_ne!(digest, pair.refresh);
        assert_eq!(digest, token_digest(&pair.refresh));
    }

    #[tokio::test]
    async fn refresh_rotates_and_replay_clears_the_session() {
        let store = MemoryStore::default();
        let secrets = secrets();
        let (user, first) = signup(&store, &secrets, "r@example.com", "password123").await.unwrap();

        next_second();
        let second = refresh(&store, &secrets, &first.refresh).await.unwrap();
        assert_ne!(first.refresh, second.refresh);

        // The first token was rotated away; presenting it again is replay.
        let replay = refresh(&store, &secrets, &first.refresh).await;
        assert!(matches!(replay, Err(AppError::RefreshTokenInvalidated)));

        // Replay cleared the session, taking the live token down with it.
        let stored = store.user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());
        let after = refresh(&store, &secrets, &second.refresh).await;
        assert!(matches!(after, Err(AppError::RefreshTokenInvalidated)));
    }

    #[tokio::test]
    async fn refresh_rejects_foreign_and_garbage_tokens() {
        let store = MemoryStore::default();
        let secrets = secrets();
        let (user, pair) = signup(&store, &secrets, "g@example.com", "password123").await.unwrap();

        let garbage = refresh(&store, &secrets, "none.of.this").await;
        assert!(matches!(garbage, Err(AppError::InvalidRefreshToken)));

        // An access token never doubles as a refresh token.
        let crossed = refresh(&store, &secrets, &pair.access).await;
        assert!(matches!(crossed, Err(AppError::InvalidRefreshToken)));

        // Neither attempt touched the stored session.
        let stored = store.user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_some());
    }

    #[tokio::test]
    async fn refresh_for_deleted_user_is_not_found() {
        let store = MemoryStore::default();
        let secrets = secrets();
        let (user, pair) = signup(&store, &secrets, "gone@example.com", "password123").await.unwrap();

        store.delete_user(&user.id).await.unwrap();
        let err = refresh(&store, &secrets, &pair.refresh).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn logout_clears_the_session_and_is_idempotent() {
        let store = MemoryStore::default();
        let secrets = secrets();
        let (user, pair) = signup(&store, &secrets, "l@example.com", "password123").await.unwrap();

        logout(&store, &user.id).await.unwrap();
        let stored = store.user_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());

        // A second logout is a no-op, not an error.
        logout(&store, &user.id).await.unwrap();

        let err = refresh(&store, &secrets, &pair.refresh).await;
        assert!(matches!(err, Err(AppError::RefreshTokenInvalidated)));
    }
}
