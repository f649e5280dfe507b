//! Access-token middleware for protected routes.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::is_valid_id;
use crate::services::cookies::AUTH_COOKIE;
use triage_core::auth::token::{TokenKind, verify_token};
use triage_core::models::User;

/// The caller's account, loaded fresh per request so role and existence
/// changes take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Reject the request unless it carries a valid access token for an existing
/// user. On success the [`AuthenticatedUser`] extension is available to
/// handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&jar, request.headers()).ok_or(AppError::MissingCredential)?;

    let claims = verify_token(TokenKind::Access, &token, &state.config.secrets).map_err(|e| {
        debug!(error = %e, "access token rejected");
        AppError::InvalidToken
    })?;

    if !is_valid_id(&claims.id) {
        return Err(AppError::InvalidToken);
    }
    let user = state
        .store
        .user_by_id(&claims.id)
        .await?
        .ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// The access token is read from the `Authorization` cookie first, then from
/// a `Bearer` authorization header.
fn extract_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}
