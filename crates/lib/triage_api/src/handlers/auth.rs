//! Session endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AccessTokenData, ApiResponse, AuthData, LoginRequest, SignupRequest};
use crate::services::auth;
use crate::services::cookies::{REFRESH_COOKIE, clear_refresh_cookie, refresh_cookie};

/// `POST /auth/signup`
pub async fn signup_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignupRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<ApiResponse<AuthData>>)> {
    let (user, pair) =
        auth::signup(state.store.as_ref(), &state.config.secrets, &body.email, &body.password)
            .await?;
    let jar = jar.add(refresh_cookie(&pair.refresh, state.config.is_production()));
    let data = AuthData {
        user,
        access_token: pair.access,
    };
    Ok((StatusCode::CREATED, jar, Json(ApiResponse::new(data, "signup"))))
}

/// `POST /auth/login`
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<ApiResponse<AuthData>>)> {
    let (user, pair) =
        auth::login(state.store.as_ref(), &state.config.secrets, &body.email, &body.password)
            .await?;
    let jar = jar.add(refresh_cookie(&pair.refresh, state.config.is_production()));
    let data = AuthData {
        user,
        access_token: pair.access,
    };
    Ok((jar, Json(ApiResponse::new(data, "login"))))
}

/// `POST /auth/refresh`
///
/// Public route: the only credential involved is the refresh cookie itself.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<AccessTokenData>>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::MissingCredential)?;

    let pair = auth::refresh(state.store.as_ref(), &state.config.secrets, &token).await?;
    let jar = jar.add(refresh_cookie(&pair.refresh, state.config.is_production()));
    let data = AccessTokenData {
        access_token: pair.access,
    };
    Ok((jar, Json(ApiResponse::new(data, "token refreshed"))))
}

/// `POST /auth/logout`
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ApiResponse<()>>)> {
    auth::logout(state.store.as_ref(), &user.id).await?;
    let jar = jar.add(clear_refresh_cookie(state.config.is_production()));
    Ok((jar, Json(ApiResponse::new((), "logout"))))
}
