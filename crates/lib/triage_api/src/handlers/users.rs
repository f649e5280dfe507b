//! User management endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, CreateUserRequest, UpdateUserRequest};
use crate::services::users;
use triage_core::models::SafeUser;

/// `GET /users`
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<SafeUser>>>> {
    let listed = users::list_users(state.store.as_ref(), &actor).await?;
    Ok(Json(ApiResponse::new(listed, "findAll")))
}

/// `GET /users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<SafeUser>>> {
    let user = users::get_user(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(user, "findOne")))
}

/// `POST /users`
pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SafeUser>>)> {
    let user = users::create_user(state.store.as_ref(), &actor, body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(user, "created"))))
}

/// `PUT /users/{id}`
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<SafeUser>>> {
    let user = users::update_user(state.store.as_ref(), &actor, &id, body).await?;
    Ok(Json(ApiResponse::new(user, "updated")))
}

/// `DELETE /users/{id}`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<SafeUser>>> {
    let user = users::delete_user(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(user, "deleted")))
}
