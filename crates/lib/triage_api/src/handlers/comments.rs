//! Comment endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::services::comments;
use triage_core::models::Comment;

/// `GET /comments`
pub async fn list_comments_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<Comment>>>> {
    let listed = comments::list_comments(state.store.as_ref(), &actor).await?;
    Ok(Json(ApiResponse::new(listed, "findAll")))
}

/// `GET /comments/{id}`
pub async fn get_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let comment = comments::get_comment(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(comment, "findOne")))
}

/// `GET /issues/{id}/comments`
pub async fn comments_by_issue_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(issue_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Comment>>>> {
    let listed = comments::comments_by_issue(state.store.as_ref(), &actor, &issue_id).await?;
    Ok(Json(ApiResponse::new(listed, "findByIssueId")))
}

/// `POST /comments`
pub async fn create_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let comment = comments::create_comment(state.store.as_ref(), &actor, body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(comment, "created"))))
}

/// `PUT /comments/{id}`
pub async fn update_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCommentRequest>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let comment = comments::update_comment(state.store.as_ref(), &actor, &id, body).await?;
    Ok(Json(ApiResponse::new(comment, "updated")))
}

/// `DELETE /comments/{id}`
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Comment>>> {
    let comment = comments::delete_comment(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(comment, "deleted")))
}
