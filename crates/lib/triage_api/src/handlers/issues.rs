//! Issue endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ApiResponse, CreateIssueRequest, PageQuery, UpdateIssueRequest};
use crate::services::issues;
use triage_core::models::Issue;

/// `GET /issues`
pub async fn list_issues_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<Json<ApiResponse<Vec<Issue>>>> {
    let listed = issues::list_issues(state.store.as_ref(), &actor).await?;
    Ok(Json(ApiResponse::new(listed, "findAll")))
}

/// `GET /issues/paginated?page=&limit=`
pub async fn paginated_issues_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<Issue>>>> {
    let listed =
        issues::issues_page(state.store.as_ref(), &actor, query.page(), query.limit()).await?;
    Ok(Json(ApiResponse::new(listed, "paginated")))
}

/// `GET /issues/{id}`
pub async fn get_issue_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Issue>>> {
    let issue = issues::get_issue(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(issue, "findOne")))
}

/// `GET /issues/user/{user_id}`
pub async fn issues_by_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Issue>>>> {
    let listed = issues::issues_by_user(state.store.as_ref(), &actor, &user_id).await?;
    Ok(Json(ApiResponse::new(listed, "findByUserId")))
}

/// `GET /issues/user/{user_id}/paginated?page=&limit=`
pub async fn paginated_issues_by_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<Vec<Issue>>>> {
    let listed = issues::issues_by_user_page(
        state.store.as_ref(),
        &actor,
        &user_id,
        query.page(),
        query.limit(),
    )
    .await?;
    Ok(Json(ApiResponse::new(listed, "paginatedByUserId")))
}

/// `POST /issues`
pub async fn create_issue_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Json(body): Json<CreateIssueRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Issue>>)> {
    let issue = issues::create_issue(state.store.as_ref(), &actor, body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(issue, "created"))))
}

/// `PUT /issues/{id}`
pub async fn update_issue_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateIssueRequest>,
) -> AppResult<Json<ApiResponse<Issue>>> {
    let issue = issues::update_issue(state.store.as_ref(), &actor, &id, body).await?;
    Ok(Json(ApiResponse::new(issue, "updated")))
}

/// `DELETE /issues/{id}`
pub async fn delete_issue_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Issue>>> {
    let issue = issues::delete_issue(state.store.as_ref(), &actor, &id).await?;
    Ok(Json(ApiResponse::new(issue, "deleted")))
}
