//! HTTP API for the Triage issue tracker.
//!
//! Builds the axum router: public auth routes plus protected issue, comment
//! and user routes behind the access-token middleware. Permission checks for
//! the protected routes live in [`triage_core::authz`] and are applied by the
//! service layer.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use triage_core::store::Store;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn Store>,
    /// Runtime configuration, including token secrets.
    pub config: ApiConfig,
}

/// Run pending database migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    triage_core::migrate::migrate(pool).await
}

/// Build the full application router.
///
/// `/auth/signup`, `/auth/login` and `/auth/refresh` are public; everything
/// else requires a valid access token.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let public = Router::new()
        .route("/auth/signup", post(handlers::auth::signup_handler))
        .route("/auth/login", post(handlers::auth::login_handler))
        .route("/auth/refresh", post(handlers::auth::refresh_handler));

    let protected = Router::new()
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .route(
            "/issues",
            get(handlers::issues::list_issues_handler).post(handlers::issues::create_issue_handler),
        )
        .route("/issues/paginated", get(handlers::issues::paginated_issues_handler))
        .route(
            "/issues/{id}",
            get(handlers::issues::get_issue_handler)
                .put(handlers::issues::update_issue_handler)
                .delete(handlers::issues::delete_issue_handler),
        )
        .route("/issues/{id}/comments", get(handlers::comments::comments_by_issue_handler))
        .route("/issues/user/{user_id}", get(handlers::issues::issues_by_user_handler))
        .route(
            "/issues/user/{user_id}/paginated",
            get(handlers::issues::paginated_issues_by_user_handler),
        )
        .route(
            "/comments",
            get(handlers::comments::list_comments_handler)
                .post(handlers::comments::create_comment_handler),
        )
        .route(
            "/comments/{id}",
            get(handlers::comments::get_comment_handler)
                .put(handlers::comments::update_comment_handler)
                .delete(handlers::comments::delete_comment_handler),
        )
        .route(
            "/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}

/// CORS policy from config. A concrete origin plus `CREDENTIALS=true` gets a
/// credentialed policy; anything else falls back to a permissive one, since
/// wildcard origins cannot be combined with credentials.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.origin != "*"
        && let Ok(origin) = config.origin.parse::<HeaderValue>()
    {
        let layer = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        return layer.allow_credentials(config.credentials);
    }
    if config.origin != "*" {
        warn!(origin = %config.origin, "invalid CORS origin, falling back to permissive policy");
    }
    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}
