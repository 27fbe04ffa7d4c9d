//! # API REST
//!
//! REST API implementation for UPS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - REST-specific concerns (JSON serialization, CORS, gateway headers)
//!
//! Uses `api-shared` for common types and utilities.

#![warn(rust_2018_idioms)]

mod error;
mod session;

pub use error::ApiError;
pub use session::CurrentSession;

use api_shared::dto::{DismissNoticeReq, DismissedNoticesRes, ErrorRes, HealthRes};
use api_shared::{HealthService, UserSession};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use ups_core::{NoticeKey, NoticeService};
use utoipa::OpenApi;

/// Application state for the REST API server
///
/// Holds the notice service and the API key the gateway must present.
#[derive(Clone)]
pub struct AppState {
    notice_service: NoticeService,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(notice_service: NoticeService, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            notice_service,
            api_key: api_key.into(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, dismiss_notice, dismissed_notices),
    components(schemas(HealthRes, DismissedNoticesRes, ErrorRes))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi))
        .route("/api/users/dismiss_notice", post(dismiss_notice))
        .route(
            "/api/users/current/dismissed_notices",
            get(dismissed_notices),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/api/users/dismiss_notice",
    params(DismissNoticeReq),
    responses(
        (status = 204, description = "Notice dismissed, or already dismissed"),
        (status = 400, description = "Missing or unknown notice", body = ErrorRes),
        (status = 401, description = "Not logged in", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Dismiss a notice for the current user
///
/// Silently succeeds if the notice is already dismissed. The session is checked before the
/// `notice` parameter, so an anonymous caller always gets 401.
///
/// # Errors
/// - `401 Unauthorized` if the gateway headers do not identify a user.
/// - `400 Bad Request` if the query string is malformed, or `notice` is missing or not a
///   recognised notice key.
/// - `500 Internal Server Error` if the property store fails.
#[axum::debug_handler]
async fn dismiss_notice(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    query: Result<Query<DismissNoticeReq>, QueryRejection>,
) -> Result<StatusCode, ApiError> {
    let user_uuid = session.logged_in_user()?;
    let Query(req) = query.map_err(ApiError::invalid_query)?;
    let notice = parse_notice(req.notice.as_deref())?;

    state.notice_service.dismiss(user_uuid, notice)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/users/current/dismissed_notices",
    responses(
        (status = 200, description = "Dismissal state per notice", body = DismissedNoticesRes),
        (status = 401, description = "Not logged in", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Dismissal state of every recognised notice for the current user
#[axum::debug_handler]
async fn dismissed_notices(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<DismissedNoticesRes>, ApiError> {
    let user_uuid = session.logged_in_user()?;
    let dismissed = state.notice_service.dismissed_notices(user_uuid)?;

    Ok(Json(DismissedNoticesRes {
        dismissed_notices: dismissed
            .into_iter()
            .map(|(notice, dismissed)| (notice.as_str().to_string(), dismissed))
            .collect(),
    }))
}

fn parse_notice(value: Option<&str>) -> Result<NoticeKey, ApiError> {
    let value = value.ok_or_else(|| ApiError::missing_parameter("notice"))?;
    value.parse().map_err(ApiError::invalid_notice)
}
