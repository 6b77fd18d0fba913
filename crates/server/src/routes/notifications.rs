use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::notification::Notification;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct NotificationQueryParams {
    #[serde(default)]
    pub unread_only: bool,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, TS)]
pub struct MarkAllReadResponse {
    pub marked: u64,
}

/// GET /api/v1/notifications - The caller's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<NotificationQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Notification>>>, ApiError> {
    let (offset, limit) = state.config().page_window(params.skip, params.limit);
    let notifications = Notification::find_for_user(
        state.pool(),
        ctx.user.id,
        params.unread_only,
        offset,
        limit,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(notifications)))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(notification_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Notification>>, ApiError> {
    let notification = Notification::mark_read(state.pool(), notification_id, ctx.user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(notification)))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<ResponseJson<ApiResponse<MarkAllReadResponse>>, ApiError> {
    let marked = Notification::mark_all_read(state.pool(), ctx.user.id).await?;
    Ok(ResponseJson(ApiResponse::success(MarkAllReadResponse {
        marked,
    })))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_notifications))
        .route("/read-all", put(mark_all_read))
        .route("/{notification_id}/read", put(mark_read));

    Router::new().nest("/notifications", inner)
}
