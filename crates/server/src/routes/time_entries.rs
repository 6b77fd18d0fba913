use axum::{
    Extension, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, put},
};
use db::{
    access::{self, Action, Resource},
    models::{task::Task, time_entry::TimeEntry},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

/// PUT /api/v1/time-entries/{id}/stop - Stop the caller's running timer and
/// refresh the task's actual_hours.
pub async fn stop_time_entry(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(entry_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TimeEntry>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::TimeEntry(entry_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let entry = TimeEntry::find_by_id(state.pool(), entry_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Time entry not found".to_string()))?;
    if entry.user_id != ctx.user.id {
        return Err(ApiError::Forbidden(
            "Only the owner can stop a timer".to_string(),
        ));
    }

    let entry = TimeEntry::stop(state.pool(), entry_id).await?;
    Task::refresh_actual_hours(state.pool(), entry.task_id).await?;

    Ok(ResponseJson(ApiResponse::success(entry)))
}

/// DELETE /api/v1/time-entries/{id} - Owner-only delete; the task's
/// actual_hours is refreshed afterwards.
pub async fn delete_time_entry(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(entry_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::TimeEntry(entry_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let entry = TimeEntry::find_by_id(state.pool(), entry_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Time entry not found".to_string()))?;
    if entry.user_id != ctx.user.id {
        return Err(ApiError::Forbidden(
            "Only the owner can delete a time entry".to_string(),
        ));
    }

    TimeEntry::delete(state.pool(), entry_id).await?;
    Task::refresh_actual_hours(state.pool(), entry.task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/{entry_id}/stop", put(stop_time_entry))
        .route("/{entry_id}", delete(delete_time_entry));

    Router::new().nest("/time-entries", inner)
}
