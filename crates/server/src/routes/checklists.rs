use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{post, put},
};
use db::{
    access::{self, Action, Resource},
    models::checklist::{
        Checklist, ChecklistItem, CreateChecklistItem, UpdateChecklist, UpdateChecklistItem,
    },
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

/// PUT /api/v1/checklists/{id}
pub async fn update_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(checklist_id): Path<Uuid>,
    Json(payload): Json<UpdateChecklist>,
) -> Result<ResponseJson<ApiResponse<Checklist>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Checklist(checklist_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let checklist = Checklist::update(state.pool(), checklist_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(checklist)))
}

/// DELETE /api/v1/checklists/{id}
pub async fn delete_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(checklist_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Checklist(checklist_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    Checklist::delete(state.pool(), checklist_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/checklists/{id}/items
pub async fn create_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(checklist_id): Path<Uuid>,
    Json(payload): Json<CreateChecklistItem>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<ChecklistItem>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Checklist(checklist_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let item = ChecklistItem::create(state.pool(), checklist_id, &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(item)),
    ))
}

/// PUT /api/v1/checklists/items/{id} - Completing an item stamps its
/// completed_at; un-completing clears it.
pub async fn update_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateChecklistItem>,
) -> Result<ResponseJson<ApiResponse<ChecklistItem>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::ChecklistItem(item_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let item = ChecklistItem::update(state.pool(), item_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(item)))
}

/// DELETE /api/v1/checklists/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::ChecklistItem(item_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    ChecklistItem::delete(state.pool(), item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route(
            "/{checklist_id}",
            put(update_checklist).delete(delete_checklist),
        )
        .route("/{checklist_id}/items", post(create_item))
        .route("/items/{item_id}", put(update_item).delete(delete_item));

    Router::new().nest("/checklists", inner)
}
