use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::{
    access::{self, Action, Resource},
    models::label::{CreateLabel, Label, UpdateLabel},
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct LabelQueryParams {
    pub project_id: Uuid,
}

/// POST /api/v1/labels - Create a project-scoped label
pub async fn create_label(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateLabel>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Label>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(payload.project_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let label = Label::create(state.pool(), &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(label)),
    ))
}

/// GET /api/v1/labels?project_id= - Labels of a project
pub async fn list_labels(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<LabelQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Label>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(params.project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let labels = Label::find_for_project(state.pool(), params.project_id).await?;
    Ok(ResponseJson(ApiResponse::success(labels)))
}

/// PUT /api/v1/labels/{id}
pub async fn update_label(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(label_id): Path<Uuid>,
    Json(payload): Json<UpdateLabel>,
) -> Result<ResponseJson<ApiResponse<Label>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Label(label_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let label = Label::update(state.pool(), label_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(label)))
}

/// DELETE /api/v1/labels/{id}
pub async fn delete_label(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(label_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Label(label_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    Label::delete(state.pool(), label_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_labels).post(create_label))
        .route("/{label_id}", put(update_label).delete(delete_label));

    Router::new().nest("/labels", inner)
}
