use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::{
    access::{self, Action, Resource},
    models::{
        activity_log::ActivityLog,
        custom_field::{CreateCustomField, CustomField},
        project::{
            AddProjectMember, CreateProject, Project, ProjectMember, ProjectStats, UpdateProject,
        },
        task::{GanttData, Task},
    },
};
use serde_json::json;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::PageQuery;
use crate::{AppState, auth::RequestContext, error::ApiError};

/// POST /api/v1/projects - Create a project; any member of the target
/// organization may do so and becomes its manager.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateProject>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Project>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(payload.organization_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let project = Project::create(state.pool(), &payload, Uuid::new_v4(), ctx.user.id).await?;

    state
        .activity()
        .record(
            ctx.user.id,
            project.id,
            None,
            "created",
            "project",
            project.id,
            Some(json!({ "name": project.name, "key": project.key })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(project)),
    ))
}

/// GET /api/v1/projects - Projects the caller belongs to
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let (offset, limit) = state.config().page_window(page.skip, page.limit);
    let projects = Project::find_for_user(state.pool(), ctx.user.id, offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let project = Project::find_by_id(state.pool(), project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let project = Project::update(state.pool(), project_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/v1/projects/{id} - Cascades to boards, columns, tasks,
/// labels and custom fields.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    Project::delete(state.pool(), project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<AddProjectMember>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<ProjectMember>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let member = ProjectMember::add(state.pool(), project_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(member)),
    ))
}

/// GET /api/v1/projects/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectMember>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let members = ProjectMember::find_for_project(state.pool(), project_id).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

/// GET /api/v1/projects/{id}/activity
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ActivityLog>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let (offset, limit) = state.config().page_window(page.skip, page.limit);
    let entries = ActivityLog::find_for_project(state.pool(), project_id, offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// GET /api/v1/projects/{id}/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProjectStats>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let stats = Project::stats(state.pool(), project_id).await?;
    Ok(ResponseJson(ApiResponse::success(stats)))
}

/// GET /api/v1/projects/{id}/gantt - Tasks plus dependency edges
pub async fn get_gantt(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<GanttData>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let data = Task::gantt_data(state.pool(), project_id).await?;
    Ok(ResponseJson(ApiResponse::success(data)))
}

/// POST /api/v1/projects/{id}/custom-fields
pub async fn create_custom_field(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateCustomField>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<CustomField>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let field = CustomField::create(state.pool(), project_id, &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(field)),
    ))
}

/// GET /api/v1/projects/{id}/custom-fields
pub async fn list_custom_fields(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<CustomField>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let fields = CustomField::find_for_project(state.pool(), project_id).await?;
    Ok(ResponseJson(ApiResponse::success(fields)))
}

/// DELETE /api/v1/projects/{id}/custom-fields/{field_id}
pub async fn delete_custom_field(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((project_id, field_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::CustomField(field_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let field = CustomField::find_by_id(state.pool(), field_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Custom field not found".to_string()))?;
    if field.project_id != project_id {
        return Err(ApiError::NotFound("Custom field not found".to_string()));
    }

    CustomField::delete(state.pool(), field_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/{project_id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/{project_id}/members", get(list_members).post(add_member))
        .route("/{project_id}/activity", get(get_activity))
        .route("/{project_id}/stats", get(get_stats))
        .route("/{project_id}/gantt", get(get_gantt))
        .route(
            "/{project_id}/custom-fields",
            get(list_custom_fields).post(create_custom_field),
        )
        .route(
            "/{project_id}/custom-fields/{field_id}",
            delete(delete_custom_field),
        );

    Router::new().nest("/projects", inner)
}
