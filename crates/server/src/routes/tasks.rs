use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, get, post, put},
};
use db::{
    access::{self, Action, Resource},
    models::{
        activity_log::ActivityLog,
        attachment::Attachment,
        board::{Board, BoardColumn},
        checklist::{Checklist, ChecklistWithItems, CreateChecklist},
        comment::{Comment, CreateComment},
        custom_field::{CustomField, SetCustomFieldValue, TaskCustomFieldValue},
        label::Label,
        task::{
            CreateTask, CreateTaskDependency, MoveTask, Task, TaskAssignee, TaskDependency,
            TaskFilter, TaskStatus, TaskWithDetails, UpdateTask,
        },
        time_entry::{CreateTimeEntry, TimeEntry},
    },
};
use serde::Deserialize;
use serde_json::json;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct TaskListQuery {
    pub project_id: Uuid,
    pub board_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct AssignUser {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, TS)]
pub struct AttachLabel {
    pub label_id: Uuid,
}

/// POST /api/v1/tasks - Create a task. The board must belong to the target
/// project and the column (if given) to that board; numbering and placement
/// happen inside the insert.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Task>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(payload.project_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let board = Board::find_by_id(state.pool(), payload.board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    if board.project_id != payload.project_id {
        return Err(ApiError::Conflict(
            "Board belongs to a different project".to_string(),
        ));
    }

    if let Some(column_id) = payload.column_id {
        let column = BoardColumn::find_by_id(state.pool(), column_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;
        if column.board_id != payload.board_id {
            return Err(ApiError::Conflict(
                "Column belongs to a different board".to_string(),
            ));
        }
    }

    let task = Task::create(state.pool(), &payload, Uuid::new_v4(), Some(ctx.user.id)).await?;

    state
        .activity()
        .record(
            ctx.user.id,
            task.project_id,
            Some(task.id),
            "created",
            "task",
            task.id,
            Some(json!({ "title": task.title, "task_number": task.task_number })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(task)),
    ))
}

/// GET /api/v1/tasks?project_id=... - Filtered task listing
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<TaskListQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(params.project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let filter = TaskFilter {
        board_id: params.board_id,
        column_id: params.column_id,
        status: params.status,
        assignee_id: params.assignee_id,
    };
    let (offset, limit) = state.config().page_window(params.skip, params.limit);
    let tasks =
        Task::find_for_project(state.pool(), params.project_id, &filter, offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

/// GET /api/v1/tasks/{id} - Task with assignees, labels and counts
pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<TaskWithDetails>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let details = Task::with_details(state.pool(), task).await?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

/// PUT /api/v1/tasks/{id} - Partial update. A column change re-runs
/// placement; the first transition to done stamps completed_at.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    if let Some(column_id) = payload.column_id {
        let task = Task::find_by_id(state.pool(), task_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
        let column = BoardColumn::find_by_id(state.pool(), column_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;
        if column.board_id != task.board_id {
            return Err(ApiError::Conflict(
                "Column belongs to a different board".to_string(),
            ));
        }
    }

    let task = Task::update(state.pool(), task_id, &payload).await?;

    state
        .activity()
        .record(
            ctx.user.id,
            task.project_id,
            Some(task.id),
            "updated",
            "task",
            task.id,
            Some(update_changes(&payload)),
        )
        .await;

    Ok(ResponseJson(ApiResponse::success(task)))
}

/// PUT /api/v1/tasks/{id}/move - Move to another column of the same board;
/// position is computed server-side.
pub async fn move_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<MoveTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let column = BoardColumn::find_by_id(state.pool(), payload.column_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Column not found".to_string()))?;
    if column.board_id != task.board_id {
        return Err(ApiError::Conflict(
            "Column belongs to a different board".to_string(),
        ));
    }

    let task = Task::move_to_column(state.pool(), task_id, payload.column_id).await?;

    state
        .activity()
        .record(
            ctx.user.id,
            task.project_id,
            Some(task.id),
            "moved",
            "task",
            task.id,
            Some(json!({ "column_id": payload.column_id, "position": task.position })),
        )
        .await;

    Ok(ResponseJson(ApiResponse::success(task)))
}

/// DELETE /api/v1/tasks/{id} - The task number is never reused.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Task::delete(state.pool(), task_id).await?;

    // Recorded without task_id so the entry survives the cascade.
    state
        .activity()
        .record(
            ctx.user.id,
            task.project_id,
            None,
            "deleted",
            "task",
            task.id,
            Some(json!({ "title": task.title, "task_number": task.task_number })),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/assignees
pub async fn add_assignee(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AssignUser>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<TaskAssignee>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let assignee = TaskAssignee::add(state.pool(), task_id, payload.user_id).await?;

    state.notifier().task_assigned(&task, payload.user_id).await;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(assignee)),
    ))
}

/// DELETE /api/v1/tasks/{id}/assignees/{user_id}
pub async fn remove_assignee(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((task_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let removed = TaskAssignee::remove(state.pool(), task_id, user_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Assignee not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/labels
pub async fn add_label(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AttachLabel>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Vec<Label>>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    Task::add_label(state.pool(), &task, payload.label_id).await?;

    let labels = Task::labels(state.pool(), task_id).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(labels)),
    ))
}

/// DELETE /api/v1/tasks/{id}/labels/{label_id}
pub async fn remove_label(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((task_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let removed = Task::remove_label(state.pool(), task_id, label_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Label not attached".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tasks/{id}/dependencies - The dependency target must live in
/// the same project. Cycles beyond direct self-dependency are not detected.
pub async fn add_dependency(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<CreateTaskDependency>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<TaskDependency>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let depends_on = Task::find_by_id(state.pool(), payload.depends_on_task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dependency target not found".to_string()))?;
    if depends_on.project_id != task.project_id {
        return Err(ApiError::Conflict(
            "Dependency target belongs to a different project".to_string(),
        ));
    }

    let dependency = TaskDependency::add(state.pool(), task_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(dependency)),
    ))
}

/// DELETE /api/v1/tasks/{id}/dependencies/{dep_id}
pub async fn remove_dependency(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((task_id, dep_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let dependency = TaskDependency::find_by_id(state.pool(), dep_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dependency not found".to_string()))?;
    if dependency.task_id != task_id {
        return Err(ApiError::NotFound("Dependency not found".to_string()));
    }

    TaskDependency::delete(state.pool(), dep_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/tasks/{id}/activity
pub async fn get_activity(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Query(page): Query<super::PageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ActivityLog>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let (offset, limit) = state.config().page_window(page.skip, page.limit);
    let entries = ActivityLog::find_for_task(state.pool(), task_id, offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// POST /api/v1/tasks/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<CreateComment>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Comment>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let comment =
        Comment::create(state.pool(), task_id, ctx.user.id, &payload, Uuid::new_v4()).await?;

    state.notifier().task_commented(&task, ctx.user.id).await;
    state
        .activity()
        .record(
            ctx.user.id,
            task.project_id,
            Some(task.id),
            "commented",
            "comment",
            comment.id,
            None,
        )
        .await;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(comment)),
    ))
}

/// GET /api/v1/tasks/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Comment>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let comments = Comment::find_for_task(state.pool(), task_id).await?;
    Ok(ResponseJson(ApiResponse::success(comments)))
}

/// POST /api/v1/tasks/{id}/checklists
pub async fn create_checklist(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<CreateChecklist>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Checklist>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let checklist = Checklist::create(state.pool(), task_id, &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(checklist)),
    ))
}

/// GET /api/v1/tasks/{id}/checklists
pub async fn list_checklists(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ChecklistWithItems>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let checklists = Checklist::find_for_task(state.pool(), task_id).await?;
    Ok(ResponseJson(ApiResponse::success(checklists)))
}

/// POST /api/v1/tasks/{id}/time-entries - Log an interval or start a timer;
/// the task's actual_hours is refreshed from the entry sum.
pub async fn create_time_entry(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<CreateTimeEntry>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<TimeEntry>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let entry =
        TimeEntry::create(state.pool(), task_id, ctx.user.id, &payload, Uuid::new_v4()).await?;
    Task::refresh_actual_hours(state.pool(), task_id).await?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(entry)),
    ))
}

/// GET /api/v1/tasks/{id}/time-entries
pub async fn list_time_entries(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<TimeEntry>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let entries = TimeEntry::find_for_task(state.pool(), task_id).await?;
    Ok(ResponseJson(ApiResponse::success(entries)))
}

/// PUT /api/v1/tasks/{id}/custom-fields/{field_id} - Upsert the value
pub async fn set_custom_field_value(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((task_id, field_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SetCustomFieldValue>,
) -> Result<ResponseJson<ApiResponse<TaskCustomFieldValue>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let task = Task::find_by_id(state.pool(), task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    let field = CustomField::find_by_id(state.pool(), field_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Custom field not found".to_string()))?;
    if field.project_id != task.project_id {
        return Err(ApiError::Conflict(
            "Custom field belongs to a different project".to_string(),
        ));
    }

    let value =
        TaskCustomFieldValue::set(state.pool(), task_id, field_id, payload.value.as_deref())
            .await?;
    Ok(ResponseJson(ApiResponse::success(value)))
}

/// GET /api/v1/tasks/{id}/attachments - Metadata only; the upload transport
/// lives outside this service.
pub async fn list_attachments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Attachment>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let attachments = Attachment::find_for_task(state.pool(), task_id).await?;
    Ok(ResponseJson(ApiResponse::success(attachments)))
}

/// GET /api/v1/tasks/{id}/custom-fields
pub async fn list_custom_field_values(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<TaskCustomFieldValue>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Task(task_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let values = TaskCustomFieldValue::find_for_task(state.pool(), task_id).await?;
    Ok(ResponseJson(ApiResponse::success(values)))
}

/// Summarize which fields an update touched, with their new values.
fn update_changes(payload: &UpdateTask) -> serde_json::Value {
    let mut changes = serde_json::Map::new();
    if let Some(title) = &payload.title {
        changes.insert("title".to_string(), json!(title));
    }
    if let Some(status) = payload.status {
        changes.insert("status".to_string(), json!(status));
    }
    if let Some(priority) = payload.priority {
        changes.insert("priority".to_string(), json!(priority));
    }
    if let Some(column_id) = payload.column_id {
        changes.insert("column_id".to_string(), json!(column_id));
    }
    if let Some(due_date) = payload.due_date {
        changes.insert("due_date".to_string(), json!(due_date));
    }
    serde_json::Value::Object(changes)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route(
            "/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/{task_id}/move", put(move_task))
        .route("/{task_id}/assignees", post(add_assignee))
        .route("/{task_id}/assignees/{user_id}", delete(remove_assignee))
        .route("/{task_id}/labels", post(add_label))
        .route("/{task_id}/labels/{label_id}", delete(remove_label))
        .route("/{task_id}/dependencies", post(add_dependency))
        .route("/{task_id}/dependencies/{dep_id}", delete(remove_dependency))
        .route("/{task_id}/activity", get(get_activity))
        .route("/{task_id}/comments", get(list_comments).post(create_comment))
        .route(
            "/{task_id}/checklists",
            get(list_checklists).post(create_checklist),
        )
        .route(
            "/{task_id}/time-entries",
            get(list_time_entries).post(create_time_entry),
        )
        .route("/{task_id}/attachments", get(list_attachments))
        .route("/{task_id}/custom-fields", get(list_custom_field_values))
        .route(
            "/{task_id}/custom-fields/{field_id}",
            put(set_custom_field_value),
        );

    Router::new().nest("/tasks", inner)
}
