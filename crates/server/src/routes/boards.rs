use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::{
    access::{self, Action, Resource},
    models::board::{
        Board, BoardColumn, BoardWithColumns, CreateBoard, CreateColumn, ReorderColumns,
        UpdateBoard, UpdateColumn,
    },
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct BoardQueryParams {
    pub project_id: Uuid,
}

/// POST /api/v1/boards - Create a board; always seeds the three default
/// columns at positions 0, 1, 2.
pub async fn create_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateBoard>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<BoardWithColumns>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(payload.project_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let board = Board::create(state.pool(), &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(board)),
    ))
}

/// GET /api/v1/boards?project_id= - Boards of a project, ordered by position
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<BoardQueryParams>,
) -> Result<ResponseJson<ApiResponse<Vec<Board>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Project(params.project_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let boards = Board::find_for_project(state.pool(), params.project_id).await?;
    Ok(ResponseJson(ApiResponse::success(boards)))
}

/// GET /api/v1/boards/{id} - Board with its ordered columns
pub async fn get_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(board_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BoardWithColumns>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Board(board_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let board = Board::with_columns(state.pool(), board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

/// PUT /api/v1/boards/{id}
pub async fn update_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<UpdateBoard>,
) -> Result<ResponseJson<ApiResponse<Board>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Board(board_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let board = Board::update(state.pool(), board_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

/// DELETE /api/v1/boards/{id}
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(board_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Board(board_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    Board::delete(state.pool(), board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/boards/{id}/columns - Add a column at a caller-chosen
/// position.
pub async fn create_column(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<CreateColumn>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<BoardColumn>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Board(board_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let column = BoardColumn::create(state.pool(), board_id, &payload, Uuid::new_v4()).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(column)),
    ))
}

/// PUT /api/v1/boards/{id}/columns/reorder - Dense positions 0..n in the
/// submitted order.
pub async fn reorder_columns(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<ReorderColumns>,
) -> Result<ResponseJson<ApiResponse<Vec<BoardColumn>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Board(board_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let columns = BoardColumn::reorder(state.pool(), board_id, &payload.column_ids).await?;
    Ok(ResponseJson(ApiResponse::success(columns)))
}

/// PUT /api/v1/boards/columns/{id}
pub async fn update_column(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(column_id): Path<Uuid>,
    Json(payload): Json<UpdateColumn>,
) -> Result<ResponseJson<ApiResponse<BoardColumn>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Column(column_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    let column = BoardColumn::update(state.pool(), column_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(column)))
}

/// DELETE /api/v1/boards/columns/{id} - Tasks in the column fall back to no
/// column (SET NULL), keeping their numbers.
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(column_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Column(column_id),
        ctx.user.id,
        Action::Write,
    )
    .await?;

    BoardColumn::delete(state.pool(), column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_boards).post(create_board))
        .route(
            "/{board_id}",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/{board_id}/columns", post(create_column))
        .route("/{board_id}/columns/reorder", put(reorder_columns))
        .route(
            "/columns/{column_id}",
            put(update_column).delete(delete_column),
        );

    Router::new().nest("/boards", inner)
}
