use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::user::{UpdateUser, User};
use utils::response::ApiResponse;
use uuid::Uuid;

use super::PageQuery;
use crate::{AppState, auth::RequestContext, error::ApiError};

/// GET /api/v1/users/me - Current user profile
pub async fn get_me(
    Extension(ctx): Extension<RequestContext>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(ctx.user)))
}

/// PUT /api/v1/users/me - Update current user profile
pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<UpdateUser>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::update(state.pool(), ctx.user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// GET /api/v1/users/{id} - Fetch a user by id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(state.pool(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

/// GET /api/v1/users - List users (paginated)
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, ApiError> {
    let (offset, limit) = state.config().page_window(page.skip, page.limit);
    let users = User::find_all(state.pool(), offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_me).put(update_me))
        .route("/{user_id}", get(get_user));

    Router::new().nest("/users", inner)
}
