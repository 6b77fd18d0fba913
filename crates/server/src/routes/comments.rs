use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::put,
};
use db::{
    access::{self, Action, Resource},
    models::comment::{Comment, UpdateComment},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, auth::RequestContext, error::ApiError};

/// PUT /api/v1/comments/{id} - Author-only edit
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<UpdateComment>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Comment(comment_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let comment = Comment::find_by_id(state.pool(), comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    if comment.user_id != ctx.user.id {
        return Err(ApiError::Forbidden(
            "Only the author can edit a comment".to_string(),
        ));
    }

    let comment = Comment::update(state.pool(), comment_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

/// DELETE /api/v1/comments/{id} - Author-only delete
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(comment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Comment(comment_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let comment = Comment::find_by_id(state.pool(), comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    if comment.user_id != ctx.user.id {
        return Err(ApiError::Forbidden(
            "Only the author can delete a comment".to_string(),
        ));
    }

    Comment::delete(state.pool(), comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new().route("/{comment_id}", put(update_comment).delete(delete_comment));

    Router::new().nest("/comments", inner)
}
