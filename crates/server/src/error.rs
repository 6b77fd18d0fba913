//! Error-to-response mapping for the HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    access::AccessError,
    models::{
        board::BoardError, label::LabelError, organization::OrganizationError,
        project::ProjectError, task::TaskError, time_entry::TimeEntryError,
    },
};
use services::services::auth::AuthError;
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Database(sqlx::Error::RowNotFound) => "Resource not found".to_string(),
            ApiError::Database(err) => {
                error!(?err, "database error while handling request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            AccessError::Forbidden => ApiError::Forbidden("Access denied".to_string()),
            AccessError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<OrganizationError> for ApiError {
    fn from(err: OrganizationError) -> Self {
        match err {
            OrganizationError::NotFound => ApiError::NotFound(err.to_string()),
            OrganizationError::AlreadyMember => ApiError::Conflict(err.to_string()),
            OrganizationError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound => ApiError::NotFound(err.to_string()),
            ProjectError::DuplicateKey | ProjectError::AlreadyMember => {
                ApiError::Conflict(err.to_string())
            }
            ProjectError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        match err {
            BoardError::NotFound | BoardError::ColumnNotFound => ApiError::NotFound(err.to_string()),
            BoardError::InvalidReorder => ApiError::Conflict(err.to_string()),
            BoardError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => ApiError::NotFound(err.to_string()),
            TaskError::AlreadyAssigned
            | TaskError::LabelAlreadyAttached
            | TaskError::LabelProjectMismatch
            | TaskError::DependencyExists
            | TaskError::SelfDependency => ApiError::Conflict(err.to_string()),
            TaskError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<LabelError> for ApiError {
    fn from(err: LabelError) -> Self {
        match err {
            LabelError::NotFound => ApiError::NotFound(err.to_string()),
            LabelError::DuplicateName => ApiError::Conflict(err.to_string()),
            LabelError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<TimeEntryError> for ApiError {
    fn from(err: TimeEntryError) -> Self {
        match err {
            TimeEntryError::NotFound => ApiError::NotFound(err.to_string()),
            TimeEntryError::NotRunning => ApiError::Conflict(err.to_string()),
            TimeEntryError::Database(e) => ApiError::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(AccessError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AccessError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(ProjectError::DuplicateKey).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
