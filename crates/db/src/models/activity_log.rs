//! Append-only activity trail for projects and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    /// created, updated, deleted, moved, commented, ...
    pub action: String,
    /// task, comment, project, board, ...
    pub entity_type: String,
    pub entity_id: Uuid,
    /// Old/new values as a JSON object.
    pub changes: Option<Value>,
    pub created_at: DateTime<Utc>,
}

pub struct NewActivity<'a> {
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Uuid,
    pub changes: Option<Value>,
}

impl ActivityLog {
    pub async fn create(pool: &SqlitePool, entry: NewActivity<'_>) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"INSERT INTO activity_log (id, user_id, project_id, task_id, action, entity_type,
                                         entity_id, changes, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.project_id)
        .bind(entry.task_id)
        .bind(entry.action)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.changes)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"SELECT * FROM activity_log
               WHERE project_id = $1
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(project_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_task(
        pool: &SqlitePool,
        task_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"SELECT * FROM activity_log
               WHERE task_id = $1
               ORDER BY created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(task_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
