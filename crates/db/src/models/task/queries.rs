//! CRUD queries for tasks, including number and position assignment.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{CreateTask, Task, TaskError, TaskFilter, TaskPriority, TaskType, UpdateTask};

impl Task {
    /// Create a task, assigning `task_number` and `position` inside the
    /// INSERT itself.
    ///
    /// Both values are computed by correlated subqueries so the
    /// read-then-write window of a two-step max+1 disappears: SQLite executes
    /// the whole statement under its single-writer lock, and the
    /// UNIQUE(project_id, task_number) constraint turns any residual
    /// collision into an error instead of a silent duplicate.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        id: Uuid,
        creator_id: Option<Uuid>,
    ) -> Result<Self, TaskError> {
        let priority = data.priority.unwrap_or(TaskPriority::Medium);
        let task_type = data.task_type.unwrap_or(TaskType::Task);

        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, project_id, board_id, column_id, title, description,
                                  task_number, priority, status, task_type, story_points,
                                  estimated_hours, actual_hours, start_date, due_date, position,
                                  creator_id, parent_task_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6,
                       (SELECT COALESCE(MAX(task_number), 0) + 1 FROM tasks WHERE project_id = $2),
                       $7, 'new', $8, $9,
                       $10, 0, $11, $12,
                       CASE WHEN $4 IS NULL THEN 0
                            ELSE COALESCE((SELECT MAX(position) + 1 FROM tasks WHERE column_id = $4), 0)
                       END,
                       $13, $14, $15, $15)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(data.board_id)
        .bind(data.column_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(priority)
        .bind(task_type)
        .bind(data.story_points)
        .bind(data.estimated_hours)
        .bind(data.start_date)
        .bind(data.due_date)
        .bind(creator_id)
        .bind(data.parent_task_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(TaskError::Database)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
        filter: &TaskFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT * FROM tasks
               WHERE project_id = $1
                 AND ($2 IS NULL OR board_id = $2)
                 AND ($3 IS NULL OR column_id = $3)
                 AND ($4 IS NULL OR status = $4)
                 AND ($5 IS NULL OR EXISTS (
                       SELECT 1 FROM task_assignees ta
                       WHERE ta.task_id = tasks.id AND ta.user_id = $5))
               ORDER BY position ASC, created_at ASC
               LIMIT $6 OFFSET $7"#,
        )
        .bind(project_id)
        .bind(filter.board_id)
        .bind(filter.column_id)
        .bind(filter.status)
        .bind(filter.assignee_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Apply a partial update.
    ///
    /// When the column changes, `position` is recomputed as one past the
    /// destination column's maximum (same single-statement rule as create);
    /// an explicit `position` in the payload only applies when the column
    /// stays put. `completed_at` is stamped on the first transition to done
    /// and then left alone.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Self, TaskError> {
        let current = Self::find_by_id(pool, id).await?.ok_or(TaskError::NotFound)?;
        let column_changed = match data.column_id {
            Some(new_column) => current.column_id != Some(new_column),
            None => false,
        };

        let task = if column_changed {
            sqlx::query_as::<_, Task>(
                r#"UPDATE tasks
                   SET title = COALESCE($2, title),
                       description = COALESCE($3, description),
                       priority = COALESCE($4, priority),
                       status = COALESCE($5, status),
                       task_type = COALESCE($6, task_type),
                       story_points = COALESCE($7, story_points),
                       estimated_hours = COALESCE($8, estimated_hours),
                       start_date = COALESCE($9, start_date),
                       due_date = COALESCE($10, due_date),
                       column_id = $11,
                       position = COALESCE(
                           (SELECT MAX(position) + 1 FROM tasks WHERE column_id = $11 AND id <> $1),
                           0),
                       completed_at = CASE
                           WHEN $5 = 'done' AND completed_at IS NULL THEN $12
                           ELSE completed_at
                       END,
                       updated_at = $12
                   WHERE id = $1
                   RETURNING *"#,
            )
            .bind(id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.priority)
            .bind(data.status)
            .bind(data.task_type)
            .bind(data.story_points)
            .bind(data.estimated_hours)
            .bind(data.start_date)
            .bind(data.due_date)
            .bind(data.column_id)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?
        } else {
            sqlx::query_as::<_, Task>(
                r#"UPDATE tasks
                   SET title = COALESCE($2, title),
                       description = COALESCE($3, description),
                       priority = COALESCE($4, priority),
                       status = COALESCE($5, status),
                       task_type = COALESCE($6, task_type),
                       story_points = COALESCE($7, story_points),
                       estimated_hours = COALESCE($8, estimated_hours),
                       start_date = COALESCE($9, start_date),
                       due_date = COALESCE($10, due_date),
                       position = COALESCE($11, position),
                       completed_at = CASE
                           WHEN $5 = 'done' AND completed_at IS NULL THEN $12
                           ELSE completed_at
                       END,
                       updated_at = $12
                   WHERE id = $1
                   RETURNING *"#,
            )
            .bind(id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.priority)
            .bind(data.status)
            .bind(data.task_type)
            .bind(data.story_points)
            .bind(data.estimated_hours)
            .bind(data.start_date)
            .bind(data.due_date)
            .bind(data.position)
            .bind(Utc::now())
            .fetch_one(pool)
            .await?
        };

        Ok(task)
    }

    /// Move the task to another column, placing it one past the
    /// destination's maximum position (0 for an empty column).
    pub async fn move_to_column(
        pool: &SqlitePool,
        id: Uuid,
        column_id: Uuid,
    ) -> Result<Self, TaskError> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET column_id = $2,
                   position = COALESCE(
                       (SELECT MAX(position) + 1 FROM tasks WHERE column_id = $2 AND id <> $1),
                       0),
                   updated_at = $3
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(column_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => TaskError::NotFound,
            other => TaskError::Database(other),
        })
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Recompute `actual_hours` from the summed duration of the task's time
    /// entries.
    pub async fn refresh_actual_hours(pool: &SqlitePool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE tasks
               SET actual_hours = (
                   SELECT COALESCE(SUM(duration), 0) / 3600.0
                   FROM time_entries WHERE task_id = $1
               ),
               updated_at = $2
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
        Ok(())
    }
}
