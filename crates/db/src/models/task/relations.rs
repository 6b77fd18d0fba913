//! Assignees, labels and dependency edges attached to a task.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{
    CreateTaskDependency, DependencyType, GanttData, Task, TaskAssignee, TaskDependency,
    TaskError, TaskWithDetails,
};
use crate::models::{label::Label, user::User};

impl TaskAssignee {
    pub async fn add(
        pool: &SqlitePool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, TaskError> {
        sqlx::query_as::<_, TaskAssignee>(
            r#"INSERT INTO task_assignees (id, task_id, user_id, assigned_at)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => TaskError::AlreadyAssigned,
            _ => TaskError::Database(e),
        })
    }

    pub async fn remove(
        pool: &SqlitePool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignees WHERE task_id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl TaskDependency {
    pub async fn add(
        pool: &SqlitePool,
        task_id: Uuid,
        data: &CreateTaskDependency,
    ) -> Result<Self, TaskError> {
        if task_id == data.depends_on_task_id {
            return Err(TaskError::SelfDependency);
        }
        let dependency_type = data.dependency_type.unwrap_or(DependencyType::FinishToStart);

        sqlx::query_as::<_, TaskDependency>(
            r#"INSERT INTO task_dependencies (id, task_id, depends_on_task_id, dependency_type, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(data.depends_on_task_id)
        .bind(dependency_type)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => TaskError::DependencyExists,
            _ => TaskError::Database(e),
        })
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TaskDependency>("SELECT * FROM task_dependencies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_dependencies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Task {
    pub async fn assignees(pool: &SqlitePool, task_id: Uuid) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"SELECT u.*
               FROM users u
               INNER JOIN task_assignees ta ON ta.user_id = u.id
               WHERE ta.task_id = $1
               ORDER BY ta.assigned_at ASC"#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    pub async fn labels(pool: &SqlitePool, task_id: Uuid) -> Result<Vec<Label>, sqlx::Error> {
        sqlx::query_as::<_, Label>(
            r#"SELECT l.*
               FROM labels l
               INNER JOIN task_labels tl ON tl.label_id = l.id
               WHERE tl.task_id = $1
               ORDER BY l.name ASC"#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Attach a label; the label must belong to the task's project.
    pub async fn add_label(
        pool: &SqlitePool,
        task: &Task,
        label_id: Uuid,
    ) -> Result<(), TaskError> {
        let label = Label::find_by_id(pool, label_id)
            .await?
            .ok_or(TaskError::NotFound)?;
        if label.project_id != task.project_id {
            return Err(TaskError::LabelProjectMismatch);
        }

        sqlx::query("INSERT INTO task_labels (id, task_id, label_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(task.id)
            .bind(label_id)
            .execute(pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    TaskError::LabelAlreadyAttached
                }
                _ => TaskError::Database(e),
            })?;
        Ok(())
    }

    pub async fn remove_label(
        pool: &SqlitePool,
        task_id: Uuid,
        label_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_labels WHERE task_id = $1 AND label_id = $2")
            .bind(task_id)
            .bind(label_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Assemble the detail view: assignees, labels and satellite counts.
    pub async fn with_details(
        pool: &SqlitePool,
        task: Task,
    ) -> Result<TaskWithDetails, sqlx::Error> {
        let assignees = Self::assignees(pool, task.id).await?;
        let labels = Self::labels(pool, task.id).await?;

        let comments_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE task_id = $1")
                .bind(task.id)
                .fetch_one(pool)
                .await?;
        let attachments_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attachments WHERE task_id = $1")
                .bind(task.id)
                .fetch_one(pool)
                .await?;
        let checklists_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM checklists WHERE task_id = $1")
                .bind(task.id)
                .fetch_one(pool)
                .await?;
        let time_tracked_seconds: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(duration), 0) FROM time_entries WHERE task_id = $1",
        )
        .bind(task.id)
        .fetch_one(pool)
        .await?;

        Ok(TaskWithDetails {
            task,
            assignees,
            labels,
            comments_count,
            attachments_count,
            checklists_count,
            time_tracked_seconds,
        })
    }

    /// Tasks plus dependency edges for a whole project.
    pub async fn gantt_data(pool: &SqlitePool, project_id: Uuid) -> Result<GanttData, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = $1 ORDER BY start_date ASC, task_number ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        let dependencies = sqlx::query_as::<_, TaskDependency>(
            r#"SELECT td.*
               FROM task_dependencies td
               INNER JOIN tasks t ON t.id = td.task_id
               WHERE t.project_id = $1"#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(GanttData {
            tasks,
            dependencies,
        })
    }
}
