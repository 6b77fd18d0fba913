//! Projects and project membership.
//!
//! A project lives inside an organization, carries a short key used for
//! human-facing task identifiers ("PROJ-12"), and owns boards, tasks,
//! labels and custom fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found")]
    NotFound,
    #[error("Project key already exists in this organization")]
    DuplicateKey,
    #[error("User is already a member of this project")]
    AlreadyMember,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectRole {
    Manager,
    Developer,
    Viewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
    OnHold,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub owner_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ProjectMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateProject {
    pub organization_id: Uuid,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct AddProjectMember {
    pub user_id: Uuid,
    pub role: ProjectRole,
}

/// Per-status task counts plus roster and time totals.
#[derive(Debug, Clone, Default, Serialize, TS)]
pub struct ProjectStats {
    pub total_tasks: i64,
    pub new_tasks: i64,
    pub active_tasks: i64,
    pub on_hold_tasks: i64,
    pub done_tasks: i64,
    pub member_count: i64,
    pub total_time_seconds: i64,
}

impl Project {
    /// Create the project and seed the creator as its manager, in one
    /// transaction. The per-organization key is checked up front; a unique
    /// constraint backs the check.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProject,
        id: Uuid,
        creator_id: Uuid,
    ) -> Result<Self, ProjectError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let key_taken: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects WHERE organization_id = $1 AND key = $2",
        )
        .bind(data.organization_id)
        .bind(&data.key)
        .fetch_one(&mut *tx)
        .await?;
        if key_taken > 0 {
            return Err(ProjectError::DuplicateKey);
        }

        let project = sqlx::query_as::<_, Project>(
            r#"INSERT INTO projects (id, organization_id, name, key, description, status,
                                     start_date, end_date, budget, owner_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, 'active', $6, $7, $8, $9, $10, $10)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.organization_id)
        .bind(&data.name)
        .bind(&data.key)
        .bind(&data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.budget)
        .bind(creator_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ProjectError::DuplicateKey,
            _ => ProjectError::Database(e),
        })?;

        sqlx::query(
            r#"INSERT INTO project_members (id, project_id, user_id, role, joined_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(Uuid::new_v4())
        .bind(project.id)
        .bind(creator_id)
        .bind(ProjectRole::Manager)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(project)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Projects where the user has a membership row.
    pub async fn find_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"SELECT p.*
               FROM projects p
               INNER JOIN project_members pm ON pm.project_id = p.id
               WHERE pm.user_id = $1
               ORDER BY p.created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r#"UPDATE projects
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   status = COALESCE($4, status),
                   start_date = COALESCE($5, start_date),
                   end_date = COALESCE($6, end_date),
                   budget = COALESCE($7, budget),
                   updated_at = $8
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.budget)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Deleting a project cascades to boards, columns, tasks, labels and
    /// custom fields at the schema level.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn stats(pool: &SqlitePool, id: Uuid) -> Result<ProjectStats, sqlx::Error> {
        let (total, new_tasks, active, on_hold, done): (i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"SELECT COUNT(*),
                          COUNT(CASE WHEN status = 'new' THEN 1 END),
                          COUNT(CASE WHEN status = 'active' THEN 1 END),
                          COUNT(CASE WHEN status = 'on_hold' THEN 1 END),
                          COUNT(CASE WHEN status = 'done' THEN 1 END)
                   FROM tasks WHERE project_id = $1"#,
            )
            .bind(id)
            .fetch_one(pool)
            .await?;

        let member_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM project_members WHERE project_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        let total_time_seconds: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(te.duration), 0)
               FROM time_entries te
               INNER JOIN tasks t ON t.id = te.task_id
               WHERE t.project_id = $1"#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(ProjectStats {
            total_tasks: total,
            new_tasks,
            active_tasks: active,
            on_hold_tasks: on_hold,
            done_tasks: done,
            member_count,
            total_time_seconds,
        })
    }
}

impl ProjectMember {
    pub async fn add(
        pool: &SqlitePool,
        project_id: Uuid,
        data: &AddProjectMember,
    ) -> Result<Self, ProjectError> {
        sqlx::query_as::<_, ProjectMember>(
            r#"INSERT INTO project_members (id, project_id, user_id, role, joined_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(data.user_id)
        .bind(data.role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ProjectError::AlreadyMember,
            _ => ProjectError::Database(e),
        })
    }

    pub async fn find_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            "SELECT * FROM project_members WHERE project_id = $1 ORDER BY joined_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_role(
        pool: &SqlitePool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
