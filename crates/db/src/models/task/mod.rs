//! Tasks: the unit of work on a board.
//!
//! Each task carries a per-project sequential `task_number` (rendered as
//! "PROJ-12" with the project key) and a `position` ordering it inside its
//! column. Both are assigned inside the INSERT/UPDATE statements themselves;
//! see `queries.rs`.

mod queries;
mod relations;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

use crate::models::{label::Label, user::User};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found")]
    NotFound,
    #[error("User is already assigned to this task")]
    AlreadyAssigned,
    #[error("Label is already attached to this task")]
    LabelAlreadyAttached,
    #[error("Label belongs to a different project")]
    LabelProjectMismatch,
    #[error("Dependency already exists")]
    DependencyExists,
    #[error("A task cannot depend on itself")]
    SelfDependency,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskStatus {
    New,
    Active,
    OnHold,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskType {
    Task,
    Bug,
    Feature,
    Epic,
}

/// Dependency edge kinds, kept for Gantt rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DependencyType {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub board_id: Uuid,
    pub column_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    /// Per-project monotonic number; never reused after deletion.
    pub task_number: i64,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub story_points: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: f64,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Ordering within the column; sparse after deletions, only relative
    /// order is meaningful.
    pub position: i64,
    pub creator_id: Option<Uuid>,
    pub parent_task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskAssignee {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskDependency {
    pub id: Uuid,
    pub task_id: Uuid,
    pub depends_on_task_id: Uuid,
    pub dependency_type: DependencyType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub board_id: Uuid,
    pub column_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(rename = "type", default)]
    pub task_type: Option<TaskType>,
    pub story_points: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub parent_task_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub story_points: Option<i64>,
    pub estimated_hours: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    /// Changing the column re-runs placement against the destination.
    pub column_id: Option<Uuid>,
    /// Explicit position override; ignored when the column changes.
    pub position: Option<i64>,
}

/// Move a task to another column; the new position is computed server-side
/// as one past the destination's maximum.
#[derive(Debug, Deserialize, TS)]
pub struct MoveTask {
    pub column_id: Uuid,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateTaskDependency {
    pub depends_on_task_id: Uuid,
    #[serde(default)]
    pub dependency_type: Option<DependencyType>,
}

/// Optional list filters; unset fields match everything.
#[derive(Debug, Default, Deserialize, TS)]
pub struct TaskFilter {
    pub board_id: Option<Uuid>,
    pub column_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Serialize, TS)]
pub struct TaskWithDetails {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<User>,
    pub labels: Vec<Label>,
    pub comments_count: i64,
    pub attachments_count: i64,
    pub checklists_count: i64,
    pub time_tracked_seconds: i64,
}

/// Tasks plus dependency edges for a project, as consumed by the Gantt view.
#[derive(Debug, Serialize, TS)]
pub struct GanttData {
    pub tasks: Vec<Task>,
    pub dependencies: Vec<TaskDependency>,
}
