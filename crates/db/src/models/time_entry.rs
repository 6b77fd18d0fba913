//! Time tracking entries.
//!
//! An entry is either a finished interval (started_at..ended_at with a
//! duration in seconds) or a running timer (is_running, no end yet).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TimeEntryError {
    #[error("Time entry not found")]
    NotFound,
    #[error("Time entry is not running")]
    NotRunning,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TimeEntry {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub description: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds; NULL while the timer runs.
    pub duration: Option<i64>,
    pub is_running: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateTimeEntry {
    pub description: Option<String>,
    /// Omitted: the entry starts now as a running timer.
    pub started_at: Option<DateTime<Utc>>,
    /// Set together with started_at for a manually logged interval.
    pub ended_at: Option<DateTime<Utc>>,
}

impl TimeEntry {
    /// Create either a finished interval (when `ended_at` is given) or a
    /// running timer.
    pub async fn create(
        pool: &SqlitePool,
        task_id: Uuid,
        user_id: Uuid,
        data: &CreateTimeEntry,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        let started_at = data.started_at.unwrap_or(now);
        let (ended_at, duration, is_running) = match data.ended_at {
            Some(end) => {
                let secs = (end - started_at).num_seconds().max(0);
                (Some(end), Some(secs), false)
            }
            None => (None, None, true),
        };

        sqlx::query_as::<_, TimeEntry>(
            r#"INSERT INTO time_entries (id, task_id, user_id, description, started_at, ended_at,
                                         duration, is_running, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               RETURNING *"#,
        )
        .bind(id)
        .bind(task_id)
        .bind(user_id)
        .bind(&data.description)
        .bind(started_at)
        .bind(ended_at)
        .bind(duration)
        .bind(is_running)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>("SELECT * FROM time_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_task(
        pool: &SqlitePool,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeEntry>(
            "SELECT * FROM time_entries WHERE task_id = $1 ORDER BY started_at DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Stop a running timer, fixing ended_at and the duration in seconds.
    pub async fn stop(pool: &SqlitePool, id: Uuid) -> Result<Self, TimeEntryError> {
        let entry = Self::find_by_id(pool, id)
            .await?
            .ok_or(TimeEntryError::NotFound)?;
        if !entry.is_running {
            return Err(TimeEntryError::NotRunning);
        }

        let now = Utc::now();
        let duration = (now - entry.started_at).num_seconds().max(0);

        sqlx::query_as::<_, TimeEntry>(
            r#"UPDATE time_entries
               SET ended_at = $2, duration = $3, is_running = 0, updated_at = $2
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(now)
        .bind(duration)
        .fetch_one(pool)
        .await
        .map_err(TimeEntryError::Database)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
