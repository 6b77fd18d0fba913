//! Checklists attached to tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Checklist {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub content: String,
    pub is_completed: bool,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, TS)]
pub struct ChecklistWithItems {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateChecklist {
    pub title: String,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateChecklist {
    pub title: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateChecklistItem {
    pub content: String,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateChecklistItem {
    pub content: Option<String>,
    pub is_completed: Option<bool>,
    pub position: Option<i64>,
}

impl Checklist {
    pub async fn create(
        pool: &SqlitePool,
        task_id: Uuid,
        data: &CreateChecklist,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Checklist>(
            r#"INSERT INTO checklists (id, task_id, title, position, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(task_id)
        .bind(&data.title)
        .bind(data.position)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_task(
        pool: &SqlitePool,
        task_id: Uuid,
    ) -> Result<Vec<ChecklistWithItems>, sqlx::Error> {
        let checklists = sqlx::query_as::<_, Checklist>(
            "SELECT * FROM checklists WHERE task_id = $1 ORDER BY position ASC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        let mut result = Vec::with_capacity(checklists.len());
        for checklist in checklists {
            let items = ChecklistItem::find_for_checklist(pool, checklist.id).await?;
            result.push(ChecklistWithItems { checklist, items });
        }
        Ok(result)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateChecklist,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Checklist>(
            r#"UPDATE checklists
               SET title = COALESCE($2, title),
                   position = COALESCE($3, position)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl ChecklistItem {
    pub async fn create(
        pool: &SqlitePool,
        checklist_id: Uuid,
        data: &CreateChecklistItem,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(
            r#"INSERT INTO checklist_items (id, checklist_id, content, is_completed, position, created_at)
               VALUES ($1, $2, $3, 0, $4, $5)
               RETURNING *"#,
        )
        .bind(id)
        .bind(checklist_id)
        .bind(&data.content)
        .bind(data.position)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_checklist(
        pool: &SqlitePool,
        checklist_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(
            "SELECT * FROM checklist_items WHERE checklist_id = $1 ORDER BY position ASC",
        )
        .bind(checklist_id)
        .fetch_all(pool)
        .await
    }

    /// Completion is stamped once: flipping an item to completed records the
    /// time, un-completing clears it.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateChecklistItem,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ChecklistItem>(
            r#"UPDATE checklist_items
               SET content = COALESCE($2, content),
                   position = COALESCE($3, position),
                   is_completed = COALESCE($4, is_completed),
                   completed_at = CASE
                       WHEN $4 = 1 AND is_completed = 0 THEN $5
                       WHEN $4 = 0 THEN NULL
                       ELSE completed_at
                   END
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.content)
        .bind(data.position)
        .bind(data.is_completed)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM checklist_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
