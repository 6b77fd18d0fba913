//! Project-defined custom fields and their per-task values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    MultiSelect,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CustomField {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub field_type: FieldType,
    /// Choice list for select types.
    pub options: Option<Value>,
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TaskCustomFieldValue {
    pub id: Uuid,
    pub task_id: Uuid,
    pub custom_field_id: Uuid,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateCustomField {
    pub name: String,
    pub field_type: FieldType,
    pub options: Option<Value>,
    #[serde(default)]
    pub is_required: bool,
}

#[derive(Debug, Deserialize, TS)]
pub struct SetCustomFieldValue {
    pub value: Option<String>,
}

impl CustomField {
    pub async fn create(
        pool: &SqlitePool,
        project_id: Uuid,
        data: &CreateCustomField,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CustomField>(
            r#"INSERT INTO custom_fields (id, project_id, name, field_type, options, is_required, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(id)
        .bind(project_id)
        .bind(&data.name)
        .bind(data.field_type)
        .bind(&data.options)
        .bind(data.is_required)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CustomField>("SELECT * FROM custom_fields WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CustomField>(
            "SELECT * FROM custom_fields WHERE project_id = $1 ORDER BY created_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM custom_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl TaskCustomFieldValue {
    /// Upsert the value for (task, field).
    pub async fn set(
        pool: &SqlitePool,
        task_id: Uuid,
        custom_field_id: Uuid,
        value: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TaskCustomFieldValue>(
            r#"INSERT INTO task_custom_field_values (id, task_id, custom_field_id, value)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (task_id, custom_field_id)
               DO UPDATE SET value = EXCLUDED.value
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(custom_field_id)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_task(
        pool: &SqlitePool,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TaskCustomFieldValue>(
            "SELECT * FROM task_custom_field_values WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
