//! Kanban boards and their ordered columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

/// Every new board is seeded with these columns at positions 0, 1, 2.
pub const DEFAULT_COLUMNS: [&str; 3] = ["К выполнению", "В работе", "Готово"];

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Board not found")]
    NotFound,
    #[error("Column not found")]
    ColumnNotFound,
    #[error("Reorder list must contain every column of the board exactly once")]
    InvalidReorder,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Board {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Explicit ordering of boards within a project.
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BoardColumn {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    /// Dense per-board sequence, caller-assigned at creation.
    pub position: i64,
    /// Declared cap on concurrent tasks; stored but not enforced.
    pub wip_limit: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, TS)]
pub struct BoardWithColumns {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateBoard {
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateColumn {
    pub name: String,
    pub position: i64,
    pub wip_limit: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateColumn {
    pub name: Option<String>,
    pub position: Option<i64>,
    pub wip_limit: Option<i64>,
}

/// Ordered column ids; positions 0..n are assigned in list order.
#[derive(Debug, Deserialize, TS)]
pub struct ReorderColumns {
    pub column_ids: Vec<Uuid>,
}

impl Board {
    /// Create the board together with its three default columns in one
    /// transaction.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateBoard,
        id: Uuid,
    ) -> Result<BoardWithColumns, BoardError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"INSERT INTO boards (id, project_id, name, description, position, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(data.project_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.position)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut columns = Vec::with_capacity(DEFAULT_COLUMNS.len());
        for (position, name) in DEFAULT_COLUMNS.iter().enumerate() {
            let column = sqlx::query_as::<_, BoardColumn>(
                r#"INSERT INTO board_columns (id, board_id, name, position, created_at, updated_at)
                   VALUES ($1, $2, $3, $4, $5, $5)
                   RETURNING *"#,
            )
            .bind(Uuid::new_v4())
            .bind(board.id)
            .bind(name)
            .bind(position as i64)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            columns.push(column);
        }

        tx.commit().await?;
        Ok(BoardWithColumns { board, columns })
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_project(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            "SELECT * FROM boards WHERE project_id = $1 ORDER BY position ASC, created_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn with_columns(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<Option<BoardWithColumns>, sqlx::Error> {
        let Some(board) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let columns = BoardColumn::find_for_board(pool, id).await?;
        Ok(Some(BoardWithColumns { board, columns }))
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateBoard,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Board>(
            r#"UPDATE boards
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   position = COALESCE($4, position),
                   updated_at = $5
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.position)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl BoardColumn {
    pub async fn create(
        pool: &SqlitePool,
        board_id: Uuid,
        data: &CreateColumn,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, BoardColumn>(
            r#"INSERT INTO board_columns (id, board_id, name, position, wip_limit, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(board_id)
        .bind(&data.name)
        .bind(data.position)
        .bind(data.wip_limit)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardColumn>("SELECT * FROM board_columns WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_for_board(
        pool: &SqlitePool,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardColumn>(
            "SELECT * FROM board_columns WHERE board_id = $1 ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateColumn,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, BoardColumn>(
            r#"UPDATE board_columns
               SET name = COALESCE($2, name),
                   position = COALESCE($3, position),
                   wip_limit = COALESCE($4, wip_limit),
                   updated_at = $5
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(data.position)
        .bind(data.wip_limit)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM board_columns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Assign dense positions 0..n following the submitted order. The list
    /// must mention every column of the board exactly once.
    pub async fn reorder(
        pool: &SqlitePool,
        board_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Vec<Self>, BoardError> {
        let existing = Self::find_for_board(pool, board_id).await?;
        if existing.len() != ordered_ids.len() {
            return Err(BoardError::InvalidReorder);
        }
        for column in &existing {
            if !ordered_ids.contains(&column.id) {
                return Err(BoardError::InvalidReorder);
            }
        }

        let now = Utc::now();
        let mut tx = pool.begin().await?;
        for (position, column_id) in ordered_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE board_columns SET position = $2, updated_at = $3 WHERE id = $1 AND board_id = $4",
            )
            .bind(column_id)
            .bind(position as i64)
            .bind(now)
            .bind(board_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Self::find_for_board(pool, board_id).await.map_err(Into::into)
    }
}
