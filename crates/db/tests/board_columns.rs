//! Integration tests for board creation and column ordering.

use std::str::FromStr;

use db::models::{
    board::{Board, BoardColumn, CreateBoard, CreateColumn, ReorderColumns, UpdateColumn},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
    user::{CreateUser, User},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use tempfile::TempDir;
use uuid::Uuid;

async fn setup_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.to_string_lossy()))
            .expect("Invalid database URL")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

async fn seed_project(pool: &SqlitePool) -> (User, Project) {
    let user = User::create(
        pool,
        &CreateUser {
            email: "board-tests@example.com".to_string(),
            username: "board-tests".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let org = Organization::create(
        pool,
        &CreateOrganization {
            name: "Board Org".to_string(),
            description: None,
            logo_url: None,
        },
        Uuid::new_v4(),
        user.id,
    )
    .await
    .unwrap();

    let project = Project::create(
        pool,
        &CreateProject {
            organization_id: org.id,
            name: "Board Project".to_string(),
            key: "BRD".to_string(),
            description: None,
            start_date: None,
            end_date: None,
            budget: None,
        },
        Uuid::new_v4(),
        user.id,
    )
    .await
    .unwrap();

    (user, project)
}

#[tokio::test]
async fn test_new_board_seeds_three_default_columns() {
    let (pool, _dir) = setup_test_pool().await;
    let (_user, project) = seed_project(&pool).await;

    let board = Board::create(
        &pool,
        &CreateBoard {
            project_id: project.id,
            name: "Sprint".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    assert_eq!(board.columns.len(), 3);
    let names: Vec<&str> = board.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["К выполнению", "В работе", "Готово"]);
    let positions: Vec<i64> = board.columns.iter().map(|c| c.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[tokio::test]
async fn test_boards_ordered_by_position() {
    let (pool, _dir) = setup_test_pool().await;
    let (_user, project) = seed_project(&pool).await;

    for (name, position) in [("Third", 2), ("First", 0), ("Second", 1)] {
        Board::create(
            &pool,
            &CreateBoard {
                project_id: project.id,
                name: name.to_string(),
                description: None,
                position,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
    }

    let boards = Board::find_for_project(&pool, project.id).await.unwrap();
    let names: Vec<&str> = boards.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_column_create_uses_caller_position_and_wip_limit() {
    let (pool, _dir) = setup_test_pool().await;
    let (_user, project) = seed_project(&pool).await;
    let board = Board::create(
        &pool,
        &CreateBoard {
            project_id: project.id,
            name: "Sprint".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let column = BoardColumn::create(
        &pool,
        board.board.id,
        &CreateColumn {
            name: "Review".to_string(),
            position: 3,
            wip_limit: Some(4),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    assert_eq!(column.position, 3);
    assert_eq!(column.wip_limit, Some(4));

    // The limit is stored, never enforced: more tasks than the limit is fine
    // at this layer, and updates can change it freely.
    let updated = BoardColumn::update(
        &pool,
        column.id,
        &UpdateColumn {
            name: None,
            position: None,
            wip_limit: Some(1),
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.wip_limit, Some(1));
}

#[tokio::test]
async fn test_reorder_assigns_dense_positions() {
    let (pool, _dir) = setup_test_pool().await;
    let (_user, project) = seed_project(&pool).await;
    let board = Board::create(
        &pool,
        &CreateBoard {
            project_id: project.id,
            name: "Sprint".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let reversed: Vec<Uuid> = board.columns.iter().rev().map(|c| c.id).collect();
    let columns = BoardColumn::reorder(&pool, board.board.id, &reversed)
        .await
        .unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Готово", "В работе", "К выполнению"]);
    let positions: Vec<i64> = columns.iter().map(|c| c.position).collect();
    assert_eq!(positions, [0, 1, 2]);
}

#[tokio::test]
async fn test_reorder_rejects_incomplete_list() {
    let (pool, _dir) = setup_test_pool().await;
    let (_user, project) = seed_project(&pool).await;
    let board = Board::create(
        &pool,
        &CreateBoard {
            project_id: project.id,
            name: "Sprint".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let partial = ReorderColumns {
        column_ids: vec![board.columns[0].id],
    };
    let result = BoardColumn::reorder(&pool, board.board.id, &partial.column_ids).await;
    assert!(result.is_err());
}
