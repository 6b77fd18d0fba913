//! Integration tests for status transitions and the completed_at stamp.

use std::str::FromStr;

use db::models::{
    board::{Board, CreateBoard},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
    task::{CreateTask, Task, TaskStatus, UpdateTask},
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

async fn seed_task(pool: &SqlitePool) -> Task {
    let user = User::create(
        pool,
        &CreateUser {
            email: "status@example.com".to_string(),
            username: "status".to_string(),
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
            name: "Status Org".to_string(),
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
            name: "Status Project".to_string(),
            key: "STAT".to_string(),
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

    let board = Board::create(
        pool,
        &CreateBoard {
            project_id: project.id,
            name: "Board".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    Task::create(
        pool,
        &CreateTask {
            project_id: project.id,
            board_id: board.board.id,
            column_id: Some(board.columns[0].id),
            title: "Stamped".to_string(),
            description: None,
            priority: None,
            task_type: None,
            story_points: None,
            estimated_hours: None,
            start_date: None,
            due_date: None,
            parent_task_id: None,
        },
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap()
}

fn status_update(status: TaskStatus) -> UpdateTask {
    UpdateTask {
        title: None,
        description: None,
        priority: None,
        status: Some(status),
        task_type: None,
        story_points: None,
        estimated_hours: None,
        start_date: None,
        due_date: None,
        column_id: None,
        position: None,
    }
}

#[tokio::test]
async fn test_done_stamps_completed_at_exactly_once() {
    let (pool, _dir) = setup_test_pool().await;
    let task = seed_task(&pool).await;
    assert_eq!(task.status, TaskStatus::New);
    assert!(task.completed_at.is_none());

    let done = Task::update(&pool, task.id, &status_update(TaskStatus::Done))
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    let stamp = done.completed_at.expect("completed_at must be stamped");

    // Updating while already done must not move the stamp.
    let again = Task::update(&pool, task.id, &status_update(TaskStatus::Done))
        .await
        .unwrap();
    assert_eq!(again.completed_at, Some(stamp));
}

#[tokio::test]
async fn test_any_status_can_reach_any_other() {
    let (pool, _dir) = setup_test_pool().await;
    let task = seed_task(&pool).await;

    // No transition table: walk an arbitrary path through every status.
    for status in [
        TaskStatus::OnHold,
        TaskStatus::Done,
        TaskStatus::New,
        TaskStatus::Active,
        TaskStatus::Done,
    ] {
        let updated = Task::update(&pool, task.id, &status_update(status))
            .await
            .unwrap();
        assert_eq!(updated.status, status);
    }
}

#[tokio::test]
async fn test_leaving_done_keeps_historical_stamp() {
    let (pool, _dir) = setup_test_pool().await;
    let task = seed_task(&pool).await;

    let done = Task::update(&pool, task.id, &status_update(TaskStatus::Done))
        .await
        .unwrap();
    let stamp = done.completed_at.unwrap();

    let reopened = Task::update(&pool, task.id, &status_update(TaskStatus::Active))
        .await
        .unwrap();
    assert_eq!(reopened.status, TaskStatus::Active);
    assert_eq!(reopened.completed_at, Some(stamp));
}
