//! Integration tests for time entries and actual_hours maintenance.

use std::str::FromStr;

use chrono::{Duration, Utc};
use db::models::{
    board::{Board, CreateBoard},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
    task::{CreateTask, Task},
    time_entry::{CreateTimeEntry, TimeEntry, TimeEntryError},
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

async fn seed_task(pool: &SqlitePool) -> (User, Task) {
    let user = User::create(
        pool,
        &CreateUser {
            email: "tracker@example.com".to_string(),
            username: "tracker".to_string(),
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
            name: "Time Org".to_string(),
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
            name: "Time Project".to_string(),
            key: "TIME".to_string(),
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

    let task = Task::create(
        pool,
        &CreateTask {
            project_id: project.id,
            board_id: board.board.id,
            column_id: None,
            title: "Timed".to_string(),
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
    .unwrap();

    (user, task)
}

#[tokio::test]
async fn test_manual_entry_computes_duration_and_actual_hours() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, task) = seed_task(&pool).await;

    let ended = Utc::now();
    let started = ended - Duration::hours(2);
    let entry = TimeEntry::create(
        &pool,
        task.id,
        user.id,
        &CreateTimeEntry {
            description: Some("pairing session".to_string()),
            started_at: Some(started),
            ended_at: Some(ended),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    assert!(!entry.is_running);
    assert_eq!(entry.duration, Some(7200));

    Task::refresh_actual_hours(&pool, task.id).await.unwrap();
    let task = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert!((task.actual_hours - 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_stop_running_timer() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, task) = seed_task(&pool).await;

    let entry = TimeEntry::create(
        &pool,
        task.id,
        user.id,
        &CreateTimeEntry {
            description: None,
            started_at: None,
            ended_at: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    assert!(entry.is_running);
    assert!(entry.ended_at.is_none());
    assert!(entry.duration.is_none());

    let stopped = TimeEntry::stop(&pool, entry.id).await.unwrap();
    assert!(!stopped.is_running);
    assert!(stopped.ended_at.is_some());
    assert!(stopped.duration.unwrap_or(-1) >= 0);

    // Stopping twice is a conflict.
    let err = TimeEntry::stop(&pool, entry.id).await.unwrap_err();
    assert!(matches!(err, TimeEntryError::NotRunning));
}

#[tokio::test]
async fn test_actual_hours_sums_multiple_entries() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, task) = seed_task(&pool).await;

    let now = Utc::now();
    for minutes in [30, 90] {
        TimeEntry::create(
            &pool,
            task.id,
            user.id,
            &CreateTimeEntry {
                description: None,
                started_at: Some(now - Duration::minutes(minutes)),
                ended_at: Some(now),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
    }

    Task::refresh_actual_hours(&pool, task.id).await.unwrap();
    let task = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert!((task.actual_hours - 2.0).abs() < 1e-9);

    let entries = TimeEntry::find_for_task(&pool, task.id).await.unwrap();
    assert_eq!(entries.len(), 2);
}
