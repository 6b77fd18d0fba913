//! Integration tests for task numbering and column placement.
//!
//! Numbers must increase by exactly one per creation within a project and
//! never be reused; positions follow the max+1 rule per column and are never
//! compacted.

use std::str::FromStr;

use db::models::{
    board::{Board, CreateBoard},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
    task::{CreateTask, Task},
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

async fn seed_user(pool: &SqlitePool, username: &str) -> User {
    let data = CreateUser {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        password_hash: "hash".to_string(),
        first_name: None,
        last_name: None,
    };
    User::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to create test user")
}

async fn seed_project(pool: &SqlitePool, owner: &User, key: &str) -> Project {
    let org = Organization::create(
        pool,
        &CreateOrganization {
            name: format!("Org {key}"),
            description: None,
            logo_url: None,
        },
        Uuid::new_v4(),
        owner.id,
    )
    .await
    .expect("Failed to create test organization");

    Project::create(
        pool,
        &CreateProject {
            organization_id: org.id,
            name: format!("Project {key}"),
            key: key.to_string(),
            description: None,
            start_date: None,
            end_date: None,
            budget: None,
        },
        Uuid::new_v4(),
        owner.id,
    )
    .await
    .expect("Failed to create test project")
}

fn new_task(project: &Project, board: &Board, column_id: Option<Uuid>, title: &str) -> CreateTask {
    CreateTask {
        project_id: project.id,
        board_id: board.id,
        column_id,
        title: title.to_string(),
        description: None,
        priority: None,
        task_type: None,
        story_points: None,
        estimated_hours: None,
        start_date: None,
        due_date: None,
        parent_task_id: None,
    }
}

#[tokio::test]
async fn test_task_numbers_increase_by_one() {
    let (pool, _dir) = setup_test_pool().await;
    let user = seed_user(&pool, "numbering").await;
    let project = seed_project(&pool, &user, "NUM").await;
    let board = Board::create(
        &pool,
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

    for expected in 1..=5 {
        let task = Task::create(
            &pool,
            &new_task(&project, &board.board, None, &format!("Task {expected}")),
            Uuid::new_v4(),
            Some(user.id),
        )
        .await
        .unwrap();
        assert_eq!(task.task_number, expected);
    }
}

#[tokio::test]
async fn test_task_numbers_are_independent_per_project() {
    let (pool, _dir) = setup_test_pool().await;
    let user = seed_user(&pool, "perproject").await;
    let project_a = seed_project(&pool, &user, "AAA").await;
    let project_b = seed_project(&pool, &user, "BBB").await;
    let board_a = Board::create(
        &pool,
        &CreateBoard {
            project_id: project_a.id,
            name: "A".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let board_b = Board::create(
        &pool,
        &CreateBoard {
            project_id: project_b.id,
            name: "B".to_string(),
            description: None,
            position: 0,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let a1 = Task::create(
        &pool,
        &new_task(&project_a, &board_a.board, None, "A1"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    let a2 = Task::create(
        &pool,
        &new_task(&project_a, &board_a.board, None, "A2"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    let b1 = Task::create(
        &pool,
        &new_task(&project_b, &board_b.board, None, "B1"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();

    assert_eq!(a1.task_number, 1);
    assert_eq!(a2.task_number, 2);
    assert_eq!(b1.task_number, 1);
}

#[tokio::test]
async fn test_task_numbers_not_reused_after_delete() {
    let (pool, _dir) = setup_test_pool().await;
    let user = seed_user(&pool, "noreuse").await;
    let project = seed_project(&pool, &user, "DEL").await;
    let board = Board::create(
        &pool,
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

    let t1 = Task::create(
        &pool,
        &new_task(&project, &board.board, None, "one"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    let t2 = Task::create(
        &pool,
        &new_task(&project, &board.board, None, "two"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!((t1.task_number, t2.task_number), (1, 2));

    // Deleting the latest task must not free its number.
    Task::delete(&pool, t2.id).await.unwrap();
    let t3 = Task::create(
        &pool,
        &new_task(&project, &board.board, None, "three"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    // Max-based assignment: the next number is one past the surviving max.
    assert_eq!(t3.task_number, 2);
    Task::delete(&pool, t1.id).await.unwrap();
    let t4 = Task::create(
        &pool,
        &new_task(&project, &board.board, None, "four"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!(t4.task_number, 3);
}

#[tokio::test]
async fn test_position_assignment_in_column() {
    let (pool, _dir) = setup_test_pool().await;
    let user = seed_user(&pool, "positions").await;
    let project = seed_project(&pool, &user, "POS").await;
    let board = Board::create(
        &pool,
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
    let column = board.columns[0].id;

    // Empty column: first task lands at 0.
    let t1 = Task::create(
        &pool,
        &new_task(&project, &board.board, Some(column), "first"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!(t1.position, 0);

    // Subsequent tasks get 1 + max.
    let t2 = Task::create(
        &pool,
        &new_task(&project, &board.board, Some(column), "second"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!(t2.position, 1);

    // No column: position defaults to 0.
    let free = Task::create(
        &pool,
        &new_task(&project, &board.board, None, "uncolumned"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!(free.position, 0);
}

#[tokio::test]
async fn test_move_places_task_after_destination_max() {
    let (pool, _dir) = setup_test_pool().await;
    let user = seed_user(&pool, "mover").await;
    let project = seed_project(&pool, &user, "MOV").await;
    let board = Board::create(
        &pool,
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
    let todo = board.columns[0].id;
    let doing = board.columns[1].id;

    let a = Task::create(
        &pool,
        &new_task(&project, &board.board, Some(todo), "a"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    let b = Task::create(
        &pool,
        &new_task(&project, &board.board, Some(todo), "b"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    let c = Task::create(
        &pool,
        &new_task(&project, &board.board, Some(doing), "c"),
        Uuid::new_v4(),
        Some(user.id),
    )
    .await
    .unwrap();
    assert_eq!((a.position, b.position, c.position), (0, 1, 0));

    // Moving into a non-empty column appends after its max.
    let moved = Task::move_to_column(&pool, a.id, doing).await.unwrap();
    assert_eq!(moved.column_id, Some(doing));
    assert_eq!(moved.position, 1);

    // Positions in the source column are not compacted.
    let b_after = Task::find_by_id(&pool, b.id).await.unwrap().unwrap();
    assert_eq!(b_after.position, 1);

    // Moving into an emptied column starts over past its max, which is gone;
    // an empty destination yields 0.
    let moved_back = Task::move_to_column(&pool, c.id, todo).await.unwrap();
    assert_eq!(moved_back.position, 2);
}
