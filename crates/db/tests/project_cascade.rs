//! Integration tests for project-level constraints and cascade deletion.

use std::str::FromStr;

use db::models::{
    board::{Board, CreateBoard},
    custom_field::{CreateCustomField, CustomField, FieldType},
    label::{CreateLabel, Label},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project, ProjectError},
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

async fn seed_org(pool: &SqlitePool) -> (User, Organization) {
    let user = User::create(
        pool,
        &CreateUser {
            email: "cascade@example.com".to_string(),
            username: "cascade".to_string(),
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
            name: "Cascade Org".to_string(),
            description: None,
            logo_url: None,
        },
        Uuid::new_v4(),
        user.id,
    )
    .await
    .unwrap();

    (user, org)
}

async fn count(pool: &SqlitePool, sql: &str, id: Uuid) -> i64 {
    sqlx::query_scalar(sql).bind(id).fetch_one(pool).await.unwrap()
}

#[tokio::test]
async fn test_duplicate_project_key_rejected_within_organization() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, org) = seed_org(&pool).await;

    let data = CreateProject {
        organization_id: org.id,
        name: "First".to_string(),
        key: "DUP".to_string(),
        description: None,
        start_date: None,
        end_date: None,
        budget: None,
    };
    Project::create(&pool, &data, Uuid::new_v4(), user.id)
        .await
        .unwrap();

    let err = Project::create(&pool, &data, Uuid::new_v4(), user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectError::DuplicateKey));

    // The same key is fine in another organization.
    let other_org = Organization::create(
        &pool,
        &CreateOrganization {
            name: "Other Org".to_string(),
            description: None,
            logo_url: None,
        },
        Uuid::new_v4(),
        user.id,
    )
    .await
    .unwrap();
    let data = CreateProject {
        organization_id: other_org.id,
        ..data
    };
    assert!(Project::create(&pool, &data, Uuid::new_v4(), user.id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_project_delete_cascades_to_owned_rows() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, org) = seed_org(&pool).await;

    let project = Project::create(
        &pool,
        &CreateProject {
            organization_id: org.id,
            name: "Doomed".to_string(),
            key: "DOOM".to_string(),
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

    Task::create(
        &pool,
        &CreateTask {
            project_id: project.id,
            board_id: board.board.id,
            column_id: Some(board.columns[0].id),
            title: "Doomed task".to_string(),
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

    Label::create(
        &pool,
        &CreateLabel {
            project_id: project.id,
            name: "bug".to_string(),
            color: "#ff0000".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    CustomField::create(
        &pool,
        project.id,
        &CreateCustomField {
            name: "Environment".to_string(),
            field_type: FieldType::Select,
            options: Some(serde_json::json!(["dev", "prod"])),
            is_required: false,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    Project::delete(&pool, project.id).await.unwrap();

    assert!(Project::find_by_id(&pool, project.id).await.unwrap().is_none());
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM boards WHERE project_id = $1", project.id).await,
        0
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM board_columns WHERE board_id = $1",
            board.board.id
        )
        .await,
        0
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM tasks WHERE project_id = $1", project.id).await,
        0
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM labels WHERE project_id = $1", project.id).await,
        0
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM custom_fields WHERE project_id = $1",
            project.id
        )
        .await,
        0
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM project_members WHERE project_id = $1",
            project.id
        )
        .await,
        0
    );
}

#[tokio::test]
async fn test_column_delete_detaches_tasks() {
    let (pool, _dir) = setup_test_pool().await;
    let (user, org) = seed_org(&pool).await;

    let project = Project::create(
        &pool,
        &CreateProject {
            organization_id: org.id,
            name: "Detach".to_string(),
            key: "DET".to_string(),
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

    let task = Task::create(
        &pool,
        &CreateTask {
            project_id: project.id,
            board_id: board.board.id,
            column_id: Some(column),
            title: "Survivor".to_string(),
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

    db::models::board::BoardColumn::delete(&pool, column)
        .await
        .unwrap();

    // SET NULL: the task survives the column, unparented.
    let task = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(task.column_id, None);
}
