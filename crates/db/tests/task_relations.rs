//! Integration tests for assignees, labels and dependencies.

use std::str::FromStr;

use db::models::{
    board::{Board, CreateBoard},
    label::{CreateLabel, Label},
    organization::{CreateOrganization, Organization},
    project::{CreateProject, Project},
    task::{CreateTask, CreateTaskDependency, Task, TaskAssignee, TaskDependency, TaskError},
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

struct Fixture {
    user: User,
    project: Project,
    other_project: Project,
    task: Task,
    second_task: Task,
}

async fn seed_fixture(pool: &SqlitePool) -> Fixture {
    let user = User::create(
        pool,
        &CreateUser {
            email: "relations@example.com".to_string(),
            username: "relations".to_string(),
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
            name: "Rel Org".to_string(),
            description: None,
            logo_url: None,
        },
        Uuid::new_v4(),
        user.id,
    )
    .await
    .unwrap();

    let mut projects = Vec::new();
    for key in ["REL", "OTH"] {
        let project = Project::create(
            pool,
            &CreateProject {
                organization_id: org.id,
                name: format!("{key} project"),
                key: key.to_string(),
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
        projects.push(project);
    }
    let other_project = projects.pop().unwrap();
    let project = projects.pop().unwrap();

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

    let mut tasks = Vec::new();
    for title in ["first", "second"] {
        let task = Task::create(
            pool,
            &CreateTask {
                project_id: project.id,
                board_id: board.board.id,
                column_id: None,
                title: title.to_string(),
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
        tasks.push(task);
    }
    let second_task = tasks.pop().unwrap();
    let task = tasks.pop().unwrap();

    Fixture {
        user,
        project,
        other_project,
        task,
        second_task,
    }
}

#[tokio::test]
async fn test_duplicate_assignment_rejected() {
    let (pool, _dir) = setup_test_pool().await;
    let fx = seed_fixture(&pool).await;

    TaskAssignee::add(&pool, fx.task.id, fx.user.id).await.unwrap();
    let err = TaskAssignee::add(&pool, fx.task.id, fx.user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::AlreadyAssigned));

    let assignees = Task::assignees(&pool, fx.task.id).await.unwrap();
    assert_eq!(assignees.len(), 1);
    assert_eq!(assignees[0].id, fx.user.id);
}

#[tokio::test]
async fn test_label_attachment_scoped_to_project() {
    let (pool, _dir) = setup_test_pool().await;
    let fx = seed_fixture(&pool).await;

    let label = Label::create(
        &pool,
        &CreateLabel {
            project_id: fx.project.id,
            name: "bug".to_string(),
            color: "#ff0000".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let foreign_label = Label::create(
        &pool,
        &CreateLabel {
            project_id: fx.other_project.id,
            name: "bug".to_string(),
            color: "#ff0000".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    Task::add_label(&pool, &fx.task, label.id).await.unwrap();

    let err = Task::add_label(&pool, &fx.task, label.id).await.unwrap_err();
    assert!(matches!(err, TaskError::LabelAlreadyAttached));

    let err = Task::add_label(&pool, &fx.task, foreign_label.id)
        .await
        .unwrap_err();
    assert!(matches!(err, TaskError::LabelProjectMismatch));

    let labels = Task::labels(&pool, fx.task.id).await.unwrap();
    assert_eq!(labels.len(), 1);
}

#[tokio::test]
async fn test_duplicate_label_name_rejected_per_project() {
    let (pool, _dir) = setup_test_pool().await;
    let fx = seed_fixture(&pool).await;

    let data = CreateLabel {
        project_id: fx.project.id,
        name: "urgent".to_string(),
        color: "#000000".to_string(),
    };
    Label::create(&pool, &data, Uuid::new_v4()).await.unwrap();
    let err = Label::create(&pool, &data, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(
        err,
        db::models::label::LabelError::DuplicateName
    ));
}

#[tokio::test]
async fn test_dependency_rules() {
    let (pool, _dir) = setup_test_pool().await;
    let fx = seed_fixture(&pool).await;

    // Self-dependency is rejected outright.
    let err = TaskDependency::add(
        &pool,
        fx.task.id,
        &CreateTaskDependency {
            depends_on_task_id: fx.task.id,
            dependency_type: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, TaskError::SelfDependency));

    let dep = TaskDependency::add(
        &pool,
        fx.task.id,
        &CreateTaskDependency {
            depends_on_task_id: fx.second_task.id,
            dependency_type: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(dep.task_id, fx.task.id);
    assert_eq!(dep.depends_on_task_id, fx.second_task.id);

    // The same edge twice violates the unique constraint.
    let err = TaskDependency::add(
        &pool,
        fx.task.id,
        &CreateTaskDependency {
            depends_on_task_id: fx.second_task.id,
            dependency_type: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, TaskError::DependencyExists));

    // Both directions of a two-edge cycle are accepted: acyclicity is not
    // enforced here.
    assert!(TaskDependency::add(
        &pool,
        fx.second_task.id,
        &CreateTaskDependency {
            depends_on_task_id: fx.task.id,
            dependency_type: None,
        },
    )
    .await
    .is_ok());

    let gantt = Task::gantt_data(&pool, fx.project.id).await.unwrap();
    assert_eq!(gantt.tasks.len(), 2);
    assert_eq!(gantt.dependencies.len(), 2);
}
