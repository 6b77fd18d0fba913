//! Notification fan-out for task events.
//!
//! Like activity recording, delivery is best-effort; failures are logged and
//! never bubble up to the request.

use db::models::{
    notification::{Notification, NotificationType},
    task::Task,
};
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct Notifier {
    pool: SqlitePool,
}

impl Notifier {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tell a user they were assigned to a task.
    pub async fn task_assigned(&self, task: &Task, assignee_id: Uuid) {
        let title = format!("You were assigned to \"{}\"", task.title);
        let link = format!("/tasks/{}", task.id);
        if let Err(error) = Notification::create(
            &self.pool,
            assignee_id,
            NotificationType::TaskAssigned,
            &title,
            None,
            Some(&link),
        )
        .await
        {
            warn!(?error, task_id = %task.id, "failed to create assignment notification");
        }
    }

    /// Tell everyone assigned to the task (minus the author) about a new
    /// comment.
    pub async fn task_commented(&self, task: &Task, author_id: Uuid) {
        let assignees = match Task::assignees(&self.pool, task.id).await {
            Ok(users) => users,
            Err(error) => {
                warn!(?error, task_id = %task.id, "failed to load assignees for notification");
                return;
            }
        };

        let title = format!("New comment on \"{}\"", task.title);
        let link = format!("/tasks/{}", task.id);
        for user in assignees {
            if user.id == author_id {
                continue;
            }
            if let Err(error) = Notification::create(
                &self.pool,
                user.id,
                NotificationType::TaskCommented,
                &title,
                None,
                Some(&link),
            )
            .await
            {
                warn!(?error, task_id = %task.id, user_id = %user.id,
                      "failed to create comment notification");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::{
        board::{Board, CreateBoard},
        notification::Notification,
        organization::{CreateOrganization, Organization},
        project::{CreateProject, Project},
        task::{CreateTask, TaskAssignee},
        user::{CreateUser, User},
    };
    use db::test_utils::create_test_pool;

    async fn seed_task(pool: &SqlitePool) -> (User, User, Task) {
        let author = User::create(
            pool,
            &CreateUser {
                email: "author@example.com".to_string(),
                username: "author".to_string(),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap();
        let assignee = User::create(
            pool,
            &CreateUser {
                email: "assignee@example.com".to_string(),
                username: "assignee".to_string(),
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
                name: "Notify Org".to_string(),
                description: None,
                logo_url: None,
            },
            Uuid::new_v4(),
            author.id,
        )
        .await
        .unwrap();
        let project = Project::create(
            pool,
            &CreateProject {
                organization_id: org.id,
                name: "Notify".to_string(),
                key: "NTF".to_string(),
                description: None,
                start_date: None,
                end_date: None,
                budget: None,
            },
            Uuid::new_v4(),
            author.id,
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
                title: "Notify me".to_string(),
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
            Some(author.id),
        )
        .await
        .unwrap();

        (author, assignee, task)
    }

    #[tokio::test]
    async fn test_assignment_creates_exactly_one_notification() {
        let (pool, _dir) = create_test_pool().await;
        let (_author, assignee, task) = seed_task(&pool).await;
        let notifier = Notifier::new(pool.clone());

        notifier.task_assigned(&task, assignee.id).await;

        let notifications = Notification::find_for_user(&pool, assignee.id, false, 0, 10)
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].notif_type, NotificationType::TaskAssigned);
        assert!(!notifications[0].is_read);
    }

    #[tokio::test]
    async fn test_comment_notifies_assignees_except_author() {
        let (pool, _dir) = create_test_pool().await;
        let (author, assignee, task) = seed_task(&pool).await;
        let notifier = Notifier::new(pool.clone());

        TaskAssignee::add(&pool, task.id, author.id).await.unwrap();
        TaskAssignee::add(&pool, task.id, assignee.id).await.unwrap();

        notifier.task_commented(&task, author.id).await;

        let for_assignee = Notification::find_for_user(&pool, assignee.id, true, 0, 10)
            .await
            .unwrap();
        assert_eq!(for_assignee.len(), 1);
        assert_eq!(
            for_assignee[0].notif_type,
            NotificationType::TaskCommented
        );

        let for_author = Notification::find_for_user(&pool, author.id, true, 0, 10)
            .await
            .unwrap();
        assert!(for_author.is_empty());
    }
}
