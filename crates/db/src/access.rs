//! Centralized capability checks.
//!
//! Every protected operation resolves the same chain: resource → owning
//! project → membership row for the caller. Instead of repeating that walk in
//! each route, `ensure` is the single entry point, parameterized by resource
//! type and the action being attempted. A missing resource is `NotFound`; an
//! existing resource without a membership row for the caller is `Forbidden`
//! (fail closed).

use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    organization::OrgRole,
    project::{ProjectMember, ProjectRole},
};

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Resource not found")]
    NotFound,
    #[error("Access denied")]
    Forbidden,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A protected resource, identified by id.
#[derive(Debug, Clone, Copy)]
pub enum Resource {
    Organization(Uuid),
    Project(Uuid),
    Board(Uuid),
    Column(Uuid),
    Task(Uuid),
    Label(Uuid),
    Comment(Uuid),
    Checklist(Uuid),
    ChecklistItem(Uuid),
    TimeEntry(Uuid),
    CustomField(Uuid),
}

/// What the caller wants to do with the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Any membership row suffices.
    Read,
    /// Content changes: tasks, comments, checklists, time entries, labels.
    /// Viewers are excluded.
    Write,
    /// Structural changes: update/delete the container, manage members.
    Manage,
}

/// Resolved chain for a successful check.
#[derive(Debug, Clone, Copy)]
pub struct AccessScope {
    pub organization_id: Uuid,
    /// None for organization-level resources.
    pub project_id: Option<Uuid>,
    pub org_role: Option<OrgRole>,
    pub project_role: Option<ProjectRole>,
}

fn org_role_allows(role: OrgRole, action: Action) -> bool {
    match action {
        Action::Read => true,
        Action::Write | Action::Manage => matches!(role, OrgRole::Owner | OrgRole::Admin),
    }
}

fn project_role_allows(role: ProjectRole, action: Action) -> bool {
    match action {
        Action::Read => true,
        Action::Write => matches!(role, ProjectRole::Manager | ProjectRole::Developer),
        Action::Manage => matches!(role, ProjectRole::Manager),
    }
}

/// Check that `user_id` may perform `action` on `resource`.
pub async fn ensure(
    pool: &SqlitePool,
    resource: Resource,
    user_id: Uuid,
    action: Action,
) -> Result<AccessScope, AccessError> {
    match resource {
        Resource::Organization(org_id) => ensure_organization(pool, org_id, user_id, action).await,
        _ => {
            let project_id = resolve_project_id(pool, resource)
                .await?
                .ok_or(AccessError::NotFound)?;
            ensure_project(pool, project_id, user_id, action).await
        }
    }
}

async fn ensure_organization(
    pool: &SqlitePool,
    organization_id: Uuid,
    user_id: Uuid,
    action: Action,
) -> Result<AccessScope, AccessError> {
    let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations WHERE id = $1")
        .bind(organization_id)
        .fetch_one(pool)
        .await?;
    if exists == 0 {
        return Err(AccessError::NotFound);
    }

    let role = org_role(pool, organization_id, user_id)
        .await?
        .ok_or(AccessError::Forbidden)?;
    if !org_role_allows(role, action) {
        return Err(AccessError::Forbidden);
    }

    Ok(AccessScope {
        organization_id,
        project_id: None,
        org_role: Some(role),
        project_role: None,
    })
}

async fn ensure_project(
    pool: &SqlitePool,
    project_id: Uuid,
    user_id: Uuid,
    action: Action,
) -> Result<AccessScope, AccessError> {
    let organization_id: Uuid =
        sqlx::query_scalar("SELECT organization_id FROM projects WHERE id = $1")
            .bind(project_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AccessError::NotFound)?;

    let project_role = ProjectMember::find_role(pool, project_id, user_id).await?;

    if let Some(role) = project_role {
        if project_role_allows(role, action) {
            return Ok(AccessScope {
                organization_id,
                project_id: Some(project_id),
                org_role: None,
                project_role: Some(role),
            });
        }
    }

    // Organization owners and admins administer the org's projects even
    // without an explicit project membership row.
    let fallback = org_role(pool, organization_id, user_id).await?;
    match fallback {
        Some(role @ (OrgRole::Owner | OrgRole::Admin)) => Ok(AccessScope {
            organization_id,
            project_id: Some(project_id),
            org_role: Some(role),
            project_role,
        }),
        _ => Err(AccessError::Forbidden),
    }
}

async fn org_role(
    pool: &SqlitePool,
    organization_id: Uuid,
    user_id: Uuid,
) -> Result<Option<OrgRole>, sqlx::Error> {
    sqlx::query_scalar::<_, OrgRole>(
        "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
    )
    .bind(organization_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Resolve a project-chained resource to its owning project, if it exists.
async fn resolve_project_id(
    pool: &SqlitePool,
    resource: Resource,
) -> Result<Option<Uuid>, sqlx::Error> {
    let (sql, id) = match resource {
        Resource::Organization(_) => unreachable!("handled by ensure"),
        Resource::Project(id) => ("SELECT id FROM projects WHERE id = $1", id),
        Resource::Board(id) => ("SELECT project_id FROM boards WHERE id = $1", id),
        Resource::Column(id) => (
            r#"SELECT b.project_id FROM board_columns c
               INNER JOIN boards b ON b.id = c.board_id
               WHERE c.id = $1"#,
            id,
        ),
        Resource::Task(id) => ("SELECT project_id FROM tasks WHERE id = $1", id),
        Resource::Label(id) => ("SELECT project_id FROM labels WHERE id = $1", id),
        Resource::Comment(id) => (
            r#"SELECT t.project_id FROM comments c
               INNER JOIN tasks t ON t.id = c.task_id
               WHERE c.id = $1"#,
            id,
        ),
        Resource::Checklist(id) => (
            r#"SELECT t.project_id FROM checklists cl
               INNER JOIN tasks t ON t.id = cl.task_id
               WHERE cl.id = $1"#,
            id,
        ),
        Resource::ChecklistItem(id) => (
            r#"SELECT t.project_id FROM checklist_items ci
               INNER JOIN checklists cl ON cl.id = ci.checklist_id
               INNER JOIN tasks t ON t.id = cl.task_id
               WHERE ci.id = $1"#,
            id,
        ),
        Resource::TimeEntry(id) => (
            r#"SELECT t.project_id FROM time_entries te
               INNER JOIN tasks t ON t.id = te.task_id
               WHERE te.id = $1"#,
            id,
        ),
        Resource::CustomField(id) => ("SELECT project_id FROM custom_fields WHERE id = $1", id),
    };

    sqlx::query_scalar::<_, Uuid>(sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}
