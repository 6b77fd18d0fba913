//! Organizations group users and projects under a shared membership roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("Organization not found")]
    NotFound,
    #[error("User is already a member of this organization")]
    AlreadyMember,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Role a user holds within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrgRole {
    Owner,
    Admin,
    Member,
    Viewer,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct OrganizationMember {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: OrgRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateOrganization {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct AddOrganizationMember {
    pub user_id: Uuid,
    pub role: OrgRole,
}

impl Organization {
    /// Create the organization and seed the creator as its owner member,
    /// in one transaction.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateOrganization,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Self, OrganizationError> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let org = sqlx::query_as::<_, Organization>(
            r#"INSERT INTO organizations (id, name, description, logo_url, owner_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $6)
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.logo_url)
        .bind(owner_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"INSERT INTO organization_members (id, organization_id, user_id, role, joined_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(Uuid::new_v4())
        .bind(org.id)
        .bind(owner_id)
        .bind(OrgRole::Owner)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(org)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Organizations where the user has a membership row.
    pub async fn find_for_user(
        pool: &SqlitePool,
        user_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            r#"SELECT o.*
               FROM organizations o
               INNER JOIN organization_members om ON om.organization_id = o.id
               WHERE om.user_id = $1
               ORDER BY o.created_at DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateOrganization,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Organization>(
            r#"UPDATE organizations
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   logo_url = COALESCE($4, logo_url),
                   updated_at = $5
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.logo_url)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl OrganizationMember {
    pub async fn add(
        pool: &SqlitePool,
        organization_id: Uuid,
        data: &AddOrganizationMember,
    ) -> Result<Self, OrganizationError> {
        sqlx::query_as::<_, OrganizationMember>(
            r#"INSERT INTO organization_members (id, organization_id, user_id, role, joined_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(data.user_id)
        .bind(data.role)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                OrganizationError::AlreadyMember
            }
            _ => OrganizationError::Database(e),
        })
    }

    pub async fn find_for_organization(
        pool: &SqlitePool,
        organization_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, OrganizationMember>(
            r#"SELECT * FROM organization_members
               WHERE organization_id = $1
               ORDER BY joined_at ASC"#,
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    pub async fn remove(
        pool: &SqlitePool,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
                .bind(organization_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
