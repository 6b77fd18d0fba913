use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::{
    access::{self, Action, Resource},
    models::organization::{
        AddOrganizationMember, CreateOrganization, Organization, OrganizationMember,
        UpdateOrganization,
    },
};
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use super::PageQuery;
use crate::{AppState, auth::RequestContext, error::ApiError};

#[derive(Debug, Serialize, TS)]
pub struct OrganizationWithMembers {
    #[serde(flatten)]
    pub organization: Organization,
    pub members: Vec<OrganizationMember>,
}

/// POST /api/v1/organizations - Create an organization owned by the caller
pub async fn create_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateOrganization>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<Organization>>), ApiError> {
    let org =
        Organization::create(state.pool(), &payload, Uuid::new_v4(), ctx.user.id).await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(org))))
}

/// GET /api/v1/organizations - Organizations the caller belongs to
pub async fn list_organizations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(page): Query<PageQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Organization>>>, ApiError> {
    let (offset, limit) = state.config().page_window(page.skip, page.limit);
    let orgs = Organization::find_for_user(state.pool(), ctx.user.id, offset, limit).await?;
    Ok(ResponseJson(ApiResponse::success(orgs)))
}

/// GET /api/v1/organizations/{id} - Organization with its member roster
pub async fn get_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(org_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<OrganizationWithMembers>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let organization = Organization::find_by_id(state.pool(), org_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Organization not found".to_string()))?;
    let members = OrganizationMember::find_for_organization(state.pool(), org_id).await?;

    Ok(ResponseJson(ApiResponse::success(OrganizationWithMembers {
        organization,
        members,
    })))
}

/// PUT /api/v1/organizations/{id}
pub async fn update_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<UpdateOrganization>,
) -> Result<ResponseJson<ApiResponse<Organization>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let org = Organization::update(state.pool(), org_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(org)))
}

/// DELETE /api/v1/organizations/{id}
pub async fn delete_organization(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(org_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    Organization::delete(state.pool(), org_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/organizations/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(org_id): Path<Uuid>,
    Json(payload): Json<AddOrganizationMember>,
) -> Result<(StatusCode, ResponseJson<ApiResponse<OrganizationMember>>), ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let member = OrganizationMember::add(state.pool(), org_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        ResponseJson(ApiResponse::success(member)),
    ))
}

/// GET /api/v1/organizations/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(org_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<OrganizationMember>>>, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Read,
    )
    .await?;

    let members = OrganizationMember::find_for_organization(state.pool(), org_id).await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

/// DELETE /api/v1/organizations/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path((org_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    access::ensure(
        state.pool(),
        Resource::Organization(org_id),
        ctx.user.id,
        Action::Manage,
    )
    .await?;

    let removed = OrganizationMember::remove(state.pool(), org_id, user_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let inner = Router::new()
        .route("/", get(list_organizations).post(create_organization))
        .route(
            "/{org_id}",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        .route("/{org_id}/members", get(list_members).post(add_member))
        .route("/{org_id}/members/{user_id}", delete(remove_member));

    Router::new().nest("/organizations", inner)
}
