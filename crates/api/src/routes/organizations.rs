//! Organization, membership, and invitation routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::context::Tenant;
use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};
use faktura_core::policy::{self, Action, Role};
use faktura_db::entities::sea_orm_active_enums::UserRole;
use faktura_db::repositories::organization::UpdateOrganizationInput;
use faktura_db::{InvitationRepository, OrganizationRepository};
use faktura_shared::AppError;
use faktura_shared::auth::{
    AcceptInvitationRequest, CreateOrganizationRequest, InviteMemberRequest,
    UpdateMemberRequest, UpdateOrganizationRequest,
};

/// Creates the organizations router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizations", post(create_organization))
        .route("/organization", get(get_organization))
        .route("/organization", patch(update_organization))
        .route("/organization/members", get(list_members))
        .route("/organization/members/{user_id}", patch(update_member))
        .route("/organization/members/{user_id}", delete(remove_member))
        .route("/organization/invitations", post(create_invitation))
        .route("/organization/invitations", get(list_invitations))
        .route("/invitations/accept", post(accept_invitation))
}

/// Converts the database role to its wire representation.
pub(crate) fn role_to_string(role: &UserRole) -> String {
    match role {
        UserRole::Owner => "owner".to_string(),
        UserRole::Admin => "admin".to_string(),
        UserRole::Member => "member".to_string(),
    }
}

fn parse_role(s: &str) -> Result<Role, ApiError> {
    Role::parse(s).ok_or_else(|| {
        ApiError(AppError::Validation(
            "Invalid role. Must be one of: admin, member".to_string(),
        ))
    })
}

fn organization_body(org: &faktura_db::entities::organizations::Model) -> serde_json::Value {
    json!({
        "id": org.id,
        "name": org.name,
        "slug": org.slug,
        "currency": org.currency,
        "invoice_prefix": org.invoice_prefix,
        "purchase_order_prefix": org.purchase_order_prefix,
        "receipt_prefix": org.receipt_prefix,
        "smtp_configured": org.smtp_settings.is_some(),
        "created_at": org.created_at,
        "updated_at": org.updated_at,
    })
}

/// POST /organizations - Create a new organization with the caller as owner.
async fn create_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<Response, ApiError> {
    let org_repo = OrganizationRepository::new((*state.db).clone());

    let org = org_repo
        .create_with_owner(
            &payload.name,
            &payload.slug,
            &payload.currency,
            auth.user_id(),
        )
        .await?;

    info!(
        org_id = %org.id,
        slug = %org.slug,
        owner_id = %auth.user_id(),
        "Organization created"
    );

    Ok((StatusCode::CREATED, Json(organization_body(&org))).into_response())
}

/// GET /organization - The caller's organization.
async fn get_organization(tenant: Tenant) -> Result<Response, ApiError> {
    Ok((StatusCode::OK, Json(organization_body(&tenant.organization))).into_response())
}

/// PATCH /organization - Update organization settings.
async fn update_organization(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<Response, ApiError> {
    policy::authorize(&tenant.ctx, Action::ManageOrganization)?;

    let org_repo = OrganizationRepository::new((*state.db).clone());
    let org = org_repo
        .update(
            tenant.ctx.organization_id,
            UpdateOrganizationInput {
                name: payload.name,
                currency: payload.currency,
                invoice_prefix: payload.invoice_prefix,
                purchase_order_prefix: payload.purchase_order_prefix,
                receipt_prefix: payload.receipt_prefix,
                smtp: payload.smtp,
            },
        )
        .await?;

    info!(org_id = %org.id, "Organization updated");

    Ok((StatusCode::OK, Json(organization_body(&org))).into_response())
}

/// GET /organization/members - List the organization's members.
async fn list_members(State(state): State<AppState>, tenant: Tenant) -> Result<Response, ApiError> {
    let org_repo = OrganizationRepository::new((*state.db).clone());
    let members = org_repo.get_members(tenant.ctx.organization_id).await?;

    let members_json: Vec<_> = members
        .into_iter()
        .map(|(user, membership)| {
            json!({
                "id": user.id,
                "email": user.email,
                "full_name": user.full_name,
                "role": role_to_string(&membership.role),
                "joined_at": membership.joined_at,
            })
        })
        .collect();

    Ok((StatusCode::OK, Json(json!({ "members": members_json }))).into_response())
}

/// PATCH /organization/members/{user_id} - Change a member's role.
async fn update_member(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRequest>,
) -> Result<Response, ApiError> {
    let new_role = parse_role(&payload.role)?;

    let org_repo = OrganizationRepository::new((*state.db).clone());
    let membership = org_repo
        .update_member_role(&tenant.ctx, user_id, new_role)
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        user_id = %user_id,
        updated_by = %tenant.ctx.user_id,
        role = %payload.role,
        "Member role updated"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "user_id": membership.user_id,
            "organization_id": membership.organization_id,
            "role": role_to_string(&membership.role),
            "updated_at": membership.updated_at,
        })),
    )
        .into_response())
}

/// DELETE /organization/members/{user_id} - Remove a member.
async fn remove_member(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let org_repo = OrganizationRepository::new((*state.db).clone());
    org_repo.remove_member(&tenant.ctx, user_id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        user_id = %user_id,
        removed_by = %tenant.ctx.user_id,
        "Member removed from organization"
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /organization/invitations - Invite a user by email.
async fn create_invitation(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<InviteMemberRequest>,
) -> Result<Response, ApiError> {
    policy::authorize(&tenant.ctx, Action::ManageMembers)?;
    let role = parse_role(&payload.role)?;

    let invitations = InvitationRepository::new((*state.db).clone());
    let invitation = invitations
        .create(
            tenant.ctx.organization_id,
            &payload.email,
            role,
            tenant.ctx.user_id,
        )
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        email = %payload.email,
        role = %payload.role,
        invited_by = %tenant.ctx.user_id,
        "Invitation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": invitation.id,
            "email": invitation.email,
            "role": role_to_string(&invitation.role),
            "token": invitation.token,
            "expires_at": invitation.expires_at,
        })),
    )
        .into_response())
}

/// GET /organization/invitations - List pending invitations.
async fn list_invitations(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Response, ApiError> {
    policy::authorize(&tenant.ctx, Action::ManageMembers)?;

    let invitations = InvitationRepository::new((*state.db).clone());
    let pending = invitations
        .list_pending(tenant.ctx.organization_id)
        .await
        .map_err(ApiError::from)?;

    let invitations_json: Vec<_> = pending
        .into_iter()
        .map(|inv| {
            json!({
                "id": inv.id,
                "email": inv.email,
                "role": role_to_string(&inv.role),
                "invited_by": inv.invited_by,
                "expires_at": inv.expires_at,
                "created_at": inv.created_at,
            })
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(json!({ "invitations": invitations_json })),
    )
        .into_response())
}

/// POST /invitations/accept - Accept an invitation, replacing any existing
/// membership.
async fn accept_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AcceptInvitationRequest>,
) -> Result<Response, ApiError> {
    let invitations = InvitationRepository::new((*state.db).clone());
    let (invitation, membership) = invitations.accept(&payload.token, auth.user_id()).await?;

    info!(
        org_id = %invitation.organization_id,
        user_id = %auth.user_id(),
        role = %role_to_string(&membership.role),
        "Invitation accepted"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "organization_id": membership.organization_id,
            "role": role_to_string(&membership.role),
            "joined_at": membership.joined_at,
        })),
    )
        .into_response())
}
