//! Tenant context resolution at the request edge.
//!
//! The context is resolved exactly once per request, from the session
//! identity and the caller's single organization membership; handlers and
//! repositories below receive the resolved value and never re-derive it.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

use faktura_core::policy::TenantContext;
use faktura_db::UserRepository;
use faktura_db::entities::organizations;
use faktura_shared::{AppError, Claims};

use crate::AppState;
use crate::error::ApiError;

/// The resolved caller: tenant context plus their organization row.
///
/// Rejects with `Unauthenticated` when there is no session and with
/// `NoOrganization` when the user has no membership yet.
#[derive(Debug, Clone)]
pub struct Tenant {
    /// The resolved `{user, organization, role}` context.
    pub ctx: TenantContext,
    /// The caller's organization.
    pub organization: organizations::Model,
}

impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| ApiError(AppError::Unauthenticated("no session".to_string())))?;

        resolve(state, &claims).await
    }
}

/// Optional variant of [`Tenant`] for read paths.
///
/// Anonymous or unprovisioned callers resolve to `None` instead of an
/// error, so dashboard-style reads render empty rather than failing.
#[derive(Debug, Clone)]
pub struct MaybeTenant(pub Option<Tenant>);

impl FromRequestParts<AppState> for MaybeTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(claims) = parts.extensions.get::<Claims>().cloned() else {
            return Ok(Self(None));
        };

        match resolve(state, &claims).await {
            Ok(tenant) => Ok(Self(Some(tenant))),
            Err(ApiError(AppError::Unauthenticated(_) | AppError::NoOrganization)) => {
                Ok(Self(None))
            }
            Err(e) => Err(e),
        }
    }
}

async fn resolve(state: &AppState, claims: &Claims) -> Result<Tenant, ApiError> {
    let user_repo = UserRepository::new((*state.db).clone());

    let (membership, organization) = user_repo
        .get_membership(claims.user_id())
        .await?
        .ok_or(ApiError(AppError::NoOrganization))?;

    let ctx = TenantContext {
        user_id: claims.user_id(),
        organization_id: organization.id,
        role: faktura_db::repositories::convert::role_from_db(&membership.role),
    };

    Ok(Tenant { ctx, organization })
}
