//! Invitation repository.
//!
//! Invitations carry a random token and expire after seven days. Acceptance
//! replaces the accepting user's existing membership in one transaction,
//! preserving the one-organization-per-user invariant.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::policy::Role;

use crate::entities::{invitations, organization_members};
use crate::repositories::convert::role_to_db;

/// Invitation validity window.
const INVITATION_TTL_DAYS: i64 = 7;

/// Error types for invitation operations.
#[derive(Debug, thiserror::Error)]
pub enum InvitationError {
    /// No invitation for this token.
    #[error("Invitation not found")]
    NotFound,

    /// The invitation was already accepted.
    #[error("Invitation has already been accepted")]
    AlreadyAccepted,

    /// The invitation expired.
    #[error("Invitation has expired")]
    Expired,

    /// Owners are created with their organization, never invited.
    #[error("Cannot invite a user as owner")]
    OwnerRole,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Invitation repository.
#[derive(Debug, Clone)]
pub struct InvitationRepository {
    db: DatabaseConnection,
}

impl InvitationRepository {
    /// Creates a new invitation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Generates a URL-safe random invitation token.
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        base64_url::encode(&bytes)
    }

    /// Creates an invitation to join an organization.
    ///
    /// # Errors
    ///
    /// Returns `OwnerRole` when trying to invite an owner, or a database
    /// error.
    pub async fn create(
        &self,
        org_id: Uuid,
        email: &str,
        role: Role,
        invited_by: Uuid,
    ) -> Result<invitations::Model, InvitationError> {
        if role == Role::Owner {
            return Err(InvitationError::OwnerRole);
        }

        let now = Utc::now();

        let invitation = invitations::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org_id),
            email: Set(email.to_string()),
            role: Set(role_to_db(role)),
            token: Set(Self::generate_token()),
            invited_by: Set(invited_by),
            expires_at: Set((now + Duration::days(INVITATION_TTL_DAYS)).into()),
            accepted_at: Set(None),
            created_at: Set(now.into()),
        };

        let model = invitation.insert(&self.db).await?;
        Ok(model)
    }

    /// Lists pending (unaccepted, unexpired) invitations for an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_pending(&self, org_id: Uuid) -> Result<Vec<invitations::Model>, DbErr> {
        invitations::Entity::find()
            .filter(invitations::Column::OrganizationId.eq(org_id))
            .filter(invitations::Column::AcceptedAt.is_null())
            .filter(invitations::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(invitations::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Accepts an invitation, replacing the user's existing membership.
    ///
    /// Returns the accepted invitation and the new membership row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `AlreadyAccepted`, or `Expired` on rule
    /// violations, or a database error.
    pub async fn accept(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<(invitations::Model, organization_members::Model), InvitationError> {
        let invitation = invitations::Entity::find()
            .filter(invitations::Column::Token.eq(token))
            .one(&self.db)
            .await?
            .ok_or(InvitationError::NotFound)?;

        if invitation.accepted_at.is_some() {
            return Err(InvitationError::AlreadyAccepted);
        }

        let now = Utc::now();
        if invitation.expires_at < now {
            return Err(InvitationError::Expired);
        }

        let txn = self.db.begin().await?;

        // Replace any existing membership: one organization per user.
        organization_members::Entity::delete_many()
            .filter(organization_members::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let member = organization_members::ActiveModel {
            organization_id: Set(invitation.organization_id),
            user_id: Set(user_id),
            role: Set(invitation.role.clone()),
            joined_at: Set(now.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let membership = member.insert(&txn).await?;

        let mut active: invitations::ActiveModel = invitation.into();
        active.accepted_at = Set(Some(now.into()));
        let invitation = active.update(&txn).await?;

        txn.commit().await?;

        Ok((invitation, membership))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = InvitationRepository::generate_token();
        let b = InvitationRepository::generate_token();

        assert_ne!(a, b);
        assert!(a.len() >= 40);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
