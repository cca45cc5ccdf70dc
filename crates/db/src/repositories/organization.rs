//! Organization repository for database operations.
//!
//! Membership mutations run through the central policy in `faktura-core`
//! before any row is touched.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::policy::{self, MemberChange, PolicyViolation, Role, TenantContext};
use faktura_shared::SmtpSettings;

use crate::entities::{organization_members, organizations, sea_orm_active_enums::UserRole, users};
use crate::repositories::convert::{role_from_db, role_to_db};

/// Error types for organization operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    /// Organization not found.
    #[error("Organization not found")]
    NotFound,

    /// Target user is not a member of the organization.
    #[error("User is not a member of this organization")]
    NotMember,

    /// Slug already taken.
    #[error("An organization with this slug already exists")]
    SlugExists,

    /// The user already belongs to an organization.
    #[error("User already belongs to an organization")]
    AlreadyProvisioned,

    /// No fields provided for update.
    #[error("No fields provided for update")]
    EmptyUpdate,

    /// Invalid organization name.
    #[error("Name must be between 1 and 255 characters")]
    InvalidName,

    /// Invalid currency code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Invalid document number prefix.
    #[error("Invalid number prefix: {0}")]
    InvalidPrefix(String),

    /// A membership rule denied the change.
    #[error("{0}")]
    Policy(#[from] PolicyViolation),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Fields accepted by an organization update.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrganizationInput {
    /// New organization name.
    pub name: Option<String>,
    /// New currency code (ISO 4217).
    pub currency: Option<String>,
    /// Invoice number prefix override.
    pub invoice_prefix: Option<String>,
    /// Purchase order number prefix override.
    pub purchase_order_prefix: Option<String>,
    /// Receipt number prefix override.
    pub receipt_prefix: Option<String>,
    /// Per-organization SMTP settings.
    pub smtp: Option<SmtpSettings>,
}

impl UpdateOrganizationInput {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.currency.is_none()
            && self.invoice_prefix.is_none()
            && self.purchase_order_prefix.is_none()
            && self.receipt_prefix.is_none()
            && self.smtp.is_none()
    }
}

/// Organization repository for CRUD and membership operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Checks if a slug is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, DbErr> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new organization with the creator as owner.
    ///
    /// The creator must not already belong to an organization.
    ///
    /// # Errors
    ///
    /// Returns `SlugExists` or `AlreadyProvisioned` on rule violations, or a
    /// database error.
    pub async fn create_with_owner(
        &self,
        name: &str,
        slug: &str,
        currency: &str,
        owner_id: Uuid,
    ) -> Result<organizations::Model, OrganizationError> {
        if name.is_empty() || name.len() > 255 {
            return Err(OrganizationError::InvalidName);
        }
        validate_currency(currency)?;

        if self.slug_exists(slug).await? {
            return Err(OrganizationError::SlugExists);
        }

        let existing = organization_members::Entity::find()
            .filter(organization_members::Column::UserId.eq(owner_id))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(OrganizationError::AlreadyProvisioned);
        }

        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let org_id = Uuid::new_v4();

        let org = organizations::ActiveModel {
            id: Set(org_id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            currency: Set(currency.to_string()),
            invoice_prefix: Set(None),
            purchase_order_prefix: Set(None),
            receipt_prefix: Set(None),
            smtp_settings: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let org = org.insert(&txn).await?;

        let member = organization_members::ActiveModel {
            organization_id: Set(org_id),
            user_id: Set(owner_id),
            role: Set(UserRole::Owner),
            joined_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        member.insert(&txn).await?;

        txn.commit().await?;

        Ok(org)
    }

    /// Updates organization settings.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `EmptyUpdate`, or a validation error.
    pub async fn update(
        &self,
        org_id: Uuid,
        input: UpdateOrganizationInput,
    ) -> Result<organizations::Model, OrganizationError> {
        if input.is_empty() {
            return Err(OrganizationError::EmptyUpdate);
        }

        let org = self
            .find_by_id(org_id)
            .await?
            .ok_or(OrganizationError::NotFound)?;

        let mut active: organizations::ActiveModel = org.into();

        if let Some(name) = input.name {
            if name.is_empty() || name.len() > 255 {
                return Err(OrganizationError::InvalidName);
            }
            active.name = Set(name);
        }
        if let Some(currency) = input.currency {
            validate_currency(&currency)?;
            active.currency = Set(currency);
        }
        if let Some(prefix) = input.invoice_prefix {
            validate_prefix(&prefix)?;
            active.invoice_prefix = Set(Some(prefix));
        }
        if let Some(prefix) = input.purchase_order_prefix {
            validate_prefix(&prefix)?;
            active.purchase_order_prefix = Set(Some(prefix));
        }
        if let Some(prefix) = input.receipt_prefix {
            validate_prefix(&prefix)?;
            active.receipt_prefix = Set(Some(prefix));
        }
        if let Some(smtp) = input.smtp {
            let value = serde_json::to_value(&smtp)
                .map_err(|e| DbErr::Custom(format!("smtp settings: {e}")))?;
            active.smtp_settings = Set(Some(value));
        }

        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Gets all members of an organization with their user records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_members(
        &self,
        org_id: Uuid,
    ) -> Result<Vec<(users::Model, organization_members::Model)>, DbErr> {
        organization_members::Entity::find()
            .filter(organization_members::Column::OrganizationId.eq(org_id))
            .order_by_asc(organization_members::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await
            .map(|results| {
                results
                    .into_iter()
                    .filter_map(|(membership, user)| user.map(|u| (u, membership)))
                    .collect()
            })
    }

    /// Gets a user's membership in an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<organization_members::Model>, DbErr> {
        organization_members::Entity::find_by_id((org_id, user_id))
            .one(&self.db)
            .await
    }

    /// Changes a member's role, subject to the membership rules.
    ///
    /// # Errors
    ///
    /// Returns `NotMember` if the target is not in the actor's organization,
    /// or a `Policy` error if the rules deny the change.
    pub async fn update_member_role(
        &self,
        actor: &TenantContext,
        target_user: Uuid,
        new_role: Role,
    ) -> Result<organization_members::Model, OrganizationError> {
        let membership = self
            .get_member(actor.organization_id, target_user)
            .await?
            .ok_or(OrganizationError::NotMember)?;

        policy::check_member_change(
            actor,
            target_user,
            role_from_db(&membership.role),
            MemberChange::ChangeRole(new_role),
        )?;

        let mut active: organization_members::ActiveModel = membership.into();
        active.role = Set(role_to_db(new_role));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Removes a member from the organization, subject to the membership
    /// rules.
    ///
    /// # Errors
    ///
    /// Returns `NotMember` if the target is not in the actor's organization,
    /// or a `Policy` error if the rules deny the removal.
    pub async fn remove_member(
        &self,
        actor: &TenantContext,
        target_user: Uuid,
    ) -> Result<(), OrganizationError> {
        let membership = self
            .get_member(actor.organization_id, target_user)
            .await?
            .ok_or(OrganizationError::NotMember)?;

        policy::check_member_change(
            actor,
            target_user,
            role_from_db(&membership.role),
            MemberChange::Remove,
        )?;

        organization_members::Entity::delete_by_id((actor.organization_id, target_user))
            .exec(&self.db)
            .await?;

        Ok(())
    }
}

fn validate_currency(currency: &str) -> Result<(), OrganizationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(OrganizationError::InvalidCurrency(currency.to_string()))
    }
}

fn validate_prefix(prefix: &str) -> Result<(), OrganizationError> {
    if !prefix.is_empty()
        && prefix.len() <= 10
        && prefix.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Ok(())
    } else {
        Err(OrganizationError::InvalidPrefix(prefix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("IDR").is_ok());
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("RUPIAH").is_err());
        assert!(validate_currency("").is_err());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("INV").is_ok());
        assert!(validate_prefix("KWT2").is_ok());
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("TOOLONGPREFIX").is_err());
        assert!(validate_prefix("IN-V").is_err());
    }

    #[test]
    fn test_empty_update_detection() {
        assert!(UpdateOrganizationInput::default().is_empty());
        assert!(
            !UpdateOrganizationInput {
                name: Some("New".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
