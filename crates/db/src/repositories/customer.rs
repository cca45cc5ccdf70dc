//! Customer repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use faktura_core::policy::{self, Action, PolicyViolation, TenantContext};
use faktura_shared::types::PageRequest;

use crate::entities::{customers, documents};

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(Uuid),

    /// Customer belongs to another organization.
    #[error("Customer belongs to another organization")]
    CrossTenant,

    /// The policy denied the mutation.
    #[error("{0}")]
    Policy(#[from] PolicyViolation),

    /// The customer still has documents.
    #[error("Customer has documents and cannot be deleted")]
    HasDocuments,

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Customer name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Billing address.
    pub address: Option<String>,
}

/// Input for updating a customer.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// New name.
    pub name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
    /// New billing address.
    pub address: Option<String>,
}

/// Customer repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a customer, distinguishing a foreign row from a missing one.
    async fn load(&self, ctx: &TenantContext, id: Uuid) -> Result<customers::Model, CustomerError> {
        let customer = customers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        if customer.organization_id != ctx.organization_id {
            return Err(CustomerError::CrossTenant);
        }

        Ok(customer)
    }

    /// Creates a customer in the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns a validation or database error.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        if input.name.trim().is_empty() {
            return Err(CustomerError::Validation(
                "customer name must not be blank".to_string(),
            ));
        }

        let now = Utc::now().into();

        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(ctx.organization_id),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            created_by: Set(ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = customer.insert(&self.db).await?;
        Ok(model)
    }

    /// Lists customers for an organization, paginated by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        org_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<customers::Model>, u64), DbErr> {
        let query =
            customers::Entity::find().filter(customers::Column::OrganizationId.eq(org_id));

        let total = query.clone().count(&self.db).await?;

        let items = query
            .order_by_asc(customers::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Gets a customer in the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `CrossTenant` when the row is absent or foreign.
    pub async fn get(
        &self,
        ctx: &TenantContext,
        id: Uuid,
    ) -> Result<customers::Model, CustomerError> {
        self.load(ctx, id).await
    }

    /// Updates a customer, subject to the ownership rule.
    ///
    /// # Errors
    ///
    /// Returns a policy error when the caller may not edit this customer.
    pub async fn update(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let customer = self.load(ctx, id).await?;

        policy::authorize(
            ctx,
            Action::EditOwned {
                created_by: customer.created_by,
            },
        )?;

        let mut active: customers::ActiveModel = customer.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(CustomerError::Validation(
                    "customer name must not be blank".to_string(),
                ));
            }
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }

        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes a customer with no documents.
    ///
    /// # Errors
    ///
    /// Returns `HasDocuments` when any document still references the
    /// customer.
    pub async fn delete(&self, ctx: &TenantContext, id: Uuid) -> Result<(), CustomerError> {
        let customer = self.load(ctx, id).await?;

        policy::authorize(
            ctx,
            Action::EditOwned {
                created_by: customer.created_by,
            },
        )?;

        let document_count = documents::Entity::find()
            .filter(documents::Column::CustomerId.eq(id))
            .count(&self.db)
            .await?;
        if document_count > 0 {
            return Err(CustomerError::HasDocuments);
        }

        customers::Entity::delete_by_id(id).exec(&self.db).await?;

        Ok(())
    }
}
