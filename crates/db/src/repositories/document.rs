//! Document repository: invoices, purchase orders, and receipts.
//!
//! Every mutation follows the guard sequence: load by id, `NotFound` if
//! absent, `CrossTenant` if the row belongs to another organization,
//! policy check against the creator, then apply stamping `updated_at`.
//! Creation allocates the document number inside the same transaction as
//! the insert.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::document::{
    DocumentKind, DocumentStatus, Lifecycle, LifecycleError, LineItem, compute_totals,
    default_prefix, validate_line_items,
};
use faktura_core::policy::{self, Action, PolicyViolation, TenantContext};
use faktura_shared::types::PageRequest;

use crate::entities::{customers, documents, organizations};
use crate::repositories::convert::{kind_to_db, status_to_db};
use crate::repositories::counter::{CounterRepository, NextNumber};

/// Error types for document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document not found.
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    /// Document belongs to another organization.
    #[error("Document belongs to another organization")]
    CrossTenant,

    /// The policy denied the mutation.
    #[error("{0}")]
    Policy(#[from] PolicyViolation),

    /// Referenced customer is missing or foreign.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mutation on a soft-deleted document.
    #[error("Document is already deleted")]
    AlreadyDeleted,

    /// Restore or purge on a document that is not deleted.
    #[error("Document is not deleted")]
    NotDeleted,

    /// Clients cannot set this status directly.
    #[error("Status 'overdue' is set by the sweep, not by clients")]
    StatusNotSettable,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LifecycleError> for DocumentError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::AlreadyDeleted => Self::AlreadyDeleted,
            LifecycleError::NotDeleted => Self::NotDeleted,
        }
    }
}

/// Input for creating a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Document kind.
    pub kind: DocumentKind,
    /// The customer the document is addressed to.
    pub customer_id: Uuid,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date; receipts carry none.
    pub due_date: Option<NaiveDate>,
    /// Line items.
    pub line_items: Vec<LineItem>,
    /// Tax rate as a fraction (0.11 for 11% VAT).
    pub tax_rate: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Input for updating a document.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// New customer reference.
    pub customer_id: Option<Uuid>,
    /// New issue date.
    pub issue_date: Option<NaiveDate>,
    /// New due date.
    pub due_date: Option<NaiveDate>,
    /// Replacement line items.
    pub line_items: Option<Vec<LineItem>>,
    /// New tax rate.
    pub tax_rate: Option<Decimal>,
    /// New notes.
    pub notes: Option<String>,
}

/// Filter options for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Filter by status.
    pub status: Option<DocumentStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Include soft-deleted rows. Off by default.
    pub include_deleted: bool,
}

/// Document repository for CRUD, lifecycle, and sweep operations.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads a document of the given kind, distinguishing a foreign row
    /// from a missing one.
    async fn load(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<documents::Model, DocumentError> {
        let document = documents::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DocumentError::NotFound(id))?;

        if document.doc_type != kind_to_db(kind) {
            return Err(DocumentError::NotFound(id));
        }
        if document.organization_id != ctx.organization_id {
            return Err(DocumentError::CrossTenant);
        }

        Ok(document)
    }

    /// Loads a document and checks the caller may mutate it.
    async fn load_for_edit(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<documents::Model, DocumentError> {
        let document = self.load(ctx, kind, id).await?;

        policy::authorize(
            ctx,
            Action::EditOwned {
                created_by: document.created_by,
            },
        )?;

        Ok(document)
    }

    /// Creates a document, allocating its number in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad line items or dates, and
    /// `CustomerNotFound` when the customer reference is missing or foreign.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: CreateDocumentInput,
    ) -> Result<documents::Model, DocumentError> {
        validate_line_items(&input.line_items)
            .map_err(|e| DocumentError::Validation(e.to_string()))?;

        if input.due_date.is_some() && !input.kind.has_due_date() {
            return Err(DocumentError::Validation(
                "receipts do not carry a due date".to_string(),
            ));
        }

        let customer = customers::Entity::find_by_id(input.customer_id)
            .one(&self.db)
            .await?;
        if !customer.is_some_and(|c| c.organization_id == ctx.organization_id) {
            return Err(DocumentError::CustomerNotFound(input.customer_id));
        }

        let totals = compute_totals(&input.line_items, input.tax_rate);
        let line_items = serde_json::to_value(&input.line_items)
            .map_err(|e| DbErr::Custom(format!("line items: {e}")))?;

        let year = CounterRepository::current_year();

        let txn = self.db.begin().await?;

        // Prefix overrides only matter when the counter row is first created
        // for this (org, kind, year); read them inside the transaction.
        let org = organizations::Entity::find_by_id(ctx.organization_id)
            .one(&txn)
            .await?;
        let prefix = org
            .and_then(|o| match input.kind {
                DocumentKind::Invoice => o.invoice_prefix,
                DocumentKind::PurchaseOrder => o.purchase_order_prefix,
                DocumentKind::Receipt => o.receipt_prefix,
            })
            .unwrap_or_else(|| default_prefix(input.kind).to_string());

        let NextNumber { number, .. } =
            CounterRepository::allocate(&txn, ctx.organization_id, input.kind, year, &prefix)
                .await?;

        let now = Utc::now().into();

        let document = documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(ctx.organization_id),
            doc_type: Set(kind_to_db(input.kind)),
            number: Set(number),
            customer_id: Set(input.customer_id),
            status: Set(status_to_db(DocumentStatus::Draft)),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            line_items: Set(line_items),
            subtotal: Set(totals.subtotal),
            tax_rate: Set(input.tax_rate),
            tax: Set(totals.tax),
            total: Set(totals.total),
            notes: Set(input.notes),
            created_by: Set(ctx.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let document = document.insert(&txn).await?;

        txn.commit().await?;

        Ok(document)
    }

    /// Lists documents of a kind, newest first.
    ///
    /// Soft-deleted rows are excluded unless the filter asks for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        org_id: Uuid,
        kind: DocumentKind,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<documents::Model>, u64), DbErr> {
        let mut query = documents::Entity::find()
            .filter(documents::Column::OrganizationId.eq(org_id))
            .filter(documents::Column::DocType.eq(kind_to_db(kind)));

        if !filter.include_deleted {
            query = query.filter(documents::Column::DeletedAt.is_null());
        }
        if let Some(status) = filter.status {
            query = query.filter(documents::Column::Status.eq(status_to_db(status)));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(documents::Column::CustomerId.eq(customer_id));
        }

        let total = query.clone().count(&self.db).await?;

        let items = query
            .order_by_desc(documents::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Gets a document in the caller's organization.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `CrossTenant` when the row is absent or foreign.
    pub async fn get(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<documents::Model, DocumentError> {
        self.load(ctx, kind, id).await
    }

    /// Updates a document's content fields, recomputing totals when line
    /// items or the tax rate change.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDeleted` for soft-deleted documents and policy or
    /// validation errors per the guard sequence.
    pub async fn update(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
        input: UpdateDocumentInput,
    ) -> Result<documents::Model, DocumentError> {
        let document = self.load_for_edit(ctx, kind, id).await?;

        if document.deleted_at.is_some() {
            return Err(DocumentError::AlreadyDeleted);
        }

        if let Some(customer_id) = input.customer_id {
            let customer = customers::Entity::find_by_id(customer_id)
                .one(&self.db)
                .await?;
            if !customer.is_some_and(|c| c.organization_id == ctx.organization_id) {
                return Err(DocumentError::CustomerNotFound(customer_id));
            }
        }

        if input.due_date.is_some() && !kind.has_due_date() {
            return Err(DocumentError::Validation(
                "receipts do not carry a due date".to_string(),
            ));
        }

        // Recompute totals from the effective line items and tax rate.
        let effective_items = match &input.line_items {
            Some(items) => {
                validate_line_items(items)
                    .map_err(|e| DocumentError::Validation(e.to_string()))?;
                items.clone()
            }
            None => parse_line_items(&document.line_items)?,
        };
        let effective_tax_rate = input.tax_rate.or(document.tax_rate);
        let totals = compute_totals(&effective_items, effective_tax_rate);

        let mut active: documents::ActiveModel = document.into();

        if let Some(customer_id) = input.customer_id {
            active.customer_id = Set(customer_id);
        }
        if let Some(issue_date) = input.issue_date {
            active.issue_date = Set(issue_date);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(items) = input.line_items {
            let value = serde_json::to_value(&items)
                .map_err(|e| DbErr::Custom(format!("line items: {e}")))?;
            active.line_items = Set(value);
        }
        if let Some(tax_rate) = input.tax_rate {
            active.tax_rate = Set(Some(tax_rate));
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }

        active.subtotal = Set(totals.subtotal);
        active.tax = Set(totals.tax);
        active.total = Set(totals.total);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Sets a document's status on client request.
    ///
    /// `overdue` is refused; only the sweep assigns it.
    ///
    /// # Errors
    ///
    /// Returns `StatusNotSettable` for `overdue`, `AlreadyDeleted` for
    /// soft-deleted documents, and policy errors per the guard sequence.
    pub async fn set_status(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
        status: DocumentStatus,
    ) -> Result<documents::Model, DocumentError> {
        if !status.is_client_settable() {
            return Err(DocumentError::StatusNotSettable);
        }

        let document = self.load_for_edit(ctx, kind, id).await?;

        if document.deleted_at.is_some() {
            return Err(DocumentError::AlreadyDeleted);
        }

        let mut active: documents::ActiveModel = document.into();
        active.status = Set(status_to_db(status));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Soft-deletes a document.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDeleted` if the document is already soft-deleted.
    pub async fn soft_delete(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<documents::Model, DocumentError> {
        let document = self.load_for_edit(ctx, kind, id).await?;

        let now = Utc::now();
        let lifecycle = Lifecycle::from_deleted_at(
            document.deleted_at.map(|at| at.with_timezone(&Utc)),
        )
        .delete(now)?;

        let mut active: documents::ActiveModel = document.into();
        active.deleted_at = Set(lifecycle.deleted_at().map(Into::into));
        active.updated_at = Set(now.into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Restores a soft-deleted document.
    ///
    /// # Errors
    ///
    /// Returns `NotDeleted` if the document is active.
    pub async fn restore(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<documents::Model, DocumentError> {
        let document = self.load_for_edit(ctx, kind, id).await?;

        let lifecycle = Lifecycle::from_deleted_at(
            document.deleted_at.map(|at| at.with_timezone(&Utc)),
        )
        .restore()?;

        let mut active: documents::ActiveModel = document.into();
        active.deleted_at = Set(lifecycle.deleted_at().map(Into::into));
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Permanently deletes a soft-deleted document.
    ///
    /// # Errors
    ///
    /// Returns `NotDeleted` if the document has not been soft-deleted first.
    pub async fn purge(
        &self,
        ctx: &TenantContext,
        kind: DocumentKind,
        id: Uuid,
    ) -> Result<(), DocumentError> {
        let document = self.load_for_edit(ctx, kind, id).await?;

        if document.deleted_at.is_none() {
            return Err(DocumentError::NotDeleted);
        }

        documents::Entity::delete_by_id(id).exec(&self.db).await?;

        Ok(())
    }

    /// Transitions every open document past its due date to `overdue`.
    ///
    /// With `org_id` set this is the tenant-scoped manual refresh; without
    /// it, the daily sweep over all organizations. Returns the number of
    /// documents transitioned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn sweep_overdue(&self, org_id: Option<Uuid>) -> Result<u64, DbErr> {
        let today = Utc::now().date_naive();
        let now = Utc::now();

        let mut update = documents::Entity::update_many()
            .col_expr(
                documents::Column::Status,
                Expr::value(status_to_db(DocumentStatus::Overdue)),
            )
            .col_expr(
                documents::Column::UpdatedAt,
                Expr::value(chrono::DateTime::<chrono::FixedOffset>::from(now)),
            )
            .filter(
                documents::Column::Status.is_in([
                    status_to_db(DocumentStatus::Draft),
                    status_to_db(DocumentStatus::Sent),
                ]),
            )
            .filter(documents::Column::DueDate.lt(today))
            .filter(documents::Column::DeletedAt.is_null());

        if let Some(org_id) = org_id {
            update = update.filter(documents::Column::OrganizationId.eq(org_id));
        }

        let result = update.exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

/// Parses the stored line items JSON back into domain line items.
fn parse_line_items(value: &serde_json::Value) -> Result<Vec<LineItem>, DocumentError> {
    serde_json::from_value(value.clone())
        .map_err(|e| DocumentError::Validation(format!("stored line items are malformed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_items_json_round_trip() {
        let items = vec![
            LineItem {
                description: "Design work".to_string(),
                quantity: dec!(2),
                unit_price: dec!(750.00),
            },
            LineItem {
                description: "Hosting".to_string(),
                quantity: dec!(12),
                unit_price: dec!(35.50),
            },
        ];

        let value = serde_json::to_value(&items).unwrap();
        let parsed = parse_line_items(&value).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_malformed_line_items_rejected() {
        let value = serde_json::json!([{ "description": "x" }]);
        assert!(matches!(
            parse_line_items(&value),
            Err(DocumentError::Validation(_))
        ));
    }
}
