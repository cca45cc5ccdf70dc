//! Per-(organization, type, year) document number counters.
//!
//! Allocation is a single atomic upsert executed inside the same database
//! transaction as the document insert, so two concurrent creations can never
//! observe the same sequence. `peek_next` stays read-only for UI previews
//! and has no side effects however often it is called.

use chrono::{Datelike, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, QueryFilter,
    Statement,
};
use uuid::Uuid;

use faktura_core::document::{DocumentKind, default_prefix, format_document_number};

use crate::entities::{document_counters, organizations};
use crate::repositories::convert::kind_to_db;

/// The next document number for a counter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextNumber {
    /// Formatted number, e.g. `INV-2025-0001`.
    pub number: String,
    /// The bare sequence component.
    pub sequence: i64,
}

/// Repository for document number counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    db: DatabaseConnection,
}

impl CounterRepository {
    /// Creates a new counter repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The current UTC calendar year, which scopes every counter key.
    #[must_use]
    pub fn current_year() -> i32 {
        Utc::now().year()
    }

    /// Resolves the prefix a new counter row would be created with: the
    /// organization's override for this kind, or the kind default.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn resolve_prefix(
        &self,
        org_id: Uuid,
        kind: DocumentKind,
    ) -> Result<String, DbErr> {
        let org = organizations::Entity::find_by_id(org_id).one(&self.db).await?;

        let override_prefix = org.and_then(|o| match kind {
            DocumentKind::Invoice => o.invoice_prefix,
            DocumentKind::PurchaseOrder => o.purchase_order_prefix,
            DocumentKind::Receipt => o.receipt_prefix,
        });

        Ok(override_prefix.unwrap_or_else(|| default_prefix(kind).to_string()))
    }

    /// Returns the next number for (org, kind, current year) without
    /// allocating it. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn peek_next(
        &self,
        org_id: Uuid,
        kind: DocumentKind,
    ) -> Result<NextNumber, DbErr> {
        let year = Self::current_year();

        let counter = document_counters::Entity::find()
            .filter(document_counters::Column::OrganizationId.eq(org_id))
            .filter(document_counters::Column::DocumentType.eq(kind_to_db(kind)))
            .filter(document_counters::Column::Year.eq(year))
            .one(&self.db)
            .await?;

        match counter {
            Some(row) => {
                let sequence = row.last_number + 1;
                Ok(NextNumber {
                    number: format_document_number(&row.prefix, year, sequence),
                    sequence,
                })
            }
            None => {
                let prefix = self.resolve_prefix(org_id, kind).await?;
                Ok(NextNumber {
                    number: format_document_number(&prefix, year, 1),
                    sequence: 1,
                })
            }
        }
    }

    /// Allocates the next number for (org, kind, year), atomically.
    ///
    /// Runs a single `INSERT .. ON CONFLICT .. DO UPDATE .. RETURNING`
    /// against the composite counter key, so the increment and the read are
    /// one statement. Call this inside the transaction that inserts the
    /// document; if that transaction rolls back, the allocation does too.
    ///
    /// `prefix` only applies when the row is created (first allocation for
    /// the key); an existing counter keeps the prefix it was created with.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn allocate<C: ConnectionTrait>(
        conn: &C,
        org_id: Uuid,
        kind: DocumentKind,
        year: i32,
        prefix: &str,
    ) -> Result<NextNumber, DbErr> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
INSERT INTO document_counters
    (id, organization_id, document_type, year, prefix, last_number, created_at, updated_at)
VALUES
    ($1, $2, $3::document_type, $4, $5, 1, now(), now())
ON CONFLICT (organization_id, document_type, year)
DO UPDATE SET last_number = document_counters.last_number + 1, updated_at = now()
RETURNING prefix, last_number
",
            [
                Uuid::new_v4().into(),
                org_id.into(),
                kind.as_str().into(),
                year.into(),
                prefix.into(),
            ],
        );

        let row = conn
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("counter upsert returned no row".to_string()))?;

        let prefix: String = row.try_get("", "prefix")?;
        let sequence: i64 = row.try_get("", "last_number")?;

        Ok(NextNumber {
            number: format_document_number(&prefix, year, sequence),
            sequence,
        })
    }
}
