//! Documents migration: customers, documents, and per-year counters.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENT_COUNTERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS document_counters CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    address TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_customers_org ON customers(organization_id, name);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    doc_type document_type NOT NULL,
    number VARCHAR(50) NOT NULL,
    customer_id UUID NOT NULL REFERENCES customers(id),
    status document_status NOT NULL DEFAULT 'draft',
    issue_date DATE NOT NULL,
    due_date DATE,
    line_items JSONB NOT NULL,
    subtotal NUMERIC(20, 2) NOT NULL,
    tax_rate NUMERIC(8, 4),
    tax NUMERIC(20, 2) NOT NULL DEFAULT 0,
    total NUMERIC(20, 2) NOT NULL,
    notes TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,
    CONSTRAINT uq_documents_number UNIQUE (organization_id, doc_type, number)
);

-- Listings: tenant + type, active rows first
CREATE INDEX idx_documents_org_type ON documents(organization_id, doc_type, created_at DESC)
    WHERE deleted_at IS NULL;

-- Overdue sweep: open documents with a due date
CREATE INDEX idx_documents_due ON documents(due_date)
    WHERE status IN ('draft', 'sent') AND due_date IS NOT NULL AND deleted_at IS NULL;

CREATE INDEX idx_documents_customer ON documents(customer_id);
";

const DOCUMENT_COUNTERS_SQL: &str = r"
CREATE TABLE document_counters (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    document_type document_type NOT NULL,
    year INTEGER NOT NULL,
    prefix VARCHAR(10) NOT NULL,
    last_number BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_counters_key UNIQUE (organization_id, document_type, year),
    CONSTRAINT chk_last_number_non_negative CHECK (last_number >= 0)
);
";
