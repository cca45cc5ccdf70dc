//! Email log and branding asset tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(EMAIL_LOGS_SQL).await?;
        db.execute_unprepared(BRANDING_ASSETS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS branding_assets CASCADE;
DROP TABLE IF EXISTS email_logs CASCADE;
",
        )
        .await?;
        Ok(())
    }
}

const EMAIL_LOGS_SQL: &str = r"
CREATE TABLE email_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    document_type document_type NOT NULL,
    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    recipient_email VARCHAR(255) NOT NULL,
    subject VARCHAR(500) NOT NULL,
    status email_status NOT NULL DEFAULT 'pending',
    error_message TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_email_logs_document ON email_logs(document_id, created_at DESC);
CREATE INDEX idx_email_logs_org ON email_logs(organization_id, created_at DESC);
";

const BRANDING_ASSETS_SQL: &str = r"
CREATE TABLE branding_assets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    kind asset_kind NOT NULL,
    user_id UUID REFERENCES users(id) ON DELETE CASCADE,
    file_name VARCHAR(255) NOT NULL,
    content_type VARCHAR(100) NOT NULL,
    file_size BIGINT NOT NULL,
    storage_key VARCHAR(1024) NOT NULL,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- profile images belong to a user, the rest to the organization alone
    CONSTRAINT chk_profile_image_user CHECK (
        (kind = 'profile_image') = (user_id IS NOT NULL)
    )
);

CREATE INDEX idx_branding_assets_org ON branding_assets(organization_id, kind);
";
