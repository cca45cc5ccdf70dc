//! Email log repository.
//!
//! Every outbound document email gets a log row: `pending` when queued for
//! the relay, then `sent` or `failed` (with the relay's error message).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use faktura_core::document::DocumentKind;

use crate::entities::{email_logs, sea_orm_active_enums::EmailStatus};
use crate::repositories::convert::kind_to_db;

/// Email log repository.
#[derive(Debug, Clone)]
pub struct EmailLogRepository {
    db: DatabaseConnection,
}

impl EmailLogRepository {
    /// Creates a new email log repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a pending send attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_pending(
        &self,
        org_id: Uuid,
        kind: DocumentKind,
        document_id: Uuid,
        recipient_email: &str,
        subject: &str,
    ) -> Result<email_logs::Model, DbErr> {
        let now = Utc::now().into();

        let log = email_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            organization_id: Set(org_id),
            document_type: Set(kind_to_db(kind)),
            document_id: Set(document_id),
            recipient_email: Set(recipient_email.to_string()),
            subject: Set(subject.to_string()),
            status: Set(EmailStatus::Pending),
            error_message: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        log.insert(&self.db).await
    }

    /// Marks a log row as sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_sent(&self, log: email_logs::Model) -> Result<email_logs::Model, DbErr> {
        let mut active: email_logs::ActiveModel = log.into();
        active.status = Set(EmailStatus::Sent);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Marks a log row as failed with the relay's error message.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_failed(
        &self,
        log: email_logs::Model,
        error_message: &str,
    ) -> Result<email_logs::Model, DbErr> {
        let mut active: email_logs::ActiveModel = log.into();
        active.status = Set(EmailStatus::Failed);
        active.error_message = Set(Some(error_message.to_string()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await
    }

    /// Lists send attempts for a document, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_document(
        &self,
        org_id: Uuid,
        document_id: Uuid,
    ) -> Result<Vec<email_logs::Model>, DbErr> {
        email_logs::Entity::find()
            .filter(email_logs::Column::OrganizationId.eq(org_id))
            .filter(email_logs::Column::DocumentId.eq(document_id))
            .order_by_desc(email_logs::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
