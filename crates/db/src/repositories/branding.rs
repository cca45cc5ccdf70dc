//! Branding asset repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use faktura_core::storage::AssetKind;

use crate::entities::branding_assets;
use crate::repositories::convert::asset_kind_to_db;

/// Error types for branding asset operations.
#[derive(Debug, thiserror::Error)]
pub enum BrandingError {
    /// Asset not found in this organization.
    #[error("Branding asset not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for recording an uploaded asset.
#[derive(Debug, Clone)]
pub struct CreateAssetInput {
    /// Pre-generated asset ID (shared with the storage key).
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Asset kind.
    pub kind: AssetKind,
    /// Owning user, for profile images.
    pub user_id: Option<Uuid>,
    /// Original filename.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// File size in bytes.
    pub file_size: i64,
    /// Object storage key.
    pub storage_key: String,
    /// Uploading user.
    pub uploaded_by: Uuid,
}

/// Branding asset repository.
#[derive(Debug, Clone)]
pub struct BrandingRepository {
    db: DatabaseConnection,
}

impl BrandingRepository {
    /// Creates a new branding repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an asset row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateAssetInput,
    ) -> Result<branding_assets::Model, DbErr> {
        let asset = branding_assets::ActiveModel {
            id: Set(input.id),
            organization_id: Set(input.organization_id),
            kind: Set(asset_kind_to_db(input.kind)),
            user_id: Set(input.user_id),
            file_name: Set(input.file_name),
            content_type: Set(input.content_type),
            file_size: Set(input.file_size),
            storage_key: Set(input.storage_key),
            uploaded_by: Set(input.uploaded_by),
            created_at: Set(Utc::now().into()),
        };

        asset.insert(&self.db).await
    }

    /// Finds an asset scoped to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<branding_assets::Model>, DbErr> {
        branding_assets::Entity::find_by_id(id)
            .filter(branding_assets::Column::OrganizationId.eq(org_id))
            .one(&self.db)
            .await
    }

    /// Lists an organization's assets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, org_id: Uuid) -> Result<Vec<branding_assets::Model>, DbErr> {
        branding_assets::Entity::find()
            .filter(branding_assets::Column::OrganizationId.eq(org_id))
            .order_by_desc(branding_assets::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Deletes an asset row.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, org_id: Uuid, id: Uuid) -> Result<bool, DbErr> {
        let result = branding_assets::Entity::delete_many()
            .filter(branding_assets::Column::Id.eq(id))
            .filter(branding_assets::Column::OrganizationId.eq(org_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
