//! Branding asset routes: logos, signatures, stamps, profile images.
//!
//! Upload flow: request an upload URL (validates size and MIME type),
//! PUT the bytes to object storage, then confirm so the asset row is
//! recorded. Download URLs are presigned on demand.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::context::Tenant;
use crate::error::ApiError;
use faktura_core::storage::{AssetKind, BrandingUpload, StorageService};
use faktura_db::BrandingRepository;
use faktura_db::entities::branding_assets;
use faktura_db::repositories::branding::CreateAssetInput;
use faktura_shared::AppError;

/// Creates the branding router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/branding/upload-url", post(request_upload_url))
        .route("/branding", post(confirm_upload))
        .route("/branding", get(list_assets))
        .route("/branding/{id}/download-url", get(download_url))
        .route("/branding/{id}", delete(delete_asset))
}

/// Request body for an upload URL.
#[derive(Debug, Deserialize)]
struct UploadUrlRequest {
    kind: String,
    filename: String,
    content_type: String,
    file_size: u64,
}

/// Request body for confirming an upload.
#[derive(Debug, Deserialize)]
struct ConfirmUploadRequest {
    asset_id: Uuid,
    kind: String,
    filename: String,
    storage_key: String,
}

fn storage(state: &AppState) -> Result<Arc<StorageService>, ApiError> {
    state.storage.clone().ok_or_else(|| {
        ApiError(AppError::ExternalService(
            "Object storage is not configured".to_string(),
        ))
    })
}

fn parse_kind(s: &str) -> Result<AssetKind, ApiError> {
    AssetKind::parse(s).ok_or_else(|| {
        ApiError(AppError::Validation(
            "Invalid asset kind. Must be one of: logo, signature, stamp, profile_image"
                .to_string(),
        ))
    })
}

fn asset_body(asset: &branding_assets::Model) -> serde_json::Value {
    json!({
        "id": asset.id,
        "kind": asset.kind,
        "user_id": asset.user_id,
        "file_name": asset.file_name,
        "content_type": asset.content_type,
        "file_size": asset.file_size,
        "uploaded_by": asset.uploaded_by,
        "created_at": asset.created_at,
    })
}

/// POST /branding/upload-url - Presign an upload for a new asset.
async fn request_upload_url(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<UploadUrlRequest>,
) -> Result<Response, ApiError> {
    let storage = storage(&state)?;
    let kind = parse_kind(&payload.kind)?;

    let upload = BrandingUpload {
        organization_id: tenant.ctx.organization_id,
        kind,
        asset_id: Uuid::new_v4(),
        filename: payload.filename,
        content_type: payload.content_type,
        file_size: payload.file_size,
    };

    let presigned = storage.presign_upload(&upload).await?;
    let storage_key = StorageService::generate_storage_key(&upload);

    Ok((
        StatusCode::OK,
        Json(json!({
            "asset_id": upload.asset_id,
            "upload_url": presigned.url,
            "upload_method": presigned.method,
            "upload_headers": presigned.headers,
            "expires_at": presigned.expires_at,
            "storage_key": storage_key,
        })),
    )
        .into_response())
}

/// POST /branding - Record an uploaded asset after the client PUT the bytes.
async fn confirm_upload(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<ConfirmUploadRequest>,
) -> Result<Response, ApiError> {
    let storage = storage(&state)?;
    let kind = parse_kind(&payload.kind)?;

    // The storage key namespace is per organization; refuse confirmations
    // pointing outside the caller's prefix.
    if !payload
        .storage_key
        .starts_with(&tenant.ctx.organization_id.to_string())
    {
        return Err(ApiError(AppError::CrossTenant));
    }

    let metadata = storage.verify_upload(&payload.storage_key).await?;

    let repo = BrandingRepository::new((*state.db).clone());
    let asset = repo
        .create(CreateAssetInput {
            id: payload.asset_id,
            organization_id: tenant.ctx.organization_id,
            kind,
            user_id: (kind == AssetKind::ProfileImage).then_some(tenant.ctx.user_id),
            file_name: payload.filename,
            content_type: metadata
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            file_size: i64::try_from(metadata.file_size).unwrap_or(i64::MAX),
            storage_key: payload.storage_key,
            uploaded_by: tenant.ctx.user_id,
        })
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        asset_id = %asset.id,
        kind = %payload.kind,
        "Branding asset uploaded"
    );

    Ok((StatusCode::CREATED, Json(asset_body(&asset))).into_response())
}

/// GET /branding - List the organization's assets.
async fn list_assets(State(state): State<AppState>, tenant: Tenant) -> Result<Response, ApiError> {
    let repo = BrandingRepository::new((*state.db).clone());
    let assets = repo.list(tenant.ctx.organization_id).await?;

    let assets_json: Vec<_> = assets.iter().map(asset_body).collect();

    Ok((StatusCode::OK, Json(json!({ "assets": assets_json }))).into_response())
}

/// GET /branding/{id}/download-url - Presign a download for an asset.
async fn download_url(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let storage = storage(&state)?;

    let repo = BrandingRepository::new((*state.db).clone());
    let asset = repo
        .find_by_id(tenant.ctx.organization_id, id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("Branding asset not found: {id}"))))?;

    let presigned = storage.presign_download(&asset.storage_key).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "download_url": presigned.url,
            "method": presigned.method,
            "expires_at": presigned.expires_at,
        })),
    )
        .into_response())
}

/// DELETE /branding/{id} - Delete an asset from storage and the database.
async fn delete_asset(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let storage = storage(&state)?;

    let repo = BrandingRepository::new((*state.db).clone());
    let asset = repo
        .find_by_id(tenant.ctx.organization_id, id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("Branding asset not found: {id}"))))?;

    if let Err(e) = storage.delete(&asset.storage_key).await {
        // The row stays so the delete can be retried.
        error!(error = %e, asset_id = %id, "Failed to delete asset from storage");
        return Err(ApiError::from(e));
    }

    repo.delete(tenant.ctx.organization_id, id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        asset_id = %id,
        "Branding asset deleted"
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}
