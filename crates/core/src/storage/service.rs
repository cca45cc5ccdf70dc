//! Storage service implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use opendal::{ErrorKind, Operator, services};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// The kinds of branding assets an organization (or user) stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Organization logo.
    Logo,
    /// Authorized signature image.
    Signature,
    /// Company stamp image.
    Stamp,
    /// A user's profile image.
    ProfileImage,
}

impl AssetKind {
    /// Parses an asset kind from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "logo" => Some(Self::Logo),
            "signature" => Some(Self::Signature),
            "stamp" => Some(Self::Stamp),
            "profile_image" => Some(Self::ProfileImage),
            _ => None,
        }
    }

    /// Returns the wire representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Signature => "signature",
            Self::Stamp => "stamp",
            Self::ProfileImage => "profile_image",
        }
    }
}

/// Presigned URL for upload or download.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// HTTP method to use (PUT for upload, GET for download).
    pub method: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
    /// Required headers for the request.
    pub headers: HashMap<String, String>,
}

/// Request to upload a branding asset.
#[derive(Debug, Clone)]
pub struct BrandingUpload {
    /// Organization ID.
    pub organization_id: Uuid,
    /// Asset kind.
    pub kind: AssetKind,
    /// Asset ID.
    pub asset_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Content type (MIME type).
    pub content_type: String,
    /// File size in bytes.
    pub file_size: u64,
}

/// Metadata about an uploaded asset.
#[derive(Debug, Clone)]
pub struct AssetMetadata {
    /// Storage key.
    pub storage_key: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Content type.
    pub content_type: Option<String>,
}

/// Storage service for branding assets.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
        }
    }

    /// Validate an upload request against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Generate the storage key for an asset.
    ///
    /// Format: `{org_id}/branding/{kind}/{asset_id}/{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(req: &BrandingUpload) -> String {
        let sanitized_filename = sanitize_filename(&req.filename);

        format!(
            "{}/branding/{}/{}/{}",
            req.organization_id,
            req.kind.as_str(),
            req.asset_id,
            sanitized_filename
        )
    }

    /// Generate presigned URL for upload.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_upload(&self, req: &BrandingUpload) -> Result<PresignedUrl, StorageError> {
        self.validate_upload(&req.content_type, req.file_size)?;

        let key = Self::generate_storage_key(req);
        let ttl = Duration::from_secs(self.config.presign_upload_ttl_secs);

        let presigned = self
            .operator
            .presign_write(&key, ttl)
            .await
            .map_err(StorageError::from)?;

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), req.content_type.clone());

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_upload_ttl_secs).unwrap_or(i64::MAX),
                ),
            headers,
        })
    }

    /// Generate presigned URL for download.
    ///
    /// # Errors
    ///
    /// Returns an error if presigning is not supported or fails.
    pub async fn presign_download(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        let ttl = Duration::from_secs(self.config.presign_download_ttl_secs);

        let presigned = self
            .operator
            .presign_read(key, ttl)
            .await
            .map_err(StorageError::from)?;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_download_ttl_secs).unwrap_or(i64::MAX),
                ),
            headers: HashMap::new(),
        })
    }

    /// Verify that a file exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be accessed.
    pub async fn verify_upload(&self, key: &str) -> Result<AssetMetadata, StorageError> {
        let meta = self.operator.stat(key).await.map_err(StorageError::from)?;

        Ok(AssetMetadata {
            storage_key: key.to_string(),
            file_size: meta.content_length(),
            content_type: meta.content_type().map(String::from),
        })
    }

    /// Delete a file from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if a file exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_kind_round_trip() {
        for kind in [
            AssetKind::Logo,
            AssetKind::Signature,
            AssetKind::Stamp,
            AssetKind::ProfileImage,
        ] {
            assert_eq!(AssetKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AssetKind::parse("banner"), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("logo.png"), "logo.png");
        assert_eq!(sanitize_filename("my logo (1).png"), "my_logo__1_.png");
        assert_eq!(sanitize_filename("test@#$%.jpg"), "test____.jpg");
    }

    #[test]
    fn test_generate_storage_key() {
        let org_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let asset_id = Uuid::parse_str("6ba7b811-9dad-11d1-80b4-00c04fd430c8").expect("valid uuid");

        let req = BrandingUpload {
            organization_id: org_id,
            kind: AssetKind::Logo,
            asset_id,
            filename: "logo.png".to_string(),
            content_type: "image/png".to_string(),
            file_size: 1024,
        };

        let key = StorageService::generate_storage_key(&req);
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], org_id.to_string());
        assert_eq!(parts[1], "branding");
        assert_eq!(parts[2], "logo");
        assert_eq!(parts[3], asset_id.to_string());
        assert_eq!(parts[4], "logo.png");
    }

    #[test]
    fn test_validate_upload_size() {
        let config =
            StorageConfig::new(StorageProvider::local_fs("./test")).with_max_file_size(1024);
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_upload("image/png", 512).is_ok());

        let err = service.validate_upload("image/png", 2048).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_upload_mime_type() {
        let config = StorageConfig::new(StorageProvider::local_fs("./test"));
        let service = StorageService::from_config(config).expect("should create service");

        assert!(service.validate_upload("image/png", 1024).is_ok());
        assert!(service.validate_upload("image/jpeg", 1024).is_ok());

        let err = service
            .validate_upload("application/x-executable", 1024)
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // For any file upload request, only files with MIME types in the allowed
    // list are accepted.
    proptest! {
        #[test]
        fn prop_mime_type_validation(mime_type in "[a-z]+/[a-z0-9-]+") {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"));
            let service = StorageService::from_config(config.clone())
                .expect("should create service");

            let result = service.validate_upload(&mime_type, 1024);
            let is_allowed = config.is_mime_type_allowed(&mime_type);

            if is_allowed {
                prop_assert!(result.is_ok(), "Expected Ok for allowed MIME type");
            } else {
                let is_invalid_mime = matches!(result, Err(StorageError::InvalidMimeType { .. }));
                prop_assert!(is_invalid_mime, "Expected InvalidMimeType error");
            }
        }
    }

    // For any upload exceeding the configured size limit, the request is
    // rejected.
    proptest! {
        #[test]
        fn prop_file_size_validation(
            max_size in 1024u64..10_000_000,
            file_size in 0u64..20_000_000,
        ) {
            let config = StorageConfig::new(StorageProvider::local_fs("./test"))
                .with_max_file_size(max_size);
            let service = StorageService::from_config(config)
                .expect("should create service");

            let result = service.validate_upload("image/png", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok(), "Expected Ok for valid file size");
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large, "Expected FileTooLarge error");
            }
        }
    }

    // Sanitized filenames only ever contain safe characters.
    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }
    }

    // Storage keys always follow org/branding/kind/asset/file.
    proptest! {
        #[test]
        fn prop_storage_key_format(
            filename in "[a-zA-Z0-9_-]{1,50}\\.[a-z]{2,4}",
        ) {
            let org_id = Uuid::new_v4();
            let asset_id = Uuid::new_v4();

            let req = BrandingUpload {
                organization_id: org_id,
                kind: AssetKind::Stamp,
                asset_id,
                filename: filename.clone(),
                content_type: "image/png".to_string(),
                file_size: 1024,
            };

            let key = StorageService::generate_storage_key(&req);
            let parts: Vec<&str> = key.split('/').collect();

            prop_assert_eq!(parts.len(), 5);
            prop_assert_eq!(parts[0], org_id.to_string());
            prop_assert_eq!(parts[1], "branding");
            prop_assert_eq!(parts[2], "stamp");
            prop_assert_eq!(parts[3], asset_id.to_string());
        }
    }
}
