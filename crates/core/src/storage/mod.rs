//! Object storage for branding assets using Apache OpenDAL.
//!
//! Vendor-agnostic storage for organization logos, signatures, stamps, and
//! user profile images:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3
//! - Azure Blob Storage
//! - Local filesystem (development only)
//!
//! The service only moves opaque bytes; it never inspects file content.

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{AssetKind, AssetMetadata, BrandingUpload, PresignedUrl, StorageService};
