//! Conversions between database enums and domain enums.

use faktura_core::document::{DocumentKind, DocumentStatus};
use faktura_core::policy::Role;
use faktura_core::storage::AssetKind;

use crate::entities::sea_orm_active_enums::{
    AssetKind as DbAssetKind, DocumentStatus as DbDocumentStatus, DocumentType, UserRole,
};

/// Convert a database role to the domain role.
#[must_use]
pub fn role_from_db(role: &UserRole) -> Role {
    match role {
        UserRole::Owner => Role::Owner,
        UserRole::Admin => Role::Admin,
        UserRole::Member => Role::Member,
    }
}

/// Convert a domain role to the database role.
#[must_use]
pub const fn role_to_db(role: Role) -> UserRole {
    match role {
        Role::Owner => UserRole::Owner,
        Role::Admin => UserRole::Admin,
        Role::Member => UserRole::Member,
    }
}

/// Convert a database document type to the domain kind.
#[must_use]
pub fn kind_from_db(doc_type: &DocumentType) -> DocumentKind {
    match doc_type {
        DocumentType::Invoice => DocumentKind::Invoice,
        DocumentType::PurchaseOrder => DocumentKind::PurchaseOrder,
        DocumentType::Receipt => DocumentKind::Receipt,
    }
}

/// Convert a domain document kind to the database type.
#[must_use]
pub const fn kind_to_db(kind: DocumentKind) -> DocumentType {
    match kind {
        DocumentKind::Invoice => DocumentType::Invoice,
        DocumentKind::PurchaseOrder => DocumentType::PurchaseOrder,
        DocumentKind::Receipt => DocumentType::Receipt,
    }
}

/// Convert a database document status to the domain status.
#[must_use]
pub fn status_from_db(status: &DbDocumentStatus) -> DocumentStatus {
    match status {
        DbDocumentStatus::Draft => DocumentStatus::Draft,
        DbDocumentStatus::Sent => DocumentStatus::Sent,
        DbDocumentStatus::Paid => DocumentStatus::Paid,
        DbDocumentStatus::Overdue => DocumentStatus::Overdue,
        DbDocumentStatus::Cancelled => DocumentStatus::Cancelled,
    }
}

/// Convert a domain document status to the database status.
#[must_use]
pub const fn status_to_db(status: DocumentStatus) -> DbDocumentStatus {
    match status {
        DocumentStatus::Draft => DbDocumentStatus::Draft,
        DocumentStatus::Sent => DbDocumentStatus::Sent,
        DocumentStatus::Paid => DbDocumentStatus::Paid,
        DocumentStatus::Overdue => DbDocumentStatus::Overdue,
        DocumentStatus::Cancelled => DbDocumentStatus::Cancelled,
    }
}

/// Convert a database asset kind to the domain kind.
#[must_use]
pub fn asset_kind_from_db(kind: &DbAssetKind) -> AssetKind {
    match kind {
        DbAssetKind::Logo => AssetKind::Logo,
        DbAssetKind::Signature => AssetKind::Signature,
        DbAssetKind::Stamp => AssetKind::Stamp,
        DbAssetKind::ProfileImage => AssetKind::ProfileImage,
    }
}

/// Convert a domain asset kind to the database kind.
#[must_use]
pub const fn asset_kind_to_db(kind: AssetKind) -> DbAssetKind {
    match kind {
        AssetKind::Logo => DbAssetKind::Logo,
        AssetKind::Signature => DbAssetKind::Signature,
        AssetKind::Stamp => DbAssetKind::Stamp,
        AssetKind::ProfileImage => DbAssetKind::ProfileImage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(role_from_db(&role_to_db(role)), role);
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            DocumentKind::Invoice,
            DocumentKind::PurchaseOrder,
            DocumentKind::Receipt,
        ] {
            assert_eq!(kind_from_db(&kind_to_db(kind)), kind);
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Draft,
            DocumentStatus::Sent,
            DocumentStatus::Paid,
            DocumentStatus::Overdue,
            DocumentStatus::Cancelled,
        ] {
            assert_eq!(status_from_db(&status_to_db(status)), status);
        }
    }

    #[test]
    fn test_asset_kind_round_trip() {
        for kind in [
            AssetKind::Logo,
            AssetKind::Signature,
            AssetKind::Stamp,
            AssetKind::ProfileImage,
        ] {
            assert_eq!(asset_kind_from_db(&asset_kind_to_db(kind)), kind);
        }
    }
}
