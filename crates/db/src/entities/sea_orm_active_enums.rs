//! Database enum definitions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member's role within an organization.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Organization owner.
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Administrator.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
}

/// Document family discriminator.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Customer invoice.
    #[sea_orm(string_value = "invoice")]
    Invoice,
    /// Purchase order.
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    /// Payment receipt.
    #[sea_orm(string_value = "receipt")]
    Receipt,
}

/// Document status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_status")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Not yet sent.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Sent, awaiting payment.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Payment received.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past due date without payment.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Delivery status of an outbound email.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "email_status")]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    /// Logged, not yet handed to the relay.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the relay.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// The relay rejected the message.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Branding asset kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "asset_kind")]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// Organization logo.
    #[sea_orm(string_value = "logo")]
    Logo,
    /// Authorized signature image.
    #[sea_orm(string_value = "signature")]
    Signature,
    /// Company stamp image.
    #[sea_orm(string_value = "stamp")]
    Stamp,
    /// A user's profile image.
    #[sea_orm(string_value = "profile_image")]
    ProfileImage,
}
