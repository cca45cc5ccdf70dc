//! Authentication and organization request/response payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::email::SmtpSettings;

/// Token pair returned after successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
    /// User full name.
    pub full_name: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// The user's organization, if provisioned.
    pub organization: Option<MembershipInfo>,
}

/// Organization membership info for a user.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipInfo {
    /// Organization ID.
    pub id: Uuid,
    /// Organization name.
    pub name: String,
    /// Organization slug.
    pub slug: String,
    /// User's role in this organization.
    pub role: String,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token to invalidate.
    pub refresh_token: String,
}

/// Create organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    pub name: String,
    /// Organization slug (URL-friendly).
    pub slug: String,
    /// Currency code used on documents (ISO 4217).
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "IDR".to_string()
}

/// Update organization request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrganizationRequest {
    /// Organization name (optional).
    pub name: Option<String>,
    /// Currency code (optional, ISO 4217).
    pub currency: Option<String>,
    /// Invoice number prefix override (optional).
    pub invoice_prefix: Option<String>,
    /// Purchase order number prefix override (optional).
    pub purchase_order_prefix: Option<String>,
    /// Receipt number prefix override (optional).
    pub receipt_prefix: Option<String>,
    /// Per-organization SMTP settings (optional).
    pub smtp: Option<SmtpSettings>,
}

/// Update organization member request.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRequest {
    /// New role for the member.
    pub role: String,
}

/// Invite member request.
#[derive(Debug, Clone, Deserialize)]
pub struct InviteMemberRequest {
    /// Email address to invite.
    pub email: String,
    /// Role to grant on acceptance.
    pub role: String,
}

/// Accept invitation request.
#[derive(Debug, Clone, Deserialize)]
pub struct AcceptInvitationRequest {
    /// The invitation token.
    pub token: String,
}
