//! `SeaORM` entity definitions.

pub mod branding_assets;
pub mod customers;
pub mod document_counters;
pub mod documents;
pub mod email_logs;
pub mod invitations;
pub mod organization_members;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod users;
