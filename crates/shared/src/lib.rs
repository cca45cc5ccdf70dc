//! Shared types, errors, and configuration for Faktura.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Auth request/response payloads
//! - JWT token service
//! - Outbound email service
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use email::{EmailService, OutgoingEmail, PdfAttachment, SmtpSettings};
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
