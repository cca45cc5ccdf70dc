//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session identity on the request.
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Authenticated but not a member of any organization.
    #[error("User is not a member of any organization")]
    NoOrganization,

    /// Role or ownership check failed.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Target row belongs to another organization.
    #[error("Resource belongs to another organization")]
    CrossTenant,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate entry or conflicting state.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Restore invoked on a document that is not deleted.
    #[error("Document is not deleted")]
    NotDeleted,

    /// External service error (SMTP, object storage).
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated(_) => 401,
            Self::NoOrganization | Self::Forbidden(_) | Self::CrossTenant => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::AlreadyExists(_) | Self::NotDeleted => 409,
            Self::ExternalService(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::NoOrganization => "NO_ORGANIZATION",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::CrossTenant => "CROSS_TENANT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::NotDeleted => "NOT_DELETED",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Unauthenticated(String::new()).status_code(), 401);
        assert_eq!(AppError::NoOrganization.status_code(), 403);
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::CrossTenant.status_code(), 403);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::AlreadyExists(String::new()).status_code(), 409);
        assert_eq!(AppError::NotDeleted.status_code(), 409);
        assert_eq!(AppError::ExternalService(String::new()).status_code(), 500);
        assert_eq!(AppError::Database(String::new()).status_code(), 500);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Unauthenticated(String::new()).error_code(),
            "UNAUTHENTICATED"
        );
        assert_eq!(AppError::NoOrganization.error_code(), "NO_ORGANIZATION");
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(AppError::CrossTenant.error_code(), "CROSS_TENANT");
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::AlreadyExists(String::new()).error_code(),
            "ALREADY_EXISTS"
        );
        assert_eq!(AppError::NotDeleted.error_code(), "NOT_DELETED");
        assert_eq!(
            AppError::ExternalService(String::new()).error_code(),
            "EXTERNAL_SERVICE_ERROR"
        );
        assert_eq!(
            AppError::Database(String::new()).error_code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthenticated("msg".into()).to_string(),
            "Authentication required: msg"
        );
        assert_eq!(
            AppError::NoOrganization.to_string(),
            "User is not a member of any organization"
        );
        assert_eq!(
            AppError::CrossTenant.to_string(),
            "Resource belongs to another organization"
        );
        assert_eq!(AppError::NotDeleted.to_string(), "Document is not deleted");
        assert_eq!(
            AppError::AlreadyExists("msg".into()).to_string(),
            "Already exists: msg"
        );
    }
}
