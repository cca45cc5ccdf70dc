//! API error responses.
//!
//! Every repository error converges on the `AppError` taxonomy, which maps
//! to a `{error, message}` JSON body with the matching HTTP status. Handlers
//! propagate with `?`; 5xx causes are logged here, once.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use faktura_core::auth::PasswordError;
use faktura_core::policy::PolicyViolation;
use faktura_core::storage::StorageError;
use faktura_db::repositories::{
    BrandingError, CustomerError, DocumentError, InvitationError, OrganizationError,
};
use faktura_shared::AppError;
use faktura_shared::email::EmailError;

/// Wrapper turning [`AppError`] into an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(AppError::Database(err.to_string()))
    }
}

impl From<PolicyViolation> for ApiError {
    fn from(err: PolicyViolation) -> Self {
        Self(AppError::Forbidden(err.to_string()))
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self(AppError::Internal(err.to_string()))
    }
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        let app = match err {
            EmailError::InvalidAddress(_) => AppError::Validation(err.to_string()),
            _ => AppError::ExternalService(err.to_string()),
        };
        Self(app)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::FileTooLarge { .. } | StorageError::InvalidMimeType { .. } => {
                AppError::Validation(err.to_string())
            }
            StorageError::NotFound { .. } => AppError::NotFound(err.to_string()),
            _ => AppError::ExternalService(err.to_string()),
        };
        Self(app)
    }
}

impl From<OrganizationError> for ApiError {
    fn from(err: OrganizationError) -> Self {
        let app = match err {
            OrganizationError::NotFound | OrganizationError::NotMember => {
                AppError::NotFound(err.to_string())
            }
            OrganizationError::SlugExists | OrganizationError::AlreadyProvisioned => {
                AppError::AlreadyExists(err.to_string())
            }
            OrganizationError::EmptyUpdate
            | OrganizationError::InvalidName
            | OrganizationError::InvalidCurrency(_)
            | OrganizationError::InvalidPrefix(_) => AppError::Validation(err.to_string()),
            OrganizationError::Policy(p) => AppError::Forbidden(p.to_string()),
            OrganizationError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app)
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        let app = match err {
            CustomerError::NotFound(_) => AppError::NotFound(err.to_string()),
            CustomerError::CrossTenant => AppError::CrossTenant,
            CustomerError::Policy(p) => AppError::Forbidden(p.to_string()),
            CustomerError::HasDocuments => AppError::AlreadyExists(err.to_string()),
            CustomerError::Validation(_) => AppError::Validation(err.to_string()),
            CustomerError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app)
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        let app = match err {
            DocumentError::NotFound(_) | DocumentError::CustomerNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            DocumentError::CrossTenant => AppError::CrossTenant,
            DocumentError::Policy(p) => AppError::Forbidden(p.to_string()),
            DocumentError::Validation(_) | DocumentError::StatusNotSettable => {
                AppError::Validation(err.to_string())
            }
            DocumentError::AlreadyDeleted => AppError::AlreadyExists(err.to_string()),
            DocumentError::NotDeleted => AppError::NotDeleted,
            DocumentError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app)
    }
}

impl From<InvitationError> for ApiError {
    fn from(err: InvitationError) -> Self {
        let app = match err {
            InvitationError::NotFound => AppError::NotFound(err.to_string()),
            InvitationError::AlreadyAccepted => AppError::AlreadyExists(err.to_string()),
            InvitationError::Expired | InvitationError::OwnerRole => {
                AppError::Validation(err.to_string())
            }
            InvitationError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app)
    }
}

impl From<BrandingError> for ApiError {
    fn from(err: BrandingError) -> Self {
        let app = match err {
            BrandingError::NotFound(_) => AppError::NotFound(err.to_string()),
            BrandingError::Database(e) => AppError::Database(e.to_string()),
        };
        Self(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_tenant_maps_to_403() {
        let err = ApiError::from(DocumentError::CrossTenant);
        assert_eq!(err.0.status_code(), 403);
        assert_eq!(err.0.error_code(), "CROSS_TENANT");
    }

    #[test]
    fn test_not_deleted_maps_to_409() {
        let err = ApiError::from(DocumentError::NotDeleted);
        assert_eq!(err.0.status_code(), 409);
        assert_eq!(err.0.error_code(), "NOT_DELETED");
    }

    #[test]
    fn test_policy_violation_maps_to_403() {
        let err = ApiError::from(PolicyViolation("nope"));
        assert_eq!(err.0.status_code(), 403);
        assert_eq!(err.0.error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_email_error_is_external_service() {
        let err = ApiError::from(EmailError::SendError("relay down".to_string()));
        assert_eq!(err.0.error_code(), "EXTERNAL_SERVICE_ERROR");
        assert_eq!(err.0.status_code(), 500);
    }
}
