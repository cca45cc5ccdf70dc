//! Document routes: invoices, purchase orders, and receipts.
//!
//! The three families share one set of handlers parameterized by
//! [`DocumentKind`]; each family gets its own route tree so the API surface
//! stays `/invoices`, `/purchase-orders`, `/receipts`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use base64::Engine;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::context::{MaybeTenant, Tenant};
use crate::error::ApiError;
use faktura_core::document::{DocumentKind, DocumentStatus, LineItem};
use faktura_db::entities::documents;
use faktura_db::repositories::document::{
    CreateDocumentInput, DocumentFilter, UpdateDocumentInput,
};
use faktura_db::{CounterRepository, DocumentRepository, EmailLogRepository};
use faktura_shared::types::{PageRequest, PageResponse};
use faktura_shared::{AppError, OutgoingEmail, PdfAttachment, SmtpSettings};

/// Creates the documents router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/invoices", kind_routes(DocumentKind::Invoice))
        .nest("/purchase-orders", kind_routes(DocumentKind::PurchaseOrder))
        .nest("/receipts", kind_routes(DocumentKind::Receipt))
        .route("/documents/overdue-sweep", post(manual_sweep))
}

/// The shared route tree for one document family.
fn kind_routes(kind: DocumentKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(move |s, t, j| create_document(kind, s, t, j))
                .get(move |s, t, q| list_documents(kind, s, t, q)),
        )
        .route(
            "/numbering/next",
            get(move |s, t| peek_next_number(kind, s, t)),
        )
        .route(
            "/{id}",
            get(move |s, t, p| get_document(kind, s, t, p))
                .patch(move |s, t, p, j| update_document(kind, s, t, p, j))
                .delete(move |s, t, p| soft_delete_document(kind, s, t, p)),
        )
        .route(
            "/{id}/status",
            patch(move |s, t, p, j| set_document_status(kind, s, t, p, j)),
        )
        .route(
            "/{id}/restore",
            post(move |s, t, p| restore_document(kind, s, t, p)),
        )
        .route(
            "/{id}/purge",
            delete(move |s, t, p| purge_document(kind, s, t, p)),
        )
        .route(
            "/{id}/email",
            post(move |s, t, p, j| email_document(kind, s, t, p, j)),
        )
        .route(
            "/{id}/emails",
            get(move |s, t, p| list_document_emails(kind, s, t, p)),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
struct CreateDocumentRequest {
    customer_id: Uuid,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    line_items: Vec<LineItem>,
    tax_rate: Option<Decimal>,
    notes: Option<String>,
}

/// Request body for updating a document.
#[derive(Debug, Deserialize)]
struct UpdateDocumentRequest {
    customer_id: Option<Uuid>,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    line_items: Option<Vec<LineItem>>,
    tax_rate: Option<Decimal>,
    notes: Option<String>,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: String,
}

/// Query parameters for document listings.
#[derive(Debug, Deserialize)]
struct ListDocumentsParams {
    status: Option<String>,
    customer_id: Option<Uuid>,
    #[serde(default)]
    include_deleted: bool,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// Request body for emailing a document.
#[derive(Debug, Deserialize)]
struct EmailDocumentRequest {
    to: String,
    subject: String,
    html: String,
    /// Client-rendered PDF, base64-encoded.
    pdf_base64: Option<String>,
    /// Attachment filename; defaults to `{number}.pdf`.
    filename: Option<String>,
}

fn document_body(doc: &documents::Model) -> serde_json::Value {
    json!({
        "id": doc.id,
        "number": doc.number,
        "customer_id": doc.customer_id,
        "status": doc.status,
        "issue_date": doc.issue_date,
        "due_date": doc.due_date,
        "line_items": doc.line_items,
        "subtotal": doc.subtotal,
        "tax_rate": doc.tax_rate,
        "tax": doc.tax,
        "total": doc.total,
        "notes": doc.notes,
        "created_by": doc.created_by,
        "created_at": doc.created_at,
        "updated_at": doc.updated_at,
        "deleted_at": doc.deleted_at,
    })
}

fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest {
        page: page.unwrap_or(default.page),
        per_page: per_page.unwrap_or(default.per_page),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /{kind} - Create a document; its number is allocated atomically with
/// the insert.
async fn create_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());

    let document = repo
        .create(
            &tenant.ctx,
            CreateDocumentInput {
                kind,
                customer_id: payload.customer_id,
                issue_date: payload.issue_date,
                due_date: payload.due_date,
                line_items: payload.line_items,
                tax_rate: payload.tax_rate,
                notes: payload.notes,
            },
        )
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %document.id,
        number = %document.number,
        kind = kind.as_str(),
        "Document created"
    );

    Ok((StatusCode::CREATED, Json(document_body(&document))).into_response())
}

/// GET /{kind} - List documents, paginated, soft-deleted rows excluded by
/// default. Anonymous or unprovisioned callers see an empty listing.
async fn list_documents(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: MaybeTenant,
    Query(params): Query<ListDocumentsParams>,
) -> Result<Response, ApiError> {
    let page = page_request(params.page, params.per_page);

    let Some(tenant) = tenant.0 else {
        let empty: PageResponse<serde_json::Value> =
            PageResponse::new(vec![], page.page, page.per_page, 0);
        return Ok((StatusCode::OK, Json(empty)).into_response());
    };

    let status = params
        .status
        .as_deref()
        .map(|s| {
            DocumentStatus::parse(s).ok_or_else(|| {
                ApiError(AppError::Validation(format!("Invalid status: {s}")))
            })
        })
        .transpose()?;

    let filter = DocumentFilter {
        status,
        customer_id: params.customer_id,
        include_deleted: params.include_deleted,
    };

    let repo = DocumentRepository::new((*state.db).clone());
    let (docs, total) = repo
        .list(tenant.ctx.organization_id, kind, &filter, &page)
        .await?;

    let data: Vec<_> = docs.iter().map(document_body).collect();
    let response = PageResponse::new(data, page.page, page.per_page, total);

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// GET /{kind}/numbering/next - Preview the next document number without
/// allocating it.
async fn peek_next_number(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<Response, ApiError> {
    let counters = CounterRepository::new((*state.db).clone());
    let next = counters.peek_next(tenant.ctx.organization_id, kind).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "number": next.number,
            "sequence": next.sequence,
        })),
    )
        .into_response())
}

/// GET /{kind}/{id} - Get one document.
async fn get_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.get(&tenant.ctx, kind, id).await?;

    Ok((StatusCode::OK, Json(document_body(&document))).into_response())
}

/// PATCH /{kind}/{id} - Update a document's content fields.
async fn update_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());

    let document = repo
        .update(
            &tenant.ctx,
            kind,
            id,
            UpdateDocumentInput {
                customer_id: payload.customer_id,
                issue_date: payload.issue_date,
                due_date: payload.due_date,
                line_items: payload.line_items,
                tax_rate: payload.tax_rate,
                notes: payload.notes,
            },
        )
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %document.id,
        "Document updated"
    );

    Ok((StatusCode::OK, Json(document_body(&document))).into_response())
}

/// PATCH /{kind}/{id}/status - Change a document's status. `overdue` is
/// reserved for the sweep.
async fn set_document_status(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Response, ApiError> {
    let status = DocumentStatus::parse(&payload.status).ok_or_else(|| {
        ApiError(AppError::Validation(format!(
            "Invalid status: {}",
            payload.status
        )))
    })?;

    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.set_status(&tenant.ctx, kind, id, status).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %document.id,
        status = status.as_str(),
        "Document status changed"
    );

    Ok((StatusCode::OK, Json(document_body(&document))).into_response())
}

/// DELETE /{kind}/{id} - Soft-delete a document.
async fn soft_delete_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.soft_delete(&tenant.ctx, kind, id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %document.id,
        "Document soft-deleted"
    );

    Ok((StatusCode::OK, Json(document_body(&document))).into_response())
}

/// POST /{kind}/{id}/restore - Restore a soft-deleted document.
async fn restore_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.restore(&tenant.ctx, kind, id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %document.id,
        "Document restored"
    );

    Ok((StatusCode::OK, Json(document_body(&document))).into_response())
}

/// DELETE /{kind}/{id}/purge - Permanently delete a soft-deleted document.
async fn purge_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    repo.purge(&tenant.ctx, kind, id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        document_id = %id,
        "Document purged"
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// POST /{kind}/{id}/email - Email a document, logging the attempt.
async fn email_document(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(payload): Json<EmailDocumentRequest>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.get(&tenant.ctx, kind, id).await?;

    let attachment = payload
        .pdf_base64
        .as_deref()
        .map(|encoded| {
            let content = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|_| {
                    ApiError(AppError::Validation(
                        "pdf_base64 is not valid base64".to_string(),
                    ))
                })?;
            Ok::<_, ApiError>(PdfAttachment {
                filename: payload
                    .filename
                    .clone()
                    .unwrap_or_else(|| format!("{}.pdf", document.number)),
                content,
            })
        })
        .transpose()?;

    let logs = EmailLogRepository::new((*state.db).clone());
    let log = logs
        .create_pending(
            tenant.ctx.organization_id,
            kind,
            document.id,
            &payload.to,
            &payload.subject,
        )
        .await?;

    // The organization's SMTP settings win; the global relay is the
    // fallback.
    let org_smtp: Option<SmtpSettings> = tenant
        .organization
        .smtp_settings
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok());

    let email = OutgoingEmail {
        to: payload.to.clone(),
        subject: payload.subject.clone(),
        html_body: payload.html,
        attachment,
    };

    match state.email_service.send(org_smtp.as_ref(), email).await {
        Ok(()) => {
            let log = logs.mark_sent(log).await?;

            info!(
                org_id = %tenant.ctx.organization_id,
                document_id = %document.id,
                recipient = %payload.to,
                "Document emailed"
            );

            Ok((
                StatusCode::OK,
                Json(json!({
                    "log_id": log.id,
                    "status": log.status,
                    "recipient_email": log.recipient_email,
                })),
            )
                .into_response())
        }
        Err(e) => {
            if let Err(log_err) = logs.mark_failed(log, &e.to_string()).await {
                error!(error = %log_err, "Failed to record email failure");
            }
            Err(ApiError::from(e))
        }
    }
}

/// GET /{kind}/{id}/emails - List send attempts for a document.
async fn list_document_emails(
    kind: DocumentKind,
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.get(&tenant.ctx, kind, id).await?;

    let logs = EmailLogRepository::new((*state.db).clone());
    let entries = logs
        .list_for_document(tenant.ctx.organization_id, document.id)
        .await?;

    let entries_json: Vec<_> = entries
        .into_iter()
        .map(|log| {
            json!({
                "id": log.id,
                "recipient_email": log.recipient_email,
                "subject": log.subject,
                "status": log.status,
                "error_message": log.error_message,
                "created_at": log.created_at,
            })
        })
        .collect();

    Ok((StatusCode::OK, Json(json!({ "emails": entries_json }))).into_response())
}

/// POST /documents/overdue-sweep - Tenant-scoped manual overdue refresh.
async fn manual_sweep(State(state): State<AppState>, tenant: Tenant) -> Result<Response, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let transitioned = repo
        .sweep_overdue(Some(tenant.ctx.organization_id))
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        transitioned,
        "Manual overdue sweep"
    );

    Ok((StatusCode::OK, Json(json!({ "transitioned": transitioned }))).into_response())
}
