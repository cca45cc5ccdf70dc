//! Customer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::context::{MaybeTenant, Tenant};
use crate::error::ApiError;
use faktura_db::CustomerRepository;
use faktura_db::entities::customers;
use faktura_db::repositories::customer::{CreateCustomerInput, UpdateCustomerInput};
use faktura_shared::types::{PageRequest, PageResponse};

/// Creates the customers router (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer))
        .route("/customers", get(list_customers))
        .route("/customers/{id}", get(get_customer))
        .route("/customers/{id}", patch(update_customer))
        .route("/customers/{id}", delete(delete_customer))
}

/// Request body for creating a customer.
#[derive(Debug, Deserialize)]
struct CreateCustomerRequest {
    name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

/// Request body for updating a customer.
#[derive(Debug, Deserialize)]
struct UpdateCustomerRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

fn customer_body(customer: &customers::Model) -> serde_json::Value {
    json!({
        "id": customer.id,
        "name": customer.name,
        "email": customer.email,
        "phone": customer.phone,
        "address": customer.address,
        "created_by": customer.created_by,
        "created_at": customer.created_at,
        "updated_at": customer.updated_at,
    })
}

/// POST /customers - Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<Response, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());

    let customer = repo
        .create(
            &tenant.ctx,
            CreateCustomerInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            },
        )
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        customer_id = %customer.id,
        "Customer created"
    );

    Ok((StatusCode::CREATED, Json(customer_body(&customer))).into_response())
}

/// GET /customers - List customers, paginated.
///
/// Anonymous or unprovisioned callers see an empty listing.
async fn list_customers(
    State(state): State<AppState>,
    tenant: MaybeTenant,
    Query(page): Query<PageRequest>,
) -> Result<Response, ApiError> {
    let Some(tenant) = tenant.0 else {
        let empty: PageResponse<serde_json::Value> =
            PageResponse::new(vec![], page.page, page.per_page, 0);
        return Ok((StatusCode::OK, Json(empty)).into_response());
    };

    let repo = CustomerRepository::new((*state.db).clone());
    let (customers, total) = repo.list(tenant.ctx.organization_id, &page).await?;

    let data: Vec<_> = customers.iter().map(customer_body).collect();
    let response = PageResponse::new(data, page.page, page.per_page, total);

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// GET /customers/{id} - Get a customer.
async fn get_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    let customer = repo.get(&tenant.ctx, id).await?;

    Ok((StatusCode::OK, Json(customer_body(&customer))).into_response())
}

/// PATCH /customers/{id} - Update a customer.
async fn update_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Response, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());

    let customer = repo
        .update(
            &tenant.ctx,
            id,
            UpdateCustomerInput {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            },
        )
        .await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        customer_id = %customer.id,
        "Customer updated"
    );

    Ok((StatusCode::OK, Json(customer_body(&customer))).into_response())
}

/// DELETE /customers/{id} - Delete a customer with no documents.
async fn delete_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = CustomerRepository::new((*state.db).clone());
    repo.delete(&tenant.ctx, id).await?;

    info!(
        org_id = %tenant.ctx.organization_id,
        customer_id = %id,
        "Customer deleted"
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}
