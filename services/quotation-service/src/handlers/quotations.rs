use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppState;
use crate::domain::quotation::{AmendQuotationRequest, CreateQuotationRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthAdmin;

/// Buat quotation untuk order berstatus new
#[utoipa::path(
    post,
    path = "/api/orders/{id}/quotation",
    tag = "Quotations",
    summary = "Create quotation",
    description = "Attach a quotation to a new order. Empty reference defaults to Q- plus the first 8 characters of the order ID, empty valid-until defaults to sent date + validity days. Order status moves to quoted.",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = CreateQuotationRequest,
    responses(
        (status = 201, description = "Quotation created", body = serde_json::Value),
        (status = 400, description = "Invalid amount or dates"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already quoted or not new")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_quotation(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = state.quotations.create_quotation(order_id, request).await?;

    tracing::debug!(
        "Quotation {} created by admin {}",
        created.quote_reference,
        admin.email
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Quotation berhasil dibuat",
            "data": created
        })),
    ))
}

/// Ambil quotation milik order
#[utoipa::path(
    get,
    path = "/api/orders/{id}/quotation",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Quotation for order", body = serde_json::Value),
        (status = 404, description = "Order has no quotation")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order_quotation(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let quotation = state.quotations.get_quotation_for_order(order_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": quotation
    })))
}

/// Amend amount, notes atau masa berlaku quotation
#[utoipa::path(
    patch,
    path = "/api/quotations/{id}",
    tag = "Quotations",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    request_body = AmendQuotationRequest,
    responses(
        (status = 200, description = "Quotation amended", body = serde_json::Value),
        (status = 400, description = "Invalid amendment"),
        (status = 404, description = "Quotation not found"),
        (status = 409, description = "Quotation changed by another session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn amend_quotation(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
    Json(request): Json<AmendQuotationRequest>,
) -> Result<Json<Value>, AppError> {
    let quotation = state.quotations.amend_quotation(quotation_id, request).await?;

    tracing::debug!("Quotation {} amended by admin {}", quotation.id, admin.email);

    Ok(Json(json!({
        "success": true,
        "message": "Quotation berhasil diubah",
        "data": quotation
    })))
}
