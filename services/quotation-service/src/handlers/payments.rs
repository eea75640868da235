use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppState;
use crate::domain::payment::RecordPaymentRequest;
use crate::domain::quotation::BalanceSummary;
use crate::error::AppError;
use crate::middleware::auth::AuthAdmin;

/// Catat pembayaran untuk quotation
#[utoipa::path(
    post,
    path = "/api/quotations/{id}/payments",
    tag = "Payments",
    summary = "Record payment",
    description = "Amount must be greater than 0 and not exceed the remaining balance. Payment method and payment date are required.",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded with updated balance", body = serde_json::Value),
        (status = 400, description = "Invalid amount, method or date"),
        (status = 404, description = "Quotation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let recorded = state.payments.record_payment(quotation_id, request).await?;

    tracing::debug!(
        "Payment {} recorded by admin {}",
        recorded.payment.id,
        admin.email
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Pembayaran berhasil dicatat",
            "data": recorded
        })),
    ))
}

/// List pembayaran quotation, terbaru dulu
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/payments",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Payments for quotation", body = serde_json::Value),
        (status = 404, description = "Quotation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let payments = state.payments.list_payments(quotation_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": payments
    })))
}

/// Sisa tagihan quotation
#[utoipa::path(
    get,
    path = "/api/quotations/{id}/balance",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Balance summary", body = BalanceSummary),
        (status = 404, description = "Quotation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_balance(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let balance = state.payments.balance(quotation_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": balance
    })))
}
