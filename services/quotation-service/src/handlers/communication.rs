use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppState;
use crate::domain::history::SendReminderRequest;
use crate::error::AppError;
use crate::middleware::auth::AuthAdmin;

/// Kirim email quotation ke customer
#[utoipa::path(
    post,
    path = "/api/quotations/{id}/send",
    tag = "Communication",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    responses(
        (status = 200, description = "Quotation email sent and logged", body = serde_json::Value),
        (status = 404, description = "Quotation not found"),
        (status = 502, description = "Email provider failed, nothing logged")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_quotation(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let entry = state.notifications.send_quotation(quotation_id).await?;

    tracing::info!("Quotation {} emailed by admin {}", quotation_id, admin.email);

    Ok(Json(json!({
        "success": true,
        "message": "Email quotation berhasil dikirim",
        "data": entry
    })))
}

/// Kirim reminder pembayaran ke customer
#[utoipa::path(
    post,
    path = "/api/quotations/{id}/reminders",
    tag = "Communication",
    params(("id" = Uuid, Path, description = "Quotation ID")),
    request_body = SendReminderRequest,
    responses(
        (status = 200, description = "Reminder sent and logged", body = serde_json::Value),
        (status = 400, description = "Quotation already fully paid"),
        (status = 404, description = "Quotation not found"),
        (status = 502, description = "Email provider failed, nothing logged")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_reminder(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
    body: Option<Json<SendReminderRequest>>,
) -> Result<Json<Value>, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let entry = state.notifications.send_reminder(quotation_id, request).await?;

    tracing::info!("Reminder for quotation {} sent by admin {}", quotation_id, admin.email);

    Ok(Json(json!({
        "success": true,
        "message": "Reminder berhasil dikirim",
        "data": entry
    })))
}

/// History komunikasi dan perubahan quotation untuk order
#[utoipa::path(
    get,
    path = "/api/orders/{id}/history",
    tag = "Communication",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "History trail, newest first", body = serde_json::Value),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_history(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let history = state.notifications.list_history(order_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": history
    })))
}
