use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppState;
use crate::domain::history::QuotationHistory;
use crate::domain::order::{CreateOrderRequest, CustomOrder, OrderListQuery, UpdateOrderStatusRequest};
use crate::domain::payment::Payment;
use crate::domain::quotation::{BalanceSummary, Quotation};
use crate::error::AppError;
use crate::middleware::auth::AuthAdmin;

// Semua data halaman detail order dalam satu response (tab Details, Quotation, Payments, Communication)
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderOverview {
    pub order: CustomOrder,
    pub quotation: Option<Quotation>,
    pub balance: Option<BalanceSummary>,
    pub payments: Vec<Payment>,
    pub history: Vec<QuotationHistory>,
}

/// Create custom order baru
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = serde_json::Value),
        (status = 400, description = "Invalid order data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let order = state.orders.create_order(request).await?;

    tracing::debug!("Order {} created by admin {}", order.id, admin.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order berhasil dibuat",
            "data": order
        })),
    ))
}

/// List custom order, terbaru dulu
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Paged order list", body = serde_json::Value),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Value>, AppError> {
    let page = state.orders.list_orders(&query).await?;

    Ok(Json(json!({
        "success": true,
        "data": page
    })))
}

/// Detail order beserta quotation, saldo, pembayaran dan history
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order overview", body = OrderOverview),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order_overview(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let order = state.orders.get_order(order_id).await?;
    let quotation = state.quotations.find_quotation_for_order(order_id).await?;

    let payments = match &quotation {
        Some(quotation) => state.payments.list_payments(quotation.id).await?,
        None => Vec::new(),
    };
    let history = state.notifications.list_history(order_id).await?;

    let overview = OrderOverview {
        balance: quotation.as_ref().map(Quotation::summary),
        order,
        quotation,
        payments,
        history,
    };

    Ok(Json(json!({
        "success": true,
        "data": overview
    })))
}

/// Ubah status order (in_production, completed, cancelled)
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = serde_json::Value),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order changed by another session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_order_status(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let order = state.orders.update_status(order_id, request).await?;

    tracing::info!("Order {} moved to {} by admin {}", order.id, order.status, admin.email);

    Ok(Json(json!({
        "success": true,
        "message": "Status order berhasil diubah",
        "data": order
    })))
}
