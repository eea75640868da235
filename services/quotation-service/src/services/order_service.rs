use std::sync::Arc;

use shared::utils::validation::is_valid_phone;
use uuid::Uuid;
use validator::Validate;

use crate::domain::history::{self, NewHistoryEntry};
use crate::domain::order::{
    CreateOrderRequest, CustomOrder, OrderListQuery, OrderListResponse, OrderStatus,
    UpdateOrderStatusRequest,
};
use crate::error::{AppError, AppResult};
use crate::repositories::OrderStore;

// Service untuk order intake dan perubahan status oleh admin
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self { orders }
    }

    /// Simpan order baru dari form intake dengan status `new`
    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<CustomOrder> {
        request.validate()?;

        if !is_valid_phone(&request.phone) {
            return Err(AppError::validation("Format nomor telepon tidak valid"));
        }

        let order = self.orders.insert(request).await?;

        tracing::info!(
            "Custom order created: {} ({}, qty {})",
            order.id,
            order.company_name,
            order.quantity
        );

        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<CustomOrder> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Order tidak ditemukan"))
    }

    pub async fn list_orders(&self, query: &OrderListQuery) -> AppResult<OrderListResponse> {
        let (page, limit) = query.pagination();
        let offset = (page - 1) as i64 * limit as i64;

        let (data, total) = self.orders.list(query.status, limit as i64, offset).await?;

        Ok(OrderListResponse {
            data,
            total,
            page,
            limit,
        })
    }

    /// Ubah status order oleh admin; `quoted` hanya lewat pembuatan quotation
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> AppResult<CustomOrder> {
        let order = self.get_order(id).await?;

        if request.status == OrderStatus::Quoted {
            return Err(AppError::validation(
                "Status quoted hanya bisa diset lewat pembuatan quotation",
            ));
        }

        if !order.status.can_transition_to(request.status) {
            return Err(AppError::validation(format!(
                "Transisi status dari {} ke {} tidak diperbolehkan",
                order.status, request.status
            )));
        }

        let mut notes = format!("{} -> {}", order.status, request.status);
        if let Some(extra) = request.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            notes = format!("{}: {}", notes, extra);
        }
        let entry = NewHistoryEntry::new(id, None, history::STATUS_CHANGED).with_notes(notes);

        let updated = self
            .orders
            .update_status(id, order.status, request.status, request.expected_updated_at, entry)
            .await?
            .ok_or_else(|| {
                AppError::conflict("Order sudah diubah oleh sesi lain, muat ulang data terlebih dahulu")
            })?;

        tracing::info!("Order {} status changed: {} -> {}", id, order.status, updated.status);

        Ok(updated)
    }
}
