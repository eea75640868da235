// Repository layer: satu trait per entity, implementasi Postgres di file masing-masing

pub mod history_repo;
pub mod order_repo;
pub mod payment_repo;
pub mod quotation_repo;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    history::{NewHistoryEntry, QuotationHistory},
    order::{CreateOrderRequest, CustomOrder, OrderStatus},
    payment::{NewPayment, Payment},
    quotation::{Quotation, QuotationAmendment, QuotationDraft},
};
use crate::error::AppError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, request: CreateOrderRequest) -> Result<CustomOrder, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomOrder>, AppError>;

    /// List order terbaru dulu, plus total count untuk pagination
    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CustomOrder>, i64), AppError>;

    /// Update status + tulis history dalam satu transaksi.
    /// `None` berarti status saat ini bukan lagi `from` atau `expected_updated_at`
    /// sudah tidak cocok (data berubah).
    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        status: OrderStatus,
        expected_updated_at: Option<DateTime<Utc>>,
        history: NewHistoryEntry,
    ) -> Result<Option<CustomOrder>, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuotationStore: Send + Sync {
    /// Simpan quotation, set order ke `quoted` beserta field quote_*, dan tulis history
    async fn create_for_order(&self, draft: QuotationDraft) -> Result<Quotation, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, AppError>;

    async fn find_by_order_id(&self, order_id: Uuid) -> Result<Option<Quotation>, AppError>;

    /// `None` berarti `expected_updated_at` sudah tidak cocok.
    /// Order yang sudah terminal ditolak dengan `ConflictError`.
    async fn amend(
        &self,
        id: Uuid,
        amendment: QuotationAmendment,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Quotation>, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Insert payment hanya jika amount masih dalam sisa tagihan saat row quotation di-lock
    async fn insert_within_balance(&self, payment: NewPayment) -> Result<Payment, AppError>;

    async fn list_by_quotation(&self, quotation_id: Uuid) -> Result<Vec<Payment>, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: NewHistoryEntry) -> Result<QuotationHistory, AppError>;

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<QuotationHistory>, AppError>;
}
