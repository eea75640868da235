use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::order::OrderStatus;
use crate::domain::quotation::{AmendQuotationRequest, CreateQuotationRequest, Quotation, QuotationCreated};
use crate::error::{AppError, AppResult};
use crate::repositories::{OrderStore, QuotationStore};

// Pembuatan dan amend quotation untuk custom order
#[derive(Clone)]
pub struct QuotationManager {
    orders: Arc<dyn OrderStore>,
    quotations: Arc<dyn QuotationStore>,
    validity_days: i64,
}

impl QuotationManager {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        quotations: Arc<dyn QuotationStore>,
        validity_days: i64,
    ) -> Self {
        Self {
            orders,
            quotations,
            validity_days,
        }
    }

    /// Buat quotation untuk order berstatus `new`.
    ///
    /// Input divalidasi sebelum ada read/write ke store. Reference default
    /// `Q-XXXXXXXX`, tanggal kirim default hari ini, masa berlaku default
    /// `validity_days` hari setelah tanggal kirim. Order pindah ke `quoted`
    /// dalam transaksi yang sama dengan insert quotation.
    pub async fn create_quotation(
        &self,
        order_id: Uuid,
        request: CreateQuotationRequest,
    ) -> AppResult<QuotationCreated> {
        let draft = request
            .resolve(order_id, Utc::now().date_naive(), self.validity_days)
            .map_err(AppError::validation)?;

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order tidak ditemukan"))?;

        if order.status != OrderStatus::New {
            return Err(match order.status {
                OrderStatus::Quoted => {
                    AppError::conflict("Order sudah memiliki quotation, gunakan amend untuk mengubah")
                }
                status => AppError::conflict(format!(
                    "Quotation tidak bisa dibuat untuk order berstatus {}",
                    status
                )),
            });
        }

        if self.quotations.find_by_order_id(order_id).await?.is_some() {
            return Err(AppError::conflict("Order ini sudah memiliki quotation"));
        }

        let quotation = self.quotations.create_for_order(draft).await?;

        tracing::info!(
            "Quotation {} created for order {}: total {}, valid until {}",
            quotation.bill_reference,
            order_id,
            quotation.total_amount,
            quotation.valid_until
        );

        Ok(QuotationCreated {
            quote_reference: quotation.bill_reference.clone(),
            quotation,
        })
    }

    /// Ubah amount / notes / masa berlaku quotation yang sudah ada
    pub async fn amend_quotation(
        &self,
        quotation_id: Uuid,
        request: AmendQuotationRequest,
    ) -> AppResult<Quotation> {
        let current = self.get_quotation(quotation_id).await?;

        let order = self
            .orders
            .find_by_id(current.custom_order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order tidak ditemukan"))?;

        if order.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Quotation untuk order berstatus {} tidak bisa diubah",
                order.status
            )));
        }

        let amendment = request.resolve(&current).map_err(AppError::validation)?;

        let amended = self
            .quotations
            .amend(quotation_id, amendment, request.expected_updated_at)
            .await?
            .ok_or_else(|| {
                AppError::conflict("Quotation sudah diubah oleh sesi lain, muat ulang data terlebih dahulu")
            })?;

        tracing::info!(
            "Quotation {} amended: total {}, valid until {}",
            amended.bill_reference,
            amended.total_amount,
            amended.valid_until
        );

        Ok(amended)
    }

    pub async fn get_quotation(&self, quotation_id: Uuid) -> AppResult<Quotation> {
        self.quotations
            .find_by_id(quotation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quotation tidak ditemukan"))
    }

    pub async fn find_quotation_for_order(&self, order_id: Uuid) -> AppResult<Option<Quotation>> {
        self.quotations.find_by_order_id(order_id).await
    }

    pub async fn get_quotation_for_order(&self, order_id: Uuid) -> AppResult<Quotation> {
        self.find_quotation_for_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order ini belum memiliki quotation"))
    }
}
