use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::payment::{Payment, PaymentRecorded, RecordPaymentRequest};
use crate::domain::quotation::{compute_balance, BalanceSummary, Quotation};
use crate::error::{AppError, AppResult};
use crate::repositories::{PaymentStore, QuotationStore};

// Ledger pembayaran per quotation
#[derive(Clone)]
pub struct PaymentLedger {
    quotations: Arc<dyn QuotationStore>,
    payments: Arc<dyn PaymentStore>,
}

impl PaymentLedger {
    pub fn new(quotations: Arc<dyn QuotationStore>, payments: Arc<dyn PaymentStore>) -> Self {
        Self {
            quotations,
            payments,
        }
    }

    /// Sisa tagihan quotation
    pub fn compute_balance(quotation: &Quotation) -> BigDecimal {
        compute_balance(&quotation.total_amount, &quotation.received_amount)
    }

    /// Catat pembayaran dengan amount dalam (0, sisa tagihan].
    ///
    /// Pengecekan pertama dilakukan terhadap saldo yang dibaca di sini, lalu
    /// diulang di store dengan row quotation terkunci sehingga dua pembayaran
    /// bersamaan tidak bisa melewati total.
    pub async fn record_payment(
        &self,
        quotation_id: Uuid,
        request: RecordPaymentRequest,
    ) -> AppResult<PaymentRecorded> {
        let quotation = self.find_quotation(quotation_id).await?;
        let remaining = Self::compute_balance(&quotation);

        let new_payment = request
            .resolve(quotation_id, &remaining)
            .map_err(AppError::validation)?;

        let payment = self.payments.insert_within_balance(new_payment).await?;

        let refreshed = self
            .quotations
            .find_by_id(quotation_id)
            .await?
            .ok_or_else(|| AppError::internal("Quotation hilang setelah pembayaran dicatat"))?;
        let balance = refreshed.summary();

        tracing::info!(
            "Payment {} recorded for quotation {}: amount {}, remaining {}",
            payment.id,
            refreshed.bill_reference,
            payment.amount,
            balance.balance
        );

        Ok(PaymentRecorded { payment, balance })
    }

    pub async fn balance(&self, quotation_id: Uuid) -> AppResult<BalanceSummary> {
        let quotation = self.find_quotation(quotation_id).await?;
        Ok(quotation.summary())
    }

    pub async fn list_payments(&self, quotation_id: Uuid) -> AppResult<Vec<Payment>> {
        self.find_quotation(quotation_id).await?;
        self.payments.list_by_quotation(quotation_id).await
    }

    async fn find_quotation(&self, quotation_id: Uuid) -> AppResult<Quotation> {
        self.quotations
            .find_by_id(quotation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quotation tidak ditemukan"))
    }
}
