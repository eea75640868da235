use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::history::{self, NewHistoryEntry};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::quotation::compute_balance;
use crate::error::AppError;
use crate::repositories::{history_repo::insert_history, quotation_repo::received_total, PaymentStore};

const PAYMENT_COLUMNS: &str = r#"
    id, quotation_id, amount, payment_method, reference_number, notes, payment_date, created_at
"#;

// Repository untuk operasi database payment
#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentStore for PgPaymentRepository {
    async fn insert_within_balance(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock quotation: payment lain untuk quotation yang sama menunggu sampai commit
        let locked = sqlx::query_as::<_, (Uuid, String, BigDecimal)>(
            "SELECT custom_order_id, bill_reference, total_amount FROM quotations WHERE id = $1 FOR UPDATE",
        )
        .bind(payment.quotation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id, bill_reference, total_amount)) = locked else {
            tx.rollback().await?;
            return Err(AppError::not_found("Quotation tidak ditemukan"));
        };

        let received = received_total(&mut *tx, payment.quotation_id).await?;
        let remaining = compute_balance(&total_amount, &received);

        if payment.amount > remaining {
            tx.rollback().await?;
            return Err(AppError::validation(format!(
                "Amount pembayaran melebihi sisa tagihan ({})",
                remaining
            )));
        }

        let query = format!(
            r#"
            INSERT INTO payments (
                id, quotation_id, amount, payment_method, reference_number, notes, payment_date, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );

        let inserted = sqlx::query_as::<_, Payment>(&query)
            .bind(Uuid::new_v4())
            .bind(payment.quotation_id)
            .bind(&payment.amount)
            .bind(payment.payment_method)
            .bind(&payment.reference_number)
            .bind(&payment.notes)
            .bind(payment.payment_date)
            .fetch_one(&mut *tx)
            .await?;

        let entry = NewHistoryEntry::new(order_id, Some(payment.quotation_id), history::PAYMENT_RECORDED)
            .with_notes(format!(
                "Pembayaran {} via {} untuk {}",
                inserted.amount, inserted.payment_method, bill_reference
            ));
        insert_history(&mut *tx, &entry).await?;

        tx.commit().await?;

        Ok(inserted)
    }

    async fn list_by_quotation(&self, quotation_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM payments
            WHERE quotation_id = $1
            ORDER BY payment_date DESC, created_at DESC
            "#,
            PAYMENT_COLUMNS
        );

        let payments = sqlx::query_as::<_, Payment>(&query)
            .bind(quotation_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }
}
