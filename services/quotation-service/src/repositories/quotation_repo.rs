use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::history::{self, NewHistoryEntry};
use crate::domain::order::OrderStatus;
use crate::domain::quotation::{Quotation, QuotationAmendment, QuotationDraft};
use crate::error::AppError;
use crate::repositories::{history_repo::insert_history, QuotationStore};

// received_amount selalu dihitung ulang dari tabel payments
const QUOTATION_SELECT: &str = r#"
    SELECT
        q.id, q.custom_order_id, q.total_amount,
        COALESCE((SELECT SUM(p.amount) FROM payments p WHERE p.quotation_id = q.id), 0)::NUMERIC AS received_amount,
        q.bill_reference, q.notes, q.sent_at, q.valid_until, q.created_at, q.updated_at
    FROM quotations q
"#;

async fn fetch_quotation(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Quotation>, sqlx::Error> {
    let query = format!("{} WHERE q.id = $1", QUOTATION_SELECT);

    sqlx::query_as::<_, Quotation>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
}

// Total pembayaran yang sudah masuk untuk quotation
pub(crate) async fn received_total(
    conn: &mut PgConnection,
    quotation_id: Uuid,
) -> Result<BigDecimal, sqlx::Error> {
    sqlx::query_scalar::<_, BigDecimal>(
        "SELECT COALESCE(SUM(amount), 0)::NUMERIC FROM payments WHERE quotation_id = $1",
    )
    .bind(quotation_id)
    .fetch_one(conn)
    .await
}

// Repository untuk operasi database quotation
#[derive(Clone)]
pub struct PgQuotationRepository {
    pool: PgPool,
}

impl PgQuotationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotationStore for PgQuotationRepository {
    async fn create_for_order(&self, draft: QuotationDraft) -> Result<Quotation, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Pindahkan order ke status quoted, hanya dari status new
        let updated = sqlx::query(
            r#"
            UPDATE custom_orders
            SET status = $2,
                quote_reference = $3,
                quote_amount = $4,
                quote_sent_at = $5,
                quote_valid_until = $6,
                quote_notes = $7,
                updated_at = NOW()
            WHERE id = $1 AND status = $8
            "#,
        )
        .bind(draft.order_id)
        .bind(OrderStatus::Quoted)
        .bind(&draft.quote_reference)
        .bind(&draft.amount)
        .bind(draft.quote_sent_at)
        .bind(draft.quote_valid_until)
        .bind(&draft.notes)
        .bind(OrderStatus::New)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::conflict(
                "Order sudah tidak berstatus new, quotation tidak bisa dibuat",
            ));
        }

        // 2. Insert quotation (unique per order)
        let quotation = sqlx::query_as::<_, Quotation>(
            r#"
            INSERT INTO quotations (
                id, custom_order_id, total_amount, bill_reference, notes,
                sent_at, valid_until, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING
                id, custom_order_id, total_amount, 0::NUMERIC AS received_amount,
                bill_reference, notes, sent_at, valid_until, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(draft.order_id)
        .bind(&draft.amount)
        .bind(&draft.quote_reference)
        .bind(&draft.notes)
        .bind(draft.quote_sent_at)
        .bind(draft.quote_valid_until)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_write(e, "Order ini sudah memiliki quotation"))?;

        // 3. Audit trail
        let entry = NewHistoryEntry::new(draft.order_id, Some(quotation.id), history::QUOTATION_CREATED)
            .with_notes(format!(
                "Quotation {} sebesar {} berlaku sampai {}",
                quotation.bill_reference, quotation.total_amount, quotation.valid_until
            ));
        insert_history(&mut *tx, &entry).await?;

        tx.commit().await?;

        Ok(quotation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let quotation = fetch_quotation(&mut *conn, id).await?;
        Ok(quotation)
    }

    async fn find_by_order_id(&self, order_id: Uuid) -> Result<Option<Quotation>, AppError> {
        let query = format!("{} WHERE q.custom_order_id = $1", QUOTATION_SELECT);

        let quotation = sqlx::query_as::<_, Quotation>(&query)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quotation)
    }

    async fn amend(
        &self,
        id: Uuid,
        amendment: QuotationAmendment,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Quotation>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock row quotation supaya amend dan payment tidak saling balapan
        let locked = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            "SELECT custom_order_id, updated_at FROM quotations WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id, current_updated_at)) = locked else {
            tx.rollback().await?;
            return Err(AppError::not_found("Quotation tidak ditemukan"));
        };

        if expected_updated_at.is_some_and(|expected| expected != current_updated_at) {
            tx.rollback().await?;
            return Ok(None);
        }

        // Status order dibaca ulang di dalam transaksi, order terminal tidak boleh diubah lagi
        let order_status = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM custom_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        if order_status.is_terminal() {
            tx.rollback().await?;
            return Err(AppError::conflict(format!(
                "Quotation untuk order berstatus {} tidak bisa diubah",
                order_status
            )));
        }

        if let Some(amount) = &amendment.amount {
            let received = received_total(&mut *tx, id).await?;
            if amount < &received {
                tx.rollback().await?;
                return Err(AppError::validation(format!(
                    "Amount tidak boleh kurang dari pembayaran yang sudah diterima ({})",
                    received
                )));
            }
        }

        sqlx::query(
            r#"
            UPDATE quotations
            SET total_amount = COALESCE($2, total_amount),
                notes = COALESCE($3, notes),
                valid_until = COALESCE($4, valid_until),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&amendment.amount)
        .bind(&amendment.notes)
        .bind(amendment.valid_until)
        .execute(&mut *tx)
        .await?;

        // Mirror ringkasan quotation ke order
        sqlx::query(
            r#"
            UPDATE custom_orders o
            SET quote_amount = q.total_amount,
                quote_valid_until = q.valid_until,
                quote_notes = q.notes,
                updated_at = NOW()
            FROM quotations q
            WHERE q.id = $1 AND o.id = q.custom_order_id
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let quotation = fetch_quotation(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::internal("Quotation hilang setelah amend"))?;

        let entry = NewHistoryEntry::new(order_id, Some(id), history::QUOTATION_AMENDED)
            .with_notes(format!(
                "Quotation {} diubah: total {}, berlaku sampai {}",
                quotation.bill_reference, quotation.total_amount, quotation.valid_until
            ));
        insert_history(&mut *tx, &entry).await?;

        tx.commit().await?;

        Ok(Some(quotation))
    }
}
