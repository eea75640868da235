use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::history::{NewHistoryEntry, QuotationHistory};
use crate::error::AppError;
use crate::repositories::HistoryStore;

// Insert history di connection/transaksi yang sedang berjalan
pub(crate) async fn insert_history(
    conn: &mut PgConnection,
    entry: &NewHistoryEntry,
) -> Result<QuotationHistory, sqlx::Error> {
    sqlx::query_as::<_, QuotationHistory>(
        r#"
        INSERT INTO quotation_history (id, custom_order_id, quotation_id, status, notes, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        RETURNING id, custom_order_id, quotation_id, status, notes, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.custom_order_id)
    .bind(entry.quotation_id)
    .bind(&entry.status)
    .bind(&entry.notes)
    .fetch_one(conn)
    .await
}

// Repository untuk audit trail quotation
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryRepository {
    async fn append(&self, entry: NewHistoryEntry) -> Result<QuotationHistory, AppError> {
        let mut conn = self.pool.acquire().await?;
        let history = insert_history(&mut *conn, &entry).await?;
        Ok(history)
    }

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<QuotationHistory>, AppError> {
        let rows = sqlx::query_as::<_, QuotationHistory>(
            r#"
            SELECT id, custom_order_id, quotation_id, status, notes, created_at
            FROM quotation_history
            WHERE custom_order_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
