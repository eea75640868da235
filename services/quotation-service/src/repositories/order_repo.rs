use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::history::NewHistoryEntry;
use crate::domain::order::{CreateOrderRequest, CustomOrder, OrderStatus};
use crate::error::AppError;
use crate::repositories::{history_repo::insert_history, OrderStore};

pub(crate) const ORDER_COLUMNS: &str = r#"
    id, company_name, contact_name, email, phone,
    product_type, product_size, product_color, thickness, printing,
    quantity, timeline, requirements, status,
    quote_reference, quote_amount, quote_sent_at, quote_valid_until, quote_notes,
    created_at, updated_at
"#;

// Repository untuk operasi database custom order
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderRepository {
    async fn insert(&self, request: CreateOrderRequest) -> Result<CustomOrder, AppError> {
        let query = format!(
            r#"
            INSERT INTO custom_orders (
                id, company_name, contact_name, email, phone,
                product_type, product_size, product_color, thickness, printing,
                quantity, timeline, requirements, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW(), NOW())
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let order = sqlx::query_as::<_, CustomOrder>(&query)
            .bind(Uuid::new_v4())
            .bind(request.company_name.trim())
            .bind(request.contact_name.trim())
            .bind(request.email.trim().to_lowercase())
            .bind(request.phone.trim())
            .bind(&request.product_type)
            .bind(&request.product_size)
            .bind(&request.product_color)
            .bind(&request.thickness)
            .bind(&request.printing)
            .bind(request.quantity)
            .bind(request.timeline)
            .bind(&request.requirements)
            .bind(OrderStatus::New)
            .fetch_one(&self.pool)
            .await?;

        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomOrder>, AppError> {
        let query = format!("SELECT {} FROM custom_orders WHERE id = $1", ORDER_COLUMNS);

        let order = sqlx::query_as::<_, CustomOrder>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CustomOrder>, i64), AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM custom_orders
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, CustomOrder>(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM custom_orders WHERE ($1::varchar IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((orders, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        status: OrderStatus,
        expected_updated_at: Option<DateTime<Utc>>,
        history: NewHistoryEntry,
    ) -> Result<Option<CustomOrder>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Status harus masih sama dengan yang divalidasi service,
        // plus compare-and-swap pada updated_at kalau admin mengirim versi yang dia lihat
        let query = format!(
            r#"
            UPDATE custom_orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
              AND status = $4
              AND ($3::timestamptz IS NULL OR updated_at = $3)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        );

        let updated = sqlx::query_as::<_, CustomOrder>(&query)
            .bind(id)
            .bind(status)
            .bind(expected_updated_at)
            .bind(from)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        insert_history(&mut *tx, &history).await?;
        tx.commit().await?;

        Ok(Some(order))
    }
}
