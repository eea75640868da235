use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Model custom order dari form order intake
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CustomOrder {
    pub id: Uuid,

    // Info perusahaan & kontak
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,

    // Spesifikasi produk
    pub product_type: String,
    pub product_size: String,
    pub product_color: String,
    pub thickness: String,
    pub printing: Option<String>,
    pub quantity: i32,
    pub timeline: ProductionTimeline,
    pub requirements: Option<String>,

    pub status: OrderStatus,

    // Ringkasan quotation yang di-mirror ke order
    pub quote_reference: Option<String>,
    #[schema(value_type = Option<String>, example = "500.00")]
    pub quote_amount: Option<BigDecimal>,
    pub quote_sent_at: Option<NaiveDate>,
    pub quote_valid_until: Option<NaiveDate>,
    pub quote_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Status order: new -> quoted -> in_production -> completed, cancelled dari state non-terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Quoted,
    InProduction,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Quoted => "quoted",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Completed dan cancelled tidak bisa berubah lagi
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Cek apakah transisi status diperbolehkan
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }

        matches!(
            (self, next),
            (OrderStatus::New, OrderStatus::Quoted)
                | (OrderStatus::Quoted, OrderStatus::InProduction)
                | (OrderStatus::InProduction, OrderStatus::Completed)
                | (_, OrderStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Target waktu produksi yang diminta customer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductionTimeline {
    Urgent,
    OneMonth,
    ThreeMonths,
    Flexible,
}

// Request order intake baru
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 120))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 30))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub product_type: String,
    #[validate(length(min = 1, max = 100))]
    pub product_size: String,
    #[validate(length(min = 1, max = 50))]
    pub product_color: String,
    #[validate(length(min = 1, max = 50))]
    pub thickness: String,
    #[validate(length(max = 500))]
    pub printing: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub timeline: ProductionTimeline,
    #[validate(length(max = 5000))]
    pub requirements: Option<String>,
}

// Request perubahan status oleh admin
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    /// Nilai `updated_at` terakhir yang dilihat admin; kalau diisi, update ditolak saat data sudah berubah
    pub expected_updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// Query list order untuk dashboard admin
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderListQuery {
    /// Normalisasi pagination: page minimal 1, limit 1..=100 (default 20)
    pub fn pagination(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(20).clamp(1, 100);
        (page, limit)
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct OrderListResponse {
    pub data: Vec<CustomOrder>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
