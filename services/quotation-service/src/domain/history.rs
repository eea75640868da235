use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Label status yang ditulis ke quotation_history
pub const QUOTATION_CREATED: &str = "quotation-created";
pub const QUOTATION_AMENDED: &str = "quotation-amended";
pub const QUOTATION_SENT: &str = "quotation-sent";
pub const PAYMENT_RECORDED: &str = "payment-recorded";
pub const REMINDER_SENT: &str = "reminder-sent";
pub const STATUS_CHANGED: &str = "status-changed";

// Audit trail append-only untuk komunikasi & perubahan quotation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct QuotationHistory {
    pub id: Uuid,
    pub custom_order_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Entry history baru
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub custom_order_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub status: String,
    pub notes: Option<String>,
}

impl NewHistoryEntry {
    pub fn new(custom_order_id: Uuid, quotation_id: Option<Uuid>, status: &str) -> Self {
        Self {
            custom_order_id,
            quotation_id,
            status: status.to_string(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// Request kirim reminder ke customer
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SendReminderRequest {
    /// Pesan tambahan dari admin yang ikut dirender di email
    pub message: Option<String>,
}
