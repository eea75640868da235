use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::utils::validation::{fits_money_column, is_blank, is_positive_amount, round_money};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::quotation::BalanceSummary;

// Model pembayaran terhadap quotation (immutable setelah dibuat)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub quotation_id: Uuid,
    #[schema(value_type = String, example = "200.00")]
    pub amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// Metode pembayaran yang diterima
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    BankTransfer,
    CreditCard,
    DebitCard,
    OnlinePayment,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Check => "check",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::OnlinePayment => "online_payment",
            PaymentMethod::Other => "other",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Request catat pembayaran baru
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecordPaymentRequest {
    #[schema(value_type = String, example = "200.00")]
    pub amount: BigDecimal,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub payment_date: Option<NaiveDate>,
}

// Pembayaran yang sudah tervalidasi, siap disimpan
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub quotation_id: Uuid,
    pub amount: BigDecimal,
    pub payment_method: PaymentMethod,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub payment_date: NaiveDate,
}

impl RecordPaymentRequest {
    /// Validasi pembayaran: amount (dibulatkan ke 2 desimal) harus dalam (0, remaining_balance]
    pub fn resolve(
        &self,
        quotation_id: Uuid,
        remaining_balance: &BigDecimal,
    ) -> Result<NewPayment, String> {
        let amount = round_money(&self.amount);

        if !is_positive_amount(&amount) {
            return Err("Amount pembayaran harus lebih dari 0".to_string());
        }

        if !fits_money_column(&amount) {
            return Err("Amount pembayaran melebihi batas maksimum".to_string());
        }

        if &amount > remaining_balance {
            return Err(format!(
                "Amount pembayaran melebihi sisa tagihan ({})",
                remaining_balance
            ));
        }

        let payment_method = self
            .payment_method
            .ok_or_else(|| "Metode pembayaran wajib diisi".to_string())?;

        let payment_date = self
            .payment_date
            .ok_or_else(|| "Tanggal pembayaran wajib diisi".to_string())?;

        Ok(NewPayment {
            quotation_id,
            amount,
            payment_method,
            reference_number: self.reference_number.clone().filter(|r| !is_blank(r)),
            notes: self.notes.clone().filter(|n| !is_blank(n)),
            payment_date,
        })
    }
}

// Response sukses pencatatan pembayaran
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct PaymentRecorded {
    pub payment: Payment,
    pub balance: BalanceSummary,
}
