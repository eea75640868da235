use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::utils::validation::{fits_money_column, is_blank, is_positive_amount, round_money};
use sqlx::FromRow;
use uuid::Uuid;

/// Masa berlaku default quotation dalam hari
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

// Model quotation untuk satu custom order.
// received_amount selalu hasil SUM(payments) saat dibaca, bukan kolom yang di-set terpisah.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Quotation {
    pub id: Uuid,
    pub custom_order_id: Uuid,
    #[schema(value_type = String, example = "500.00")]
    pub total_amount: BigDecimal,
    #[schema(value_type = String, example = "200.00")]
    pub received_amount: BigDecimal,
    pub bill_reference: String,
    pub notes: Option<String>,
    pub sent_at: NaiveDate,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    /// Sisa tagihan: total_amount - received_amount
    pub fn balance(&self) -> BigDecimal {
        compute_balance(&self.total_amount, &self.received_amount)
    }

    pub fn summary(&self) -> BalanceSummary {
        let balance = self.balance();
        BalanceSummary {
            quotation_id: self.id,
            total_amount: self.total_amount.clone(),
            received_amount: self.received_amount.clone(),
            is_fully_paid: balance <= BigDecimal::zero(),
            balance,
        }
    }

    /// Cek apakah quotation sudah lewat masa berlaku pada tanggal tertentu
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        date > self.valid_until
    }
}

/// Hitung sisa tagihan dari total dan jumlah yang sudah diterima
pub fn compute_balance(total_amount: &BigDecimal, received_amount: &BigDecimal) -> BigDecimal {
    total_amount - received_amount
}

/// Generate reference default: `Q-` + 8 karakter pertama order ID (uppercase)
pub fn default_quote_reference(order_id: &str) -> String {
    let prefix: String = order_id.chars().take(8).collect();
    format!("Q-{}", prefix.to_uppercase())
}

/// Tanggal berlaku default: tanggal kirim + jumlah hari validity
pub fn default_valid_until(sent_at: NaiveDate, validity_days: i64) -> NaiveDate {
    sent_at + Duration::days(validity_days)
}

// Total quotation dibulatkan ke 2 desimal, harus positif dan muat di NUMERIC(14,2)
fn validate_quote_amount(amount: &BigDecimal) -> Result<BigDecimal, String> {
    let amount = round_money(amount);

    if !is_positive_amount(&amount) {
        return Err("Amount quotation harus lebih dari 0".to_string());
    }
    if !fits_money_column(&amount) {
        return Err("Amount quotation melebihi batas maksimum".to_string());
    }

    Ok(amount)
}

// Ringkasan pembayaran quotation
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, PartialEq)]
pub struct BalanceSummary {
    pub quotation_id: Uuid,
    #[schema(value_type = String)]
    pub total_amount: BigDecimal,
    #[schema(value_type = String)]
    pub received_amount: BigDecimal,
    #[schema(value_type = String)]
    pub balance: BigDecimal,
    pub is_fully_paid: bool,
}

// Request buat quotation baru untuk order
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateQuotationRequest {
    #[schema(value_type = String, example = "500.00")]
    pub amount: BigDecimal,
    pub notes: Option<String>,
    pub quote_reference: Option<String>,
    pub quote_sent_at: Option<NaiveDate>,
    pub quote_valid_until: Option<NaiveDate>,
}

// Quotation yang sudah tervalidasi dan terisi default, siap disimpan
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationDraft {
    pub order_id: Uuid,
    pub amount: BigDecimal,
    pub notes: Option<String>,
    pub quote_reference: String,
    pub quote_sent_at: NaiveDate,
    pub quote_valid_until: NaiveDate,
}

impl CreateQuotationRequest {
    /// Validasi request dan isi nilai default (reference, tanggal kirim, masa berlaku)
    pub fn resolve(
        &self,
        order_id: Uuid,
        today: NaiveDate,
        validity_days: i64,
    ) -> Result<QuotationDraft, String> {
        let amount = validate_quote_amount(&self.amount)?;

        let quote_reference = match self.quote_reference.as_deref().map(str::trim) {
            Some(reference) if !reference.is_empty() => reference.to_string(),
            _ => default_quote_reference(&order_id.to_string()),
        };

        let quote_sent_at = self.quote_sent_at.unwrap_or(today);
        let quote_valid_until = self
            .quote_valid_until
            .unwrap_or_else(|| default_valid_until(quote_sent_at, validity_days));

        if quote_valid_until < quote_sent_at {
            return Err("Tanggal valid until tidak boleh sebelum tanggal kirim".to_string());
        }

        if quote_reference.len() > 50 {
            return Err("Quote reference maksimal 50 karakter".to_string());
        }

        Ok(QuotationDraft {
            order_id,
            amount,
            notes: self.notes.clone().filter(|n| !is_blank(n)),
            quote_reference,
            quote_sent_at,
            quote_valid_until,
        })
    }
}

// Request amend quotation yang sudah ada
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AmendQuotationRequest {
    #[schema(value_type = Option<String>)]
    pub amount: Option<BigDecimal>,
    pub notes: Option<String>,
    pub quote_valid_until: Option<NaiveDate>,
    /// Nilai `updated_at` quotation terakhir yang dilihat admin
    pub expected_updated_at: Option<DateTime<Utc>>,
}

// Perubahan quotation yang sudah tervalidasi
#[derive(Debug, Clone, PartialEq)]
pub struct QuotationAmendment {
    pub amount: Option<BigDecimal>,
    pub notes: Option<String>,
    pub valid_until: Option<NaiveDate>,
}

impl AmendQuotationRequest {
    /// Validasi amend terhadap kondisi quotation saat ini
    pub fn resolve(&self, current: &Quotation) -> Result<QuotationAmendment, String> {
        if self.amount.is_none() && self.notes.is_none() && self.quote_valid_until.is_none() {
            return Err("Tidak ada perubahan quotation".to_string());
        }

        let amount = self.amount.as_ref().map(validate_quote_amount).transpose()?;

        if let Some(amount) = &amount {
            if amount < &current.received_amount {
                return Err(format!(
                    "Amount tidak boleh kurang dari pembayaran yang sudah diterima ({})",
                    current.received_amount
                ));
            }
        }

        if let Some(valid_until) = self.quote_valid_until {
            if valid_until < current.sent_at {
                return Err("Tanggal valid until tidak boleh sebelum tanggal kirim".to_string());
            }
        }

        Ok(QuotationAmendment {
            amount,
            notes: self.notes.clone(),
            valid_until: self.quote_valid_until,
        })
    }
}

// Response sukses pembuatan quotation
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct QuotationCreated {
    pub quote_reference: String,
    pub quotation: Quotation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(amount: &str) -> CreateQuotationRequest {
        CreateQuotationRequest {
            amount: BigDecimal::from_str(amount).unwrap(),
            notes: None,
            quote_reference: None,
            quote_sent_at: Some(date(2024, 1, 1)),
            quote_valid_until: None,
        }
    }

    fn quotation(total: i64, received: i64) -> Quotation {
        Quotation {
            id: Uuid::new_v4(),
            custom_order_id: Uuid::new_v4(),
            total_amount: BigDecimal::from(total),
            received_amount: BigDecimal::from(received),
            bill_reference: "Q-TEST0001".to_string(),
            notes: None,
            sent_at: date(2024, 3, 1),
            valid_until: date(2024, 3, 31),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_quote_reference() {
        assert_eq!(default_quote_reference("abcdef1234567890"), "Q-ABCDEF12");
        assert_eq!(default_quote_reference("ab12"), "Q-AB12");
    }

    #[test]
    fn test_default_valid_until() {
        assert_eq!(default_valid_until(date(2024, 1, 1), DEFAULT_VALIDITY_DAYS), date(2024, 1, 31));
        assert_eq!(default_valid_until(date(2024, 2, 15), DEFAULT_VALIDITY_DAYS), date(2024, 3, 16));
    }

    #[test]
    fn test_compute_balance() {
        assert_eq!(
            compute_balance(&BigDecimal::from(1000), &BigDecimal::from(300)),
            BigDecimal::from(700)
        );

        let summary = quotation(500, 500).summary();
        assert_eq!(summary.balance, BigDecimal::from(0));
        assert!(summary.is_fully_paid);
    }

    #[test]
    fn test_resolve_rejects_non_positive_amount() {
        assert!(request("0").resolve(Uuid::new_v4(), date(2024, 1, 1), 30).is_err());
        assert!(request("-10").resolve(Uuid::new_v4(), date(2024, 1, 1), 30).is_err());
    }

    #[test]
    fn test_resolve_rounds_and_bounds_amount() {
        let draft = request("499.999").resolve(Uuid::new_v4(), date(2024, 1, 1), 30).unwrap();
        assert_eq!(draft.amount, BigDecimal::from_str("500.00").unwrap());

        assert!(request("0.004").resolve(Uuid::new_v4(), date(2024, 1, 1), 30).is_err());
        assert!(request("1000000000000").resolve(Uuid::new_v4(), date(2024, 1, 1), 30).is_err());
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let order_id = Uuid::parse_str("abcdef12-3456-7890-abcd-ef1234567890").unwrap();
        let draft = request("500").resolve(order_id, date(2024, 6, 1), 30).unwrap();

        assert_eq!(draft.quote_reference, "Q-ABCDEF12");
        assert_eq!(draft.quote_sent_at, date(2024, 1, 1));
        assert_eq!(draft.quote_valid_until, date(2024, 1, 31));
    }

    #[test]
    fn test_resolve_blank_reference_uses_default_and_today() {
        let order_id = Uuid::parse_str("abcdef12-3456-7890-abcd-ef1234567890").unwrap();
        let mut req = request("500");
        req.quote_reference = Some("   ".to_string());
        req.quote_sent_at = None;

        let draft = req.resolve(order_id, date(2024, 5, 10), 30).unwrap();
        assert_eq!(draft.quote_reference, "Q-ABCDEF12");
        assert_eq!(draft.quote_sent_at, date(2024, 5, 10));
        assert_eq!(draft.quote_valid_until, date(2024, 6, 9));
    }

    #[test]
    fn test_resolve_rejects_valid_until_before_sent() {
        let mut req = request("500");
        req.quote_valid_until = Some(date(2023, 12, 31));
        assert!(req.resolve(Uuid::new_v4(), date(2024, 1, 1), 30).is_err());
    }

    #[test]
    fn test_amend_cannot_drop_below_received() {
        let current = quotation(500, 300);

        let amend = AmendQuotationRequest {
            amount: Some(BigDecimal::from(250)),
            ..Default::default()
        };
        assert!(amend.resolve(&current).is_err());

        let amend = AmendQuotationRequest {
            amount: Some(BigDecimal::from(300)),
            ..Default::default()
        };
        assert!(amend.resolve(&current).is_ok());

        assert!(AmendQuotationRequest::default().resolve(&current).is_err());
    }
}
