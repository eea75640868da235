use bigdecimal::{BigDecimal, RoundingMode, Zero};
use once_cell::sync::Lazy;
use regex::Regex;

/// Jumlah desimal kolom uang (NUMERIC(14,2))
pub const MONEY_SCALE: i64 = 2;

// Batas atas eksklusif NUMERIC(14,2): 12 digit sebelum koma
static MONEY_LIMIT: Lazy<BigDecimal> = Lazy::new(|| BigDecimal::from(1_000_000_000_000i64));

// Nomor telepon internasional: digit, spasi, tanda hubung, kurung, opsional +
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9(][0-9\s\-()]{6,19}$")
        .expect("phone regex valid")
});

// Validate nomor telepon kontak customer
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone.trim())
}

// Validate nominal uang (harus positif)
pub fn is_positive_amount(amount: &BigDecimal) -> bool {
    amount > &BigDecimal::zero()
}

// Bulatkan nominal ke 2 desimal (half up), sama seperti yang disimpan Postgres
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

// Nominal masih muat di kolom NUMERIC(14,2)
pub fn fits_money_column(amount: &BigDecimal) -> bool {
    amount.abs() < *MONEY_LIMIT
}

// Cek string kosong atau hanya whitespace
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// Sanitize string untuk prevent XSS di email HTML
pub fn sanitize_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_phone_validation() {
        assert!(is_valid_phone("+971 4 123 4567"));
        assert!(is_valid_phone("(021) 555-0199"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("call me"));
    }

    #[test]
    fn test_positive_amount() {
        assert!(is_positive_amount(&BigDecimal::from(500)));
        assert!(is_positive_amount(&BigDecimal::from_str("0.01").unwrap()));
        assert!(!is_positive_amount(&BigDecimal::from(0)));
        assert!(!is_positive_amount(&BigDecimal::from(-100)));
    }

    #[test]
    fn test_round_money() {
        let parsed: BigDecimal = BigDecimal::try_from(300.1f64).unwrap();
        assert_eq!(round_money(&parsed), BigDecimal::from_str("300.10").unwrap());

        assert_eq!(round_money(&BigDecimal::from_str("0.005").unwrap()), BigDecimal::from_str("0.01").unwrap());
        assert!(!is_positive_amount(&round_money(&BigDecimal::from_str("0.001").unwrap())));
    }

    #[test]
    fn test_fits_money_column() {
        assert!(fits_money_column(&BigDecimal::from_str("999999999999.99").unwrap()));
        assert!(!fits_money_column(&BigDecimal::from(1_000_000_000_000i64)));
    }

    #[test]
    fn test_sanitize_html() {
        assert_eq!(
            sanitize_html("<b>Tom & \"Jerry\"</b>"),
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"
        );
    }
}
