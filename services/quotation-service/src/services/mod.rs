// Service layer: aturan bisnis order, quotation, pembayaran dan notifikasi

pub mod notification_dispatcher;
pub mod order_service;
pub mod payment_ledger;
pub mod quotation_manager;

pub use notification_dispatcher::NotificationDispatcher;
pub use order_service::OrderService;
pub use payment_ledger::PaymentLedger;
pub use quotation_manager::QuotationManager;

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::history;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::{PaymentMethod, RecordPaymentRequest};
    use crate::domain::quotation::CreateQuotationRequest;
    use crate::error::AppError;
    use crate::repositories::memory::{sample_order_request, InMemoryStore};

    fn amount(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn pay(value: &str) -> RecordPaymentRequest {
        RecordPaymentRequest {
            amount: amount(value),
            payment_method: Some(PaymentMethod::BankTransfer),
            reference_number: None,
            notes: None,
            payment_date: NaiveDate::from_ymd_opt(2024, 3, 10),
        }
    }

    #[tokio::test]
    async fn test_order_to_fully_paid_quotation() {
        let store = InMemoryStore::new();
        let orders = OrderService::new(Arc::new(store.clone()));
        let manager = QuotationManager::new(Arc::new(store.clone()), Arc::new(store.clone()), 30);
        let ledger = PaymentLedger::new(Arc::new(store.clone()), Arc::new(store.clone()));

        let order = orders.create_order(sample_order_request()).await.unwrap();

        let created = manager
            .create_quotation(
                order.id,
                CreateQuotationRequest {
                    amount: amount("500"),
                    notes: None,
                    quote_reference: Some("Q-TEST0001".to_string()),
                    quote_sent_at: NaiveDate::from_ymd_opt(2024, 3, 1),
                    quote_valid_until: NaiveDate::from_ymd_opt(2024, 3, 31),
                },
            )
            .await
            .unwrap();
        let quotation_id = created.quotation.id;

        let order = orders.get_order(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Quoted);
        assert_eq!(order.quote_reference.as_deref(), Some("Q-TEST0001"));

        let first = ledger.record_payment(quotation_id, pay("200")).await.unwrap();
        assert_eq!(first.balance.balance, amount("300"));

        let second = ledger.record_payment(quotation_id, pay("300")).await.unwrap();
        assert_eq!(second.balance.balance, amount("0"));
        assert!(second.balance.is_fully_paid);

        let overpay = ledger.record_payment(quotation_id, pay("1")).await;
        assert!(matches!(overpay, Err(AppError::ValidationError(_))));
        assert_eq!(store.payment_count(), 2);

        assert_eq!(
            store.history_labels(order.id),
            vec![
                history::QUOTATION_CREATED,
                history::PAYMENT_RECORDED,
                history::PAYMENT_RECORDED
            ]
        );
    }
}
