use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use uuid::Uuid;

use crate::domain::history::{self, NewHistoryEntry, QuotationHistory, SendReminderRequest};
use crate::domain::order::CustomOrder;
use crate::domain::quotation::Quotation;
use crate::error::{AppError, AppResult};
use crate::repositories::{HistoryStore, OrderStore, QuotationStore};
use crate::utils::email::{EmailSender, OutgoingEmail};
use crate::utils::templates::{quotation_email, reminder_email, QuotationEmailContext};

// Kirim email quotation / reminder ke customer dan catat ke history
#[derive(Clone)]
pub struct NotificationDispatcher {
    orders: Arc<dyn OrderStore>,
    quotations: Arc<dyn QuotationStore>,
    history: Arc<dyn HistoryStore>,
    email: Arc<dyn EmailSender>,
    company_name: String,
}

impl NotificationDispatcher {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        quotations: Arc<dyn QuotationStore>,
        history: Arc<dyn HistoryStore>,
        email: Arc<dyn EmailSender>,
        company_name: String,
    ) -> Self {
        Self {
            orders,
            quotations,
            history,
            email,
            company_name,
        }
    }

    /// Kirim reminder pembayaran. History `reminder-sent` hanya ditulis kalau email terkirim.
    pub async fn send_reminder(
        &self,
        quotation_id: Uuid,
        request: SendReminderRequest,
    ) -> AppResult<QuotationHistory> {
        let (order, quotation) = self.load(quotation_id).await?;

        if quotation.balance() <= BigDecimal::zero() {
            return Err(AppError::validation("Quotation sudah lunas, reminder tidak diperlukan"));
        }

        let email = reminder_email(&QuotationEmailContext {
            company_name: &self.company_name,
            order: &order,
            quotation: &quotation,
            message: request.message.as_deref(),
        });

        self.deliver(email, &quotation).await?;

        let expired = quotation.is_expired_on(Utc::now().date_naive());
        if expired {
            tracing::warn!(
                "Reminder sent for quotation {} past its validity ({})",
                quotation.bill_reference,
                quotation.valid_until
            );
        }

        let entry = NewHistoryEntry::new(order.id, Some(quotation.id), history::REMINDER_SENT)
            .with_notes(format!(
                "Reminder {} dikirim ke {}, sisa tagihan {}{}",
                quotation.bill_reference,
                order.email,
                quotation.balance(),
                if expired { " (masa berlaku sudah lewat)" } else { "" }
            ));
        self.history.append(entry).await
    }

    /// Kirim email quotation ke customer
    pub async fn send_quotation(&self, quotation_id: Uuid) -> AppResult<QuotationHistory> {
        let (order, quotation) = self.load(quotation_id).await?;

        if order.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Quotation untuk order berstatus {} tidak bisa dikirim",
                order.status
            )));
        }

        let email = quotation_email(&QuotationEmailContext {
            company_name: &self.company_name,
            order: &order,
            quotation: &quotation,
            message: None,
        });

        self.deliver(email, &quotation).await?;

        let entry = NewHistoryEntry::new(order.id, Some(quotation.id), history::QUOTATION_SENT)
            .with_notes(format!(
                "Quotation {} dikirim ke {}",
                quotation.bill_reference, order.email
            ));
        self.history.append(entry).await
    }

    pub async fn list_history(&self, order_id: Uuid) -> AppResult<Vec<QuotationHistory>> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order tidak ditemukan"))?;

        self.history.list_by_order(order_id).await
    }

    async fn load(&self, quotation_id: Uuid) -> AppResult<(CustomOrder, Quotation)> {
        let quotation = self
            .quotations
            .find_by_id(quotation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Quotation tidak ditemukan"))?;

        let order = self
            .orders
            .find_by_id(quotation.custom_order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order tidak ditemukan"))?;

        Ok((order, quotation))
    }

    // Satu kali percobaan, tanpa retry
    async fn deliver(&self, email: OutgoingEmail, quotation: &Quotation) -> AppResult<()> {
        let to = email.to.clone();
        self.email.send(email).await.map_err(|e| {
            tracing::error!(
                "Failed to send email for quotation {} to {}: {}",
                quotation.bill_reference,
                to,
                e
            );
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quotation::CreateQuotationRequest;
    use crate::repositories::memory::{sample_order_request, InMemoryStore};
    use crate::repositories::MockHistoryStore;
    use crate::services::quotation_manager::QuotationManager;
    use crate::utils::email::MockEmailSender;
    use std::str::FromStr;

    async fn quoted(store: &InMemoryStore, total: &str) -> Quotation {
        let order = store.insert(sample_order_request()).await.unwrap();
        let manager = QuotationManager::new(Arc::new(store.clone()), Arc::new(store.clone()), 30);
        let request = CreateQuotationRequest {
            amount: BigDecimal::from_str(total).unwrap(),
            notes: None,
            quote_reference: Some("Q-TEST0001".to_string()),
            quote_sent_at: None,
            quote_valid_until: None,
        };
        manager.create_quotation(order.id, request).await.unwrap().quotation
    }

    fn dispatcher(
        store: &InMemoryStore,
        history: Arc<dyn HistoryStore>,
        email: MockEmailSender,
    ) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            history,
            Arc::new(email),
            "BioPlast".to_string(),
        )
    }

    #[tokio::test]
    async fn test_failed_send_writes_no_history() {
        let store = InMemoryStore::new();
        let quotation = quoted(&store, "500").await;

        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .times(1)
            .returning(|_| Err(AppError::email("SMTP connection refused")));
        let mut history_store = MockHistoryStore::new();
        history_store.expect_append().never();

        let result = dispatcher(&store, Arc::new(history_store), email)
            .send_reminder(quotation.id, SendReminderRequest::default())
            .await;

        assert!(matches!(result, Err(AppError::EmailError(_))));
        assert!(!store
            .history_labels(quotation.custom_order_id)
            .contains(&history::REMINDER_SENT.to_string()));
    }

    #[tokio::test]
    async fn test_successful_reminder_appends_history() {
        let store = InMemoryStore::new();
        let quotation = quoted(&store, "500").await;

        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .withf(|email| {
                email.to == "procurement@greenharvest.example"
                    && email.subject.contains("Q-TEST0001")
                    && email.html.contains("Mohon segera")
            })
            .times(1)
            .returning(|_| Ok(()));

        let request = SendReminderRequest {
            message: Some("Mohon segera konfirmasi".to_string()),
        };
        let row = dispatcher(&store, Arc::new(store.clone()), email)
            .send_reminder(quotation.id, request)
            .await
            .unwrap();

        assert_eq!(row.status, history::REMINDER_SENT);
        assert_eq!(row.quotation_id, Some(quotation.id));
        assert_eq!(
            store.history_labels(quotation.custom_order_id),
            vec![history::QUOTATION_CREATED, history::REMINDER_SENT]
        );
    }

    #[tokio::test]
    async fn test_reminder_for_paid_quotation_skips_email() {
        let store = InMemoryStore::new();
        let quotation = quoted(&store, "500").await;
        let ledger = crate::services::payment_ledger::PaymentLedger::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        ledger
            .record_payment(
                quotation.id,
                crate::domain::payment::RecordPaymentRequest {
                    amount: BigDecimal::from(500),
                    payment_method: Some(crate::domain::payment::PaymentMethod::Cash),
                    reference_number: None,
                    notes: None,
                    payment_date: Some(Utc::now().date_naive()),
                },
            )
            .await
            .unwrap();

        let mut email = MockEmailSender::new();
        email.expect_send().never();

        let result = dispatcher(&store, Arc::new(store.clone()), email)
            .send_reminder(quotation.id, SendReminderRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_send_quotation_logs_quotation_sent() {
        let store = InMemoryStore::new();
        let quotation = quoted(&store, "500").await;

        let mut email = MockEmailSender::new();
        email.expect_send().times(1).returning(|_| Ok(()));

        dispatcher(&store, Arc::new(store.clone()), email)
            .send_quotation(quotation.id)
            .await
            .unwrap();

        let reader = dispatcher(&store, Arc::new(store.clone()), MockEmailSender::new());
        let rows = reader.list_history(quotation.custom_order_id).await.unwrap();
        assert_eq!(rows[0].status, history::QUOTATION_SENT);
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_quotation_is_not_found() {
        let store = InMemoryStore::new();
        let mut email = MockEmailSender::new();
        email.expect_send().never();

        let result = dispatcher(&store, Arc::new(store.clone()), email)
            .send_reminder(Uuid::new_v4(), SendReminderRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFoundError(_))));
    }
}
