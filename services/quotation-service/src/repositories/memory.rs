// Store in-memory untuk unit test service layer, semantik mengikuti implementasi Postgres

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::history::{self, NewHistoryEntry, QuotationHistory};
use crate::domain::order::{CreateOrderRequest, CustomOrder, OrderStatus};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::quotation::{compute_balance, Quotation, QuotationAmendment, QuotationDraft};
use crate::error::AppError;
use crate::repositories::{HistoryStore, OrderStore, PaymentStore, QuotationStore};

#[derive(Default)]
struct State {
    orders: Vec<CustomOrder>,
    quotations: Vec<Quotation>,
    payments: Vec<Payment>,
    history: Vec<QuotationHistory>,
    // Counter supaya setiap write punya updated_at berbeda
    tick: i64,
}

impl State {
    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        DateTime::from_timestamp(1_700_000_000 + self.tick, 0).unwrap_or_default()
    }

    fn received(&self, quotation_id: Uuid) -> BigDecimal {
        self.payments
            .iter()
            .filter(|p| p.quotation_id == quotation_id)
            .fold(BigDecimal::zero(), |acc, p| acc + &p.amount)
    }

    fn quotation_view(&self, quotation: &Quotation) -> Quotation {
        let mut view = quotation.clone();
        view.received_amount = self.received(quotation.id);
        view
    }

    fn push_history(&mut self, entry: &NewHistoryEntry) -> QuotationHistory {
        let created_at = self.now();
        let row = QuotationHistory {
            id: Uuid::new_v4(),
            custom_order_id: entry.custom_order_id,
            quotation_id: entry.quotation_id,
            status: entry.status.clone(),
            notes: entry.notes.clone(),
            created_at,
        };
        self.history.push(row.clone());
        row
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history_labels(&self, order_id: Uuid) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .history
            .iter()
            .filter(|h| h.custom_order_id == order_id)
            .map(|h| h.status.clone())
            .collect()
    }

    pub fn payment_count(&self) -> usize {
        self.state.lock().unwrap().payments.len()
    }
}

pub fn sample_order_request() -> CreateOrderRequest {
    CreateOrderRequest {
        company_name: "Green Harvest Foods".to_string(),
        contact_name: "Dana Putri".to_string(),
        email: "procurement@greenharvest.example".to_string(),
        phone: "+62 812 5550 1234".to_string(),
        product_type: "compostable_bag".to_string(),
        product_size: "30x40 cm".to_string(),
        product_color: "natural".to_string(),
        thickness: "25 micron".to_string(),
        printing: Some("2 color logo".to_string()),
        quantity: 10_000,
        timeline: crate::domain::order::ProductionTimeline::OneMonth,
        requirements: None,
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert(&self, request: CreateOrderRequest) -> Result<CustomOrder, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let order = CustomOrder {
            id: Uuid::new_v4(),
            company_name: request.company_name,
            contact_name: request.contact_name,
            email: request.email.to_lowercase(),
            phone: request.phone,
            product_type: request.product_type,
            product_size: request.product_size,
            product_color: request.product_color,
            thickness: request.thickness,
            printing: request.printing,
            quantity: request.quantity,
            timeline: request.timeline,
            requirements: request.requirements,
            status: OrderStatus::New,
            quote_reference: None,
            quote_amount: None,
            quote_sent_at: None,
            quote_valid_until: None,
            quote_notes: None,
            created_at: now,
            updated_at: now,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomOrder>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<CustomOrder>, i64), AppError> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<CustomOrder> = state
            .orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        status: OrderStatus,
        expected_updated_at: Option<DateTime<Utc>>,
        history: NewHistoryEntry,
    ) -> Result<Option<CustomOrder>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();

        let Some(order) = state.orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        if order.status != from {
            return Ok(None);
        }
        if expected_updated_at.is_some_and(|expected| expected != order.updated_at) {
            return Ok(None);
        }

        order.status = status;
        order.updated_at = now;
        let updated = order.clone();
        state.push_history(&history);
        Ok(Some(updated))
    }
}

#[async_trait]
impl QuotationStore for InMemoryStore {
    async fn create_for_order(&self, draft: QuotationDraft) -> Result<Quotation, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();

        if state.quotations.iter().any(|q| q.custom_order_id == draft.order_id) {
            return Err(AppError::conflict("Order ini sudah memiliki quotation"));
        }

        let Some(order) = state
            .orders
            .iter_mut()
            .find(|o| o.id == draft.order_id && o.status == OrderStatus::New)
        else {
            return Err(AppError::conflict(
                "Order sudah tidak berstatus new, quotation tidak bisa dibuat",
            ));
        };

        order.status = OrderStatus::Quoted;
        order.quote_reference = Some(draft.quote_reference.clone());
        order.quote_amount = Some(draft.amount.clone());
        order.quote_sent_at = Some(draft.quote_sent_at);
        order.quote_valid_until = Some(draft.quote_valid_until);
        order.quote_notes = draft.notes.clone();
        order.updated_at = now;

        let quotation = Quotation {
            id: Uuid::new_v4(),
            custom_order_id: draft.order_id,
            total_amount: draft.amount.clone(),
            received_amount: BigDecimal::zero(),
            bill_reference: draft.quote_reference.clone(),
            notes: draft.notes.clone(),
            sent_at: draft.quote_sent_at,
            valid_until: draft.quote_valid_until,
            created_at: now,
            updated_at: now,
        };
        state.quotations.push(quotation.clone());
        state.push_history(&NewHistoryEntry::new(
            draft.order_id,
            Some(quotation.id),
            history::QUOTATION_CREATED,
        ));

        Ok(quotation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Quotation>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .quotations
            .iter()
            .find(|q| q.id == id)
            .map(|q| state.quotation_view(q)))
    }

    async fn find_by_order_id(&self, order_id: Uuid) -> Result<Option<Quotation>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .quotations
            .iter()
            .find(|q| q.custom_order_id == order_id)
            .map(|q| state.quotation_view(q)))
    }

    async fn amend(
        &self,
        id: Uuid,
        amendment: QuotationAmendment,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Quotation>, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let received = state.received(id);

        let Some(index) = state.quotations.iter().position(|q| q.id == id) else {
            return Err(AppError::not_found("Quotation tidak ditemukan"));
        };
        let order_id = state.quotations[index].custom_order_id;
        if let Some(order) = state.orders.iter().find(|o| o.id == order_id && o.status.is_terminal()) {
            return Err(AppError::conflict(format!(
                "Quotation untuk order berstatus {} tidak bisa diubah",
                order.status
            )));
        }
        if expected_updated_at.is_some_and(|expected| expected != state.quotations[index].updated_at) {
            return Ok(None);
        }
        if amendment.amount.as_ref().is_some_and(|amount| amount < &received) {
            return Err(AppError::validation("Amount tidak boleh kurang dari pembayaran yang sudah diterima"));
        }

        let quotation = &mut state.quotations[index];
        if let Some(amount) = amendment.amount {
            quotation.total_amount = amount;
        }
        if let Some(notes) = amendment.notes {
            quotation.notes = Some(notes);
        }
        if let Some(valid_until) = amendment.valid_until {
            quotation.valid_until = valid_until;
        }
        quotation.updated_at = now;
        let snapshot = quotation.clone();

        if let Some(order) = state.orders.iter_mut().find(|o| o.id == snapshot.custom_order_id) {
            order.quote_amount = Some(snapshot.total_amount.clone());
            order.quote_valid_until = Some(snapshot.valid_until);
            order.quote_notes = snapshot.notes.clone();
            order.updated_at = now;
        }
        state.push_history(&NewHistoryEntry::new(
            snapshot.custom_order_id,
            Some(id),
            history::QUOTATION_AMENDED,
        ));

        Ok(Some(state.quotation_view(&snapshot)))
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_within_balance(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut state = self.state.lock().unwrap();
        let now = state.now();

        let Some(quotation) = state.quotations.iter().find(|q| q.id == payment.quotation_id) else {
            return Err(AppError::not_found("Quotation tidak ditemukan"));
        };
        let order_id = quotation.custom_order_id;
        let remaining = compute_balance(&quotation.total_amount, &state.received(quotation.id));
        if payment.amount > remaining {
            return Err(AppError::validation("Amount pembayaran melebihi sisa tagihan"));
        }

        let inserted = Payment {
            id: Uuid::new_v4(),
            quotation_id: payment.quotation_id,
            amount: payment.amount,
            payment_method: payment.payment_method,
            reference_number: payment.reference_number,
            notes: payment.notes,
            payment_date: payment.payment_date,
            created_at: now,
        };
        state.payments.push(inserted.clone());
        state.push_history(&NewHistoryEntry::new(
            order_id,
            Some(payment.quotation_id),
            history::PAYMENT_RECORDED,
        ));

        Ok(inserted)
    }

    async fn list_by_quotation(&self, quotation_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let state = self.state.lock().unwrap();
        let mut payments: Vec<Payment> = state
            .payments
            .iter()
            .filter(|p| p.quotation_id == quotation_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(payments)
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> Result<QuotationHistory, AppError> {
        let mut state = self.state.lock().unwrap();
        Ok(state.push_history(&entry))
    }

    async fn list_by_order(&self, order_id: Uuid) -> Result<Vec<QuotationHistory>, AppError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<QuotationHistory> = state
            .history
            .iter()
            .filter(|h| h.custom_order_id == order_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
