pub mod history;
pub mod order;
pub mod payment;
pub mod quotation;
