pub mod communication;
pub mod health;
pub mod orders;
pub mod payments;
pub mod quotations;
