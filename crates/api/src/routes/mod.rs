//! HTTP route handlers.

pub mod checkout;
pub mod customers;
pub mod groups;
pub mod health;
pub mod messages;
pub mod orders;
pub mod products;
