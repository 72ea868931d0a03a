//! Domain layer for the QurtubloX Store backend.
//!
//! This crate contains:
//! - Domain models (Customer, Product, Order, Message, Group)
//! - Request/response payloads with validation rules
//! - The checkout service (cart pricing and point settlement rules)

pub mod models;
pub mod services;
