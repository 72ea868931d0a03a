//! Domain services for the QurtubloX Store.
//!
//! Services contain business logic that operates on domain models.

pub mod checkout;

pub use checkout::{
    can_afford, points_after, price_cart, CheckoutError, PricedCart, UNLIMITED_POINTS_SENTINEL,
};
