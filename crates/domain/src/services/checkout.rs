//! Checkout rules: cart pricing and point settlement.
//!
//! Pricing is done against the catalogue, never against prices sent by the
//! client. The debit itself is applied by the order repository in a single
//! conditional update; the functions here define the same rule for callers
//! that need to reason about it up front.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::order::{CartLine, OrderItem};
use crate::models::product::Product;

/// Balances at or above this value are treated as unlimited.
pub const UNLIMITED_POINTS_SENTINEL: i64 = 999_999;

/// Largest quantity accepted for a single cart line.
pub const MAX_LINE_QUANTITY: i64 = 1_000;

/// Reasons a cart cannot be checked out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity {qty} for product {sku}")]
    InvalidQuantity { sku: String, qty: i64 },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Product is not available: {0}")]
    Unavailable(String),

    #[error("Order total is too large")]
    TotalOverflow,
}

/// A cart priced against the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub items: Vec<OrderItem>,
    pub total: i64,
}

/// Returns true if the customer may place an order of `total` points.
pub fn can_afford(points: i64, unlimited: bool, total: i64) -> bool {
    unlimited || points >= UNLIMITED_POINTS_SENTINEL || points >= total
}

/// Balance after paying `total`. Unlimited and sentinel balances are not debited.
pub fn points_after(points: i64, unlimited: bool, total: i64) -> i64 {
    if unlimited || points >= UNLIMITED_POINTS_SENTINEL {
        points
    } else {
        points - total
    }
}

/// Prices cart lines against the catalogue.
///
/// Lines with the same SKU are merged. Output order follows the first
/// occurrence of each SKU in the cart.
pub fn price_cart(catalog: &[Product], lines: &[CartLine]) -> Result<PricedCart, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let by_sku: HashMap<&str, &Product> = catalog.iter().map(|p| (p.sku.as_str(), p)).collect();

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in lines {
        let sku = line.sku.trim();
        if line.qty <= 0 || line.qty > MAX_LINE_QUANTITY {
            return Err(CheckoutError::InvalidQuantity {
                sku: sku.to_string(),
                qty: line.qty,
            });
        }

        let product = by_sku
            .get(sku)
            .ok_or_else(|| CheckoutError::UnknownProduct(sku.to_string()))?;
        if !product.status.is_orderable() {
            return Err(CheckoutError::Unavailable(sku.to_string()));
        }

        match items.iter_mut().find(|item| item.sku == sku) {
            Some(existing) => existing.qty += line.qty,
            None => items.push(OrderItem {
                sku: product.sku.clone(),
                name: product.name.clone(),
                qty: line.qty,
                price: product.price,
            }),
        }
    }

    let total = items.iter().try_fold(0i64, |acc, item| {
        item.line_total()
            .and_then(|line| acc.checked_add(line))
            .ok_or(CheckoutError::TotalOverflow)
    })?;

    Ok(PricedCart { items, total })
}
