//! Checkout: turns a cart into an order and debits the customer's points.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::order::{CheckoutRequest, CheckoutResponse, Order};
use domain::services::price_cart;
use persistence::repositories::{CheckoutOutcome, NewOrder, OrderRepository};
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;
use crate::middleware::metrics::{record_checkout_rejected, record_order_placed};
use crate::routes::products::load_catalog;

/// Place an order.
///
/// POST /api/checkout
///
/// Prices come from the catalogue. The balance check, the debit and the
/// order insert happen in one transaction.
pub async fn checkout(
    State(state): State<AppState>,
    AppJson(request): AppJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    request.validate()?;

    let catalog = load_catalog(&state).await?;
    let priced = price_cart(&catalog, &request.items).map_err(|e| {
        record_checkout_rejected("invalid_cart");
        ApiError::from(e)
    })?;

    let repo = OrderRepository::new(state.pool.clone());
    let new_order = NewOrder {
        customer_id: request.customer_id,
        note: request.note.trim().to_string(),
        items: priced.items,
        total: priced.total,
    };

    match repo.place_order(&new_order).await? {
        CheckoutOutcome::Placed {
            order,
            points,
            debited,
        } => {
            let order: Order = order.into();
            info!(
                order_id = %order.id,
                customer_id = %request.customer_id,
                total = order.total,
                debited,
                balance = points,
                "Order placed"
            );
            record_order_placed(debited);
            Ok((StatusCode::CREATED, Json(CheckoutResponse { order, points })))
        }
        CheckoutOutcome::CustomerNotFound => {
            record_checkout_rejected("unknown_customer");
            Err(ApiError::NotFound("Customer not found".into()))
        }
        CheckoutOutcome::InsufficientPoints { balance } => {
            record_checkout_rejected("insufficient_points");
            warn!(
                customer_id = %request.customer_id,
                balance,
                total = new_order.total,
                "Insufficient points"
            );
            Err(ApiError::Conflict(format!(
                "Not enough points: order costs {} but balance is {}",
                new_order.total, balance
            )))
        }
    }
}
