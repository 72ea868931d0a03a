//! Order routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::order::{Order, OrderInput, UpdateOrderRequest};
use persistence::db::is_undefined_table;
use persistence::repositories::{OrderRepository, SaveOutcome, UpdateOutcome};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;

/// Response for an order collection save.
#[derive(Debug, Serialize)]
pub struct SaveOrdersResponse {
    pub success: bool,
    pub saved: u64,
    pub removed: u64,
}

/// List all orders, newest first.
///
/// GET /api/orders
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let repo = OrderRepository::new(state.pool.clone());

    match repo.list().await {
        Ok(orders) => Ok(Json(orders.into_iter().map(Order::from).collect())),
        Err(e) if is_undefined_table(&e) => {
            warn!("orders table missing, returning empty list");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Replace the order collection with the submitted list.
///
/// POST /api/orders
pub async fn save_orders(
    State(state): State<AppState>,
    AppJson(orders): AppJson<Vec<OrderInput>>,
) -> Result<Json<SaveOrdersResponse>, ApiError> {
    let mut seen = HashSet::new();
    for order in &orders {
        order.validate()?;
        if !seen.insert(order.id.trim()) {
            return Err(ApiError::Validation(format!(
                "Duplicate order id: {}",
                order.id.trim()
            )));
        }
    }

    let repo = OrderRepository::new(state.pool.clone());
    match repo.save_all(&orders).await? {
        SaveOutcome::Saved { upserted, removed } => {
            info!(
                order_count = orders.len(),
                upserted, removed, "Order collection saved"
            );
            Ok(Json(SaveOrdersResponse {
                success: true,
                saved: upserted,
                removed,
            }))
        }
        SaveOutcome::Stale { key } => Err(ApiError::Conflict(format!(
            "Order {} was modified by someone else. Reload and try again.",
            key
        ))),
    }
}

/// Update the status and/or admin note of one order.
///
/// PUT /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    AppJson(request): AppJson<UpdateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    request.validate()?;

    let repo = OrderRepository::new(state.pool.clone());
    let outcome = repo
        .update(
            &order_id,
            request.status,
            request.admin_note.as_deref(),
            request.revision,
        )
        .await?;

    match outcome {
        UpdateOutcome::Updated(entity) => {
            info!(order_id = %entity.id, status = ?entity.status, "Order updated");
            Ok(Json(entity.into()))
        }
        UpdateOutcome::NotFound => Err(ApiError::NotFound("Order not found".into())),
        UpdateOutcome::Stale => Err(ApiError::Conflict(
            "Order was modified by someone else. Reload and try again.".into(),
        )),
    }
}
