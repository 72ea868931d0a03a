//! Product catalogue routes.

use axum::{extract::State, Json};
use domain::models::product::{default_products, Product, ProductInput};
use persistence::db::is_undefined_table;
use persistence::repositories::{ProductRepository, SaveOutcome};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AppJson;

/// Response for a catalogue save.
#[derive(Debug, Serialize)]
pub struct SaveProductsResponse {
    pub success: bool,
    pub saved: u64,
    pub removed: u64,
}

/// Loads the catalogue, substituting the built-in products while none are
/// stored and `catalog.fallback_to_defaults` is enabled.
pub async fn load_catalog(state: &AppState) -> Result<Vec<Product>, ApiError> {
    let repo = ProductRepository::new(state.pool.clone());

    let stored = match repo.list().await {
        Ok(products) => products,
        Err(e) if is_undefined_table(&e) => {
            warn!("products table missing");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    if stored.is_empty() && state.config.catalog.fallback_to_defaults {
        return Ok(default_products());
    }

    Ok(stored.into_iter().map(Product::from).collect())
}

/// List the catalogue.
///
/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    load_catalog(&state).await.map(Json)
}

/// Replace the catalogue with the submitted list.
///
/// POST /api/products
///
/// Products are upserted by SKU and stored products missing from the list
/// are removed. A product carrying a stale `revision` aborts the whole save.
pub async fn save_products(
    State(state): State<AppState>,
    AppJson(products): AppJson<Vec<ProductInput>>,
) -> Result<Json<SaveProductsResponse>, ApiError> {
    let mut seen = HashSet::new();
    for product in &products {
        product.validate()?;
        if !seen.insert(product.sku.trim()) {
            return Err(ApiError::Validation(format!(
                "Duplicate SKU: {}",
                product.sku.trim()
            )));
        }
    }

    let repo = ProductRepository::new(state.pool.clone());
    match repo
        .save_all(&products, &state.config.catalog.placeholder_image_url)
        .await?
    {
        SaveOutcome::Saved { upserted, removed } => {
            info!(
                product_count = products.len(),
                upserted, removed, "Product catalogue saved"
            );
            Ok(Json(SaveProductsResponse {
                success: true,
                saved: upserted,
                removed,
            }))
        }
        SaveOutcome::Stale { key } => Err(ApiError::Conflict(format!(
            "Product {} was modified by someone else. Reload and try again.",
            key
        ))),
    }
}
