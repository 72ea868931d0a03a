//! Integration tests for the product catalogue.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::StatusCode;
use common::{count_rows, test_config, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_empty_catalogue_serves_defaults() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    let skus: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["sku"].as_str().unwrap())
        .collect();
    assert_eq!(skus, vec!["QP-SHIRT-001", "QP-HOODIE-001", "QP-CAP-001"]);
    assert_eq!(body[2]["status"], "coming_soon");
    assert_eq!(count_rows(&ctx.pool, "products").await, 0);
}

#[tokio::test]
async fn test_defaults_disabled_returns_empty_list() {
    let mut config = test_config();
    config.catalog.fallback_to_defaults = false;
    let ctx = TestContext::with_config(config).await;

    let (status, body) = ctx.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_save_and_list_products() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/products",
            json!([
                {
                    "sku": "QP-MUG-001",
                    "name": "Mug",
                    "price": 12,
                    "desc": "Ceramic mug",
                    "status": "in_stock",
                    "imageUrl": "https://cdn.example.com/mug.png",
                },
                { "sku": "QP-PIN-001", "name": "Pin", "price": 3, "status": "out_of_stock" },
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["saved"], 2);
    assert_eq!(body["removed"], 0);

    let (status, products) = ctx.get("/api/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 2);

    let mug = &products[0];
    assert_eq!(mug["sku"], "QP-MUG-001");
    assert_eq!(mug["desc"], "Ceramic mug");
    assert_eq!(mug["imageUrl"], "https://cdn.example.com/mug.png");
    assert_eq!(mug["revision"], 1);

    let pin = &products[1];
    assert_eq!(pin["status"], "out_of_stock");
    assert_eq!(pin["imageUrl"], "/placeholder.svg?height=400&width=400");
}

#[tokio::test]
async fn test_save_removes_missing_products() {
    let ctx = TestContext::new().await;

    ctx.post(
        "/api/products",
        json!([
            { "sku": "A-1", "name": "A", "price": 1 },
            { "sku": "B-1", "name": "B", "price": 2 },
        ]),
    )
    .await;

    let (status, body) = ctx
        .post("/api/products", json!([{ "sku": "A-1", "name": "A", "price": 1 }]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], 0);
    assert_eq!(body["removed"], 1);

    let (_, products) = ctx.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["sku"], "A-1");
    assert_eq!(products[0]["revision"], 1);
}

#[tokio::test]
async fn test_saving_empty_list_restores_defaults() {
    let ctx = TestContext::new().await;

    ctx.post("/api/products", json!([{ "sku": "A-1", "name": "A", "price": 1 }]))
        .await;

    let (status, body) = ctx.post("/api/products", json!([])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, products) = ctx.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 3);
    assert_eq!(products[0]["sku"], "QP-SHIRT-001");
}

#[tokio::test]
async fn test_stale_product_revision_rejects_whole_save() {
    let ctx = TestContext::new().await;

    ctx.post("/api/products", json!([{ "sku": "A-1", "name": "A", "price": 1 }]))
        .await;

    let (status, _) = ctx
        .post(
            "/api/products",
            json!([{ "sku": "A-1", "name": "A v2", "price": 2, "revision": 1 }]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // A second editor still holding revision 1.
    let (status, body) = ctx
        .post(
            "/api/products",
            json!([
                { "sku": "A-1", "name": "A v3", "price": 3, "revision": 1 },
                { "sku": "B-1", "name": "B", "price": 5 },
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (_, products) = ctx.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 1);
    assert_eq!(products[0]["name"], "A v2");
    assert_eq!(products[0]["revision"], 2);
}

#[tokio::test]
async fn test_save_rejects_invalid_products() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post("/api/products", json!([{ "sku": "A-1", "name": "A", "price": -5 }]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .post(
            "/api/products",
            json!([
                { "sku": "A-1", "name": "A", "price": 1 },
                { "sku": "A-1", "name": "Again", "price": 2 },
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("A-1"));

    let (status, _) = ctx
        .post(
            "/api/products",
            json!([{ "sku": "A-1", "name": "A", "price": 1, "status": "sold" }]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(count_rows(&ctx.pool, "products").await, 0);
}
