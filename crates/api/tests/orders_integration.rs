//! Integration tests for order administration.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::StatusCode;
use common::{count_rows, TestContext};
use serde_json::{json, Value};

fn order(id: &str, at: &str, total: i64) -> Value {
    json!({
        "id": id,
        "at": at,
        "personName": "Walk-in",
        "customerId": "",
        "email": "walkin@example.com",
        "items": [{ "sku": "QP-SHIRT-001", "name": "QurtubloX T-Shirt", "qty": 1, "price": total }],
        "total": total,
        "status": "open",
    })
}

#[tokio::test]
async fn test_save_and_list_orders_newest_first() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/api/orders",
            json!([
                order("ORD-OLD001", "2024-03-01T10:00:00Z", 25),
                order("ORD-NEW001", "2024-03-02T10:00:00Z", 45),
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["saved"], 2);

    let (status, orders) = ctx.get("/api/orders").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = orders
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["ORD-NEW001", "ORD-OLD001"]);
    assert!(orders[0]["customerId"].is_null());
    assert_eq!(orders[0]["adminNote"], "");
    assert_eq!(orders[0]["items"][0]["qty"], 1);
}

#[tokio::test]
async fn test_save_orders_removes_missing() {
    let ctx = TestContext::new().await;

    ctx.post(
        "/api/orders",
        json!([
            order("ORD-A00001", "2024-03-01T10:00:00Z", 25),
            order("ORD-B00001", "2024-03-02T10:00:00Z", 45),
        ]),
    )
    .await;

    let (status, body) = ctx
        .post(
            "/api/orders",
            json!([order("ORD-A00001", "2024-03-01T10:00:00Z", 25)]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);
    assert_eq!(count_rows(&ctx.pool, "orders").await, 1);
}

#[tokio::test]
async fn test_update_order_status_and_note() {
    let ctx = TestContext::new().await;
    ctx.post(
        "/api/orders",
        json!([order("ORD-UPD001", "2024-03-01T10:00:00Z", 25)]),
    )
    .await;

    let (status, body) = ctx
        .put(
            "/api/orders/ORD-UPD001",
            json!({ "status": "completed", "adminNote": "Picked up at the event" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["adminNote"], "Picked up at the event");
    assert_eq!(body["revision"], 2);

    // Absent fields keep their value.
    let (status, body) = ctx
        .put("/api/orders/ORD-UPD001", json!({ "status": "open" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "open");
    assert_eq!(body["adminNote"], "Picked up at the event");
}

#[tokio::test]
async fn test_update_order_stale_revision_and_unknown_id() {
    let ctx = TestContext::new().await;
    ctx.post(
        "/api/orders",
        json!([order("ORD-REV001", "2024-03-01T10:00:00Z", 25)]),
    )
    .await;

    let (status, _) = ctx
        .put(
            "/api/orders/ORD-REV001",
            json!({ "status": "completed", "revision": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .put(
            "/api/orders/ORD-REV001",
            json!({ "adminNote": "late edit", "revision": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    let (status, _) = ctx
        .put("/api/orders/ORD-NOPE00", json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .put("/api/orders/ORD-REV001", json!({ "status": "shipped" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_orders_stale_revision_rolls_back() {
    let ctx = TestContext::new().await;
    ctx.post(
        "/api/orders",
        json!([order("ORD-COL001", "2024-03-01T10:00:00Z", 25)]),
    )
    .await;
    ctx.put("/api/orders/ORD-COL001", json!({ "status": "completed" }))
        .await;

    let mut stale = order("ORD-COL001", "2024-03-01T10:00:00Z", 25);
    stale["revision"] = json!(1);
    let (status, _) = ctx
        .post(
            "/api/orders",
            json!([stale, order("ORD-COL002", "2024-03-02T10:00:00Z", 45)]),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let (_, orders) = ctx.get("/api/orders").await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "completed");
}

#[tokio::test]
async fn test_save_orders_rejects_duplicates_and_negative_totals() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/api/orders",
            json!([
                order("ORD-DUP001", "2024-03-01T10:00:00Z", 25),
                order("ORD-DUP001", "2024-03-02T10:00:00Z", 45),
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/orders",
            json!([order("ORD-NEG001", "2024-03-01T10:00:00Z", -1)]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(count_rows(&ctx.pool, "orders").await, 0);
}
