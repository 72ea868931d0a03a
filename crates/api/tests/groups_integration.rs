//! Integration tests for recipient groups.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL environment variable or use docker-compose.

mod common;

use axum::http::StatusCode;
use common::{count_rows, create_test_customer, TestContext, TestCustomer};
use serde_json::json;

#[tokio::test]
async fn test_create_and_list_groups() {
    let ctx = TestContext::new().await;
    let first = create_test_customer(&ctx, &TestCustomer::new()).await;
    let second = create_test_customer(&ctx, &TestCustomer::new()).await;

    let (status, group) = ctx
        .post(
            "/api/groups",
            json!({
                "name": " Volunteers ",
                "memberIds": [second["id"], first["id"], second["id"]],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", group);
    assert_eq!(group["name"], "Volunteers");
    assert_eq!(group["memberIds"], json!([second["id"], first["id"]]));
    assert!(group["createdAt"].is_string());

    let (status, groups) = ctx.get("/api/groups").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(groups.as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["id"], group["id"]);
    assert_eq!(groups[0]["memberIds"], group["memberIds"]);
}

#[tokio::test]
async fn test_create_group_validation() {
    let ctx = TestContext::new().await;
    let customer = create_test_customer(&ctx, &TestCustomer::new()).await;

    let (status, _) = ctx
        .post("/api/groups", json!({ "name": "Empty", "memberIds": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post("/api/groups", json!({ "memberIds": [customer["id"]] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/groups",
            json!({ "name": "Ghosts", "memberIds": [customer["id"], uuid::Uuid::new_v4()] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(count_rows(&ctx.pool, "groups").await, 0);
    assert_eq!(count_rows(&ctx.pool, "group_members").await, 0);
}

#[tokio::test]
async fn test_delete_group_keeps_customers_and_messages() {
    let ctx = TestContext::new().await;
    let customer = create_test_customer(&ctx, &TestCustomer::new()).await;

    let (_, group) = ctx
        .post(
            "/api/groups",
            json!({ "name": "Donors", "memberIds": [customer["id"]] }),
        )
        .await;
    let (status, _) = ctx
        .post(
            "/api/messages",
            json!({ "groupId": group["id"], "message": "Thank you" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = ctx
        .delete("/api/groups", json!({ "id": group["id"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    assert_eq!(count_rows(&ctx.pool, "groups").await, 0);
    assert_eq!(count_rows(&ctx.pool, "group_members").await, 0);
    assert_eq!(count_rows(&ctx.pool, "customers").await, 1);
    assert_eq!(count_rows(&ctx.pool, "messages").await, 1);

    let (status, _) = ctx
        .delete("/api/groups", json!({ "id": group["id"] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_customer_drops_group_membership() {
    let ctx = TestContext::new().await;
    let first = create_test_customer(&ctx, &TestCustomer::new()).await;
    let second = create_test_customer(&ctx, &TestCustomer::new()).await;

    let (_, group) = ctx
        .post(
            "/api/groups",
            json!({ "name": "Team", "memberIds": [first["id"], second["id"]] }),
        )
        .await;

    ctx.delete("/api/customers", json!({ "id": first["id"] }))
        .await;

    let (_, groups) = ctx.get("/api/groups").await;
    assert_eq!(groups[0]["id"], group["id"]);
    assert_eq!(groups[0]["memberIds"], json!([second["id"]]));
}
