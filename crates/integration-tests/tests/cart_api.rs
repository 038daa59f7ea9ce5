//! Integration tests for the cart JSON API.
//!
//! Each test builds a fresh in-memory storefront and drives it through the
//! public router, checking status codes, response shapes and the stored state.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use cartwheel_core::{CartStatus, Owner, ProductId, SessionKey, StockPolicy, UserId};
use cartwheel_integration_tests::{As, TestContext};
use cartwheel_storefront::db::CartStore;

fn session_owner(key: &str) -> Owner {
    Owner::Session(SessionKey::parse(key).unwrap())
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::new();

    let resp = ctx.get("/health", As::Anonymous).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = ctx.get("/health/ready", As::Anonymous).await;
    assert_eq!(resp.status, StatusCode::OK);
}

// =============================================================================
// Owner Resolution
// =============================================================================

#[tokio::test]
async fn test_missing_owner_is_bad_request() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart", As::Anonymous).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["kind"], "bad_request");
}

#[tokio::test]
async fn test_unknown_bearer_is_unauthorized() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart", As::Bearer("stolen")).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["error"]["kind"], "unauthorized");
}

#[tokio::test]
async fn test_bearer_wins_over_session() {
    let ctx = TestContext::new();
    let resp = ctx
        .get(
            "/api/cart",
            As::Both {
                token: "alice-token",
                session: "guest-1",
            },
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["owner"], json!({"type": "user", "id": 1}));
    assert_eq!(ctx.carts.active_cart_count(&session_owner("guest-1")).await, 0);
}

#[tokio::test]
async fn test_tokens_registered_later_resolve() {
    let ctx = TestContext::new();
    ctx.identity.insert("bob-token", UserId::new(2)).await;

    let resp = ctx.get("/api/cart", As::Bearer("bob-token")).await;
    assert_eq!(resp.body["owner"]["id"], 2);
}

// =============================================================================
// Line Mutations
// =============================================================================

#[tokio::test]
async fn test_add_item_then_increment() {
    let ctx = TestContext::new();
    let who = As::Session("guest-1");

    let resp = ctx
        .send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 10})))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["line"]["quantity"], 1);

    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/items",
            who,
            Some(json!({"productId": 10, "quantity": 2})),
        )
        .await;
    assert_eq!(resp.body["line"]["quantity"], 3);
    assert_eq!(resp.body["cart"]["itemCount"], 3);
    assert_eq!(resp.body["cart"]["total"], "15.00");
    assert_eq!(resp.body["cart"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let ctx = TestContext::new();
    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/items",
            As::Session("guest-1"),
            Some(json!({"productId": 999})),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"]["kind"], "product_not_found");
    assert_eq!(ctx.carts.cart_count().await, 0);
}

#[tokio::test]
async fn test_add_beyond_stock_is_conflict() {
    let ctx = TestContext::new();
    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/items",
            As::Session("guest-1"),
            Some(json!({"productId": 30, "quantity": 3})),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["error"]["kind"], "insufficient_stock");
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let ctx = TestContext::new();
    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/items",
            As::Session("guest-1"),
            Some(json!({"productId": 10, "quantity": 0})),
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["error"]["kind"], "invalid_quantity");
}

#[tokio::test]
async fn test_cumulative_policy_over_http() {
    let ctx = TestContext::with_policy(StockPolicy::Cumulative);
    let who = As::Session("guest-1");

    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/items",
            who,
            Some(json!({"productId": 30, "quantity": 2})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = ctx
        .send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 30})))
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_patch_zero_removes_line() {
    let ctx = TestContext::new();
    let who = As::Session("guest-1");
    ctx.send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 10})))
        .await;
    ctx.send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 20})))
        .await;

    let resp = ctx
        .send(Method::PATCH, "/api/cart/items/10", who, Some(json!({"quantity": 0})))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.get("line").is_none());
    let items = resp.body["cart"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["productId"], 20);
}

#[tokio::test]
async fn test_patch_missing_line_is_not_found() {
    let ctx = TestContext::new();
    let resp = ctx
        .send(
            Method::PATCH,
            "/api/cart/items/10",
            As::Session("guest-1"),
            Some(json!({"quantity": 2})),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"]["kind"], "item_not_found");
}

#[tokio::test]
async fn test_delete_item_and_clear() {
    let ctx = TestContext::new();
    let who = As::Bearer("alice-token");
    ctx.send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 10})))
        .await;
    ctx.send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 20})))
        .await;

    let resp = ctx.send(Method::DELETE, "/api/cart/items/10", who, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["itemCount"], 1);

    let resp = ctx.send(Method::DELETE, "/api/cart/items/10", who, None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let resp = ctx.send(Method::DELETE, "/api/cart", who, None).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["itemCount"], 0);
        assert_eq!(resp.body["items"], json!([]));
    }
}

// =============================================================================
// Summary
// =============================================================================

#[tokio::test]
async fn test_summary_without_cart_creates_nothing() {
    let ctx = TestContext::new();
    let resp = ctx.get("/api/cart/summary", As::Session("ghost")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["itemCount"], 0);
    assert_eq!(resp.body["items"], json!([]));
    assert_eq!(ctx.carts.cart_count().await, 0);
}

#[tokio::test]
async fn test_summary_includes_snapshots_and_tolerates_catalog_gaps() {
    let ctx = TestContext::new();
    let who = As::Session("guest-1");
    ctx.send(Method::POST, "/api/cart/items", who, Some(json!({"productId": 10})))
        .await;

    let resp = ctx.get("/api/cart/summary", who).await;
    assert_eq!(
        resp.body["items"][0]["productSnapshot"]["name"],
        "Product 10"
    );
    assert_eq!(resp.body["total"], "5.00");

    // Price changes do not reach existing lines.
    ctx.catalog
        .set_price(ProductId::new(10), cartwheel_core::Price::from_cents(100))
        .await;
    let resp = ctx.get("/api/cart/summary", who).await;
    assert_eq!(resp.body["items"][0]["unitPrice"], "5.00");
}

// =============================================================================
// Merge
// =============================================================================

#[tokio::test]
async fn test_merge_requires_both_identities() {
    let ctx = TestContext::new();

    let resp = ctx
        .send(Method::POST, "/api/cart/merge", As::Session("guest-1"), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = ctx
        .send(Method::POST, "/api/cart/merge", As::Bearer("alice-token"), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_merge_sums_overlapping_lines() {
    let ctx = TestContext::new();
    let guest = As::Session("guest-1");
    let alice = As::Bearer("alice-token");

    ctx.send(
        Method::POST,
        "/api/cart/items",
        alice,
        Some(json!({"productId": 10, "quantity": 1})),
    )
    .await;
    ctx.send(
        Method::POST,
        "/api/cart/items",
        guest,
        Some(json!({"productId": 10, "quantity": 2})),
    )
    .await;
    ctx.send(Method::POST, "/api/cart/items", guest, Some(json!({"productId": 20})))
        .await;

    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/merge",
            As::Both {
                token: "alice-token",
                session: "guest-1",
            },
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["owner"]["id"], 1);
    assert_eq!(resp.body["itemCount"], 4);
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 2);

    let user = Owner::User(UserId::new(1));
    assert_eq!(ctx.carts.active_cart_count(&user).await, 1);
    assert!(
        ctx.carts
            .find_active(&session_owner("guest-1"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_login_merge_without_any_cart_creates_one() {
    let ctx = TestContext::new();
    let resp = ctx
        .send(
            Method::POST,
            "/api/cart/merge",
            As::Both {
                token: "alice-token",
                session: "fresh",
            },
            None,
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["status"], CartStatus::Active.to_string());
    assert_eq!(resp.body["itemCount"], 0);
    assert_eq!(ctx.carts.cart_count().await, 1);
}
