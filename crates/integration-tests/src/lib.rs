//! Integration tests for Cartwheel.
//!
//! Tests drive the full axum router in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory collaborators, so no
//! database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartwheel-integration-tests
//! ```

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use cartwheel_core::{Price, ProductId, StockPolicy, UserId};
use cartwheel_storefront::config::StorefrontConfig;
use cartwheel_storefront::db::{Backends, MemoryCartStore, MemoryCatalog, MemoryIdentityResolver};
use cartwheel_storefront::models::CatalogProduct;
use cartwheel_storefront::state::AppState;

/// Largest response body the helpers will buffer.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// An in-process storefront plus handles on its in-memory state.
pub struct TestContext {
    pub app: Router,
    pub carts: MemoryCartStore,
    pub catalog: MemoryCatalog,
    pub identity: MemoryIdentityResolver,
}

/// Who a request is made as.
#[derive(Debug, Clone, Copy)]
pub enum As<'a> {
    Anonymous,
    Session(&'a str),
    Bearer(&'a str),
    Both { token: &'a str, session: &'a str },
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    /// Storefront with the default stock policy and the standard fixtures.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(StockPolicy::Increment)
    }

    /// Storefront with an explicit stock policy and the standard fixtures.
    ///
    /// Fixtures: products 10 (5.00, stock 100), 20 (9.00, stock 100) and
    /// 30 (2.50, stock 2); token `alice-token` for user 1.
    #[must_use]
    pub fn with_policy(stock_policy: StockPolicy) -> Self {
        let carts = MemoryCartStore::new();
        let catalog = MemoryCatalog::with_products([
            product(10, 500, 100),
            product(20, 900, 100),
            product(30, 250, 2),
        ]);
        let identity = MemoryIdentityResolver::with_tokens([("alice-token", UserId::new(1))]);

        let config = StorefrontConfig {
            stock_policy,
            ..StorefrontConfig::default()
        };
        let backends = Backends::memory(carts.clone(), catalog.clone(), identity.clone());
        let app = cartwheel_storefront::app(AppState::new(config, backends));

        Self {
            app,
            carts,
            catalog,
            identity,
        }
    }

    /// Send a request and decode the JSON body (`Value::Null` when empty or not JSON).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(&self, method: Method, uri: &str, who: As<'_>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        let (token, session) = match who {
            As::Anonymous => (None, None),
            As::Session(s) => (None, Some(s)),
            As::Bearer(t) => (Some(t), None),
            As::Both { token, session } => (Some(token), Some(session)),
        };
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(session) = session {
            builder = builder.header("x-session-key", session);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// `GET` shorthand.
    pub async fn get(&self, uri: &str, who: As<'_>) -> TestResponse {
        self.send(Method::GET, uri, who, None).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a catalog product fixture.
#[must_use]
pub fn product(id: i32, cents: i64, stock: u32) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Price::from_cents(cents),
        available_stock: stock,
        image_url: Some(format!("/static/products/{id}.png")),
    }
}
