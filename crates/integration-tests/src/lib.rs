//! Integration tests for Melula.
//!
//! # Running Tests
//!
//! These tests drive a live API server over HTTP and need direct database
//! access for setup that has no public endpoint (promoting a test user to
//! admin). They are `#[ignore]`d by default.
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p melula-cli -- migrate
//!
//! # Start the API server
//! cargo run -p melula-api
//!
//! # Run integration tests
//! cargo test -p melula-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `MELULA_API_URL` - Base URL of the running server (default:
//!   `http://localhost:3000`)
//! - `MELULA_DATABASE_URL` - `PostgreSQL` connection string for test setup

use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("MELULA_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client for tests.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to the test database for setup the API doesn't expose.
///
/// # Panics
///
/// Panics if `MELULA_DATABASE_URL` is unset or unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("MELULA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("MELULA_DATABASE_URL must be set for integration tests");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// A registered test user.
pub struct TestUser {
    pub id: String,
    pub firebase_uid: String,
    pub email: String,
}

/// Attach the auth headers the API resolves identity from.
#[must_use]
pub fn with_auth(rb: RequestBuilder, firebase_uid: &str) -> RequestBuilder {
    rb.header("Authorization", "Bearer test-token")
        .header("x-firebase-uid", firebase_uid)
}

/// Register a fresh user with a random identity.
///
/// # Panics
///
/// Panics if registration fails.
pub async fn register_user(client: &Client) -> TestUser {
    let firebase_uid = format!("test-{}", Uuid::new_v4());
    let email = format!("{firebase_uid}@example.com");

    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&json!({
            "firebaseUid": firebase_uid,
            "email": email,
            "name": "Test User",
        }))
        .send()
        .await
        .expect("Failed to register test user");

    assert!(resp.status().is_success(), "registration failed");
    let body: Value = resp.json().await.expect("Failed to parse registration");

    TestUser {
        id: body["id"].as_str().expect("user id").to_owned(),
        firebase_uid,
        email,
    }
}

/// Register a fresh user and promote it to admin via the database.
///
/// # Panics
///
/// Panics if registration or promotion fails.
pub async fn register_admin(client: &Client, pool: &PgPool) -> TestUser {
    let user = register_user(client).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE firebase_uid = $1")
        .bind(&user.firebase_uid)
        .execute(pool)
        .await
        .expect("Failed to promote test user to admin");

    user
}

/// Create a product through the admin API; returns the product JSON.
///
/// # Panics
///
/// Panics if creation fails.
pub async fn create_product(
    client: &Client,
    admin: &TestUser,
    price: &str,
    stock: i32,
) -> Value {
    let sku = format!("TEST-{}", Uuid::new_v4());
    let resp = with_auth(
        client.post(format!("{}/api/products", api_base_url())),
        &admin.firebase_uid,
    )
    .json(&json!({
        "name": format!("Test Product {sku}"),
        "description": "Integration test product",
        "price": price,
        "sku": sku,
        "stock": stock,
    }))
    .send()
    .await
    .expect("Failed to create test product");

    assert_eq!(resp.status(), 201, "product creation failed");
    resp.json().await.expect("Failed to parse product")
}

/// A well-formed shipping address payload.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "name": "Test Recipient",
        "street": "1 Test Street",
        "city": "Testville",
        "state": "TS",
        "zipCode": "00001",
        "country": "US",
    })
}

/// Build an order payload for a single product line.
#[must_use]
pub fn single_line_order(product_id: &str, quantity: i32, unit_price: &str) -> Value {
    // Totals must add up; tax and shipping stay zero for simplicity.
    let price: f64 = unit_price.parse().expect("numeric price");
    let subtotal = format!("{:.2}", price * f64::from(quantity));
    json!({
        "items": [{
            "productId": product_id,
            "quantity": quantity,
            "price": unit_price,
        }],
        "shippingAddress": shipping_address(),
        "paymentMethod": "stripe",
        "subtotal": subtotal,
        "tax": "0.00",
        "shipping": "0.00",
        "total": subtotal,
    })
}

/// Read a product's current stock straight from the API.
///
/// # Panics
///
/// Panics if the product cannot be fetched.
pub async fn product_stock(client: &Client, product_id: &str) -> i64 {
    let resp = client
        .get(format!("{}/api/products/{product_id}", api_base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    assert!(resp.status().is_success());
    let body: Value = resp.json().await.expect("Failed to parse product");
    body["stock"].as_i64().expect("stock")
}
