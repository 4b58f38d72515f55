//! Integration tests for cart behavior.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p melula-api)
//!
//! Run with: cargo test -p melula-integration-tests -- --ignored

use serde_json::{Value, json};

use melula_integration_tests::{
    api_base_url, client, create_product, register_admin, register_user, test_pool, with_auth,
};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_adds_merge_into_one_line() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "15.00", 100).await;
    let product_id = product["id"].as_str().unwrap();

    for quantity in [2, 3] {
        let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
            .json(&json!({"productId": product_id, "quantity": quantity}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = with_auth(client.get(format!("{base}/api/cart")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    let cart: Value = resp.json().await.unwrap();
    let lines = cart.as_array().unwrap();

    assert_eq!(lines.len(), 1, "same product+variant merges into one line");
    assert_eq!(lines[0]["quantity"], 5);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_lists_live_product_data() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "15.00", 100).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": product_id, "quantity": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Reprice: the cart shows the current price, not a snapshot.
    let resp = with_auth(
        client.put(format!("{base}/api/products/{product_id}")),
        &admin.firebase_uid,
    )
    .json(&json!({"price": "22.50"}))
    .send()
    .await
    .unwrap();
    assert!(resp.status().is_success());

    let resp = with_auth(client.get(format!("{base}/api/cart")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart[0]["product"]["price"], "22.50");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_invalid_quantity_rejected() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "15.00", 100).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": product_id, "quantity": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Add a valid line, then try to zero it out.
    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": product_id, "quantity": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let item: Value = resp.json().await.unwrap();
    let item_id = item["id"].as_str().unwrap();

    let resp = with_auth(
        client.put(format!("{base}/api/cart/{item_id}")),
        &user.firebase_uid,
    )
    .json(&json!({"quantity": 0}))
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_remove_and_clear_are_idempotent() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "15.00", 100).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": product_id, "quantity": 1}))
        .send()
        .await
        .unwrap();
    let item: Value = resp.json().await.unwrap();
    let item_id = item["id"].as_str().unwrap();

    // Remove twice: both succeed.
    for _ in 0..2 {
        let resp = with_auth(
            client.delete(format!("{base}/api/cart/{item_id}")),
            &user.firebase_uid,
        )
        .send()
        .await
        .unwrap();
        assert_eq!(resp.status(), 204);
    }

    // Clear an already-empty cart: succeeds.
    let resp = with_auth(client.delete(format!("{base}/api/cart")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_cart_requires_auth() {
    let client = client();
    let base = api_base_url();

    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
