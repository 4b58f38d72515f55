//! Integration tests for order placement and lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p melula-api)
//!
//! Run with: cargo test -p melula-integration-tests -- --ignored

use serde_json::{Value, json};

use melula_integration_tests::{
    api_base_url, client, create_product, product_stock, register_admin, register_user,
    single_line_order, test_pool, with_auth,
};

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_place_order_decrements_stock_and_clears_cart() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "25.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    // Put something in the cart so placement has something to clear.
    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": product_id, "quantity": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&single_line_order(product_id, 2, "25.00"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let order: Value = resp.json().await.unwrap();
    assert!(
        order["orderNumber"].as_str().unwrap().starts_with("ORD-"),
        "order number should carry the ORD prefix"
    );
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentStatus"], "pending");
    assert_eq!(order["total"], "50.00");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    // Stock decremented by the purchased quantity.
    assert_eq!(product_stock(&client, product_id).await, 8);

    // Cart cleared.
    let resp = with_auth(client.get(format!("{base}/api/cart")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    let cart: Value = resp.json().await.unwrap();
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_inconsistent_totals_rejected_without_side_effects() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "10.00", 5).await;
    let product_id = product["id"].as_str().unwrap();

    let mut order = single_line_order(product_id, 1, "10.00");
    order["total"] = json!("999.00");

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&order)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Nothing was persisted.
    assert_eq!(product_stock(&client, product_id).await, 5);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_insufficient_stock_rolls_back_whole_order() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let in_stock = create_product(&client, &admin, "10.00", 50).await;
    let scarce = create_product(&client, &admin, "20.00", 1).await;
    let in_stock_id = in_stock["id"].as_str().unwrap();
    let scarce_id = scarce["id"].as_str().unwrap();

    // Keep a cart line around to verify the clear is rolled back too.
    let resp = with_auth(client.post(format!("{base}/api/cart")), &user.firebase_uid)
        .json(&json!({"productId": in_stock_id, "quantity": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Two lines; the second exceeds stock. The first line's decrement must
    // be rolled back along with everything else.
    let order = json!({
        "items": [
            {"productId": in_stock_id, "quantity": 2, "price": "10.00"},
            {"productId": scarce_id, "quantity": 3, "price": "20.00"},
        ],
        "shippingAddress": melula_integration_tests::shipping_address(),
        "paymentMethod": "stripe",
        "subtotal": "80.00",
        "tax": "0.00",
        "shipping": "0.00",
        "total": "80.00",
    });

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&order)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // All-or-nothing: no decrement on either product, cart untouched,
    // no order visible.
    assert_eq!(product_stock(&client, in_stock_id).await, 50);
    assert_eq!(product_stock(&client, scarce_id).await, 1);

    let resp = with_auth(client.get(format!("{base}/api/cart")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    let cart: Value = resp.json().await.unwrap();
    assert_eq!(cart.as_array().unwrap().len(), 1);

    let resp = with_auth(client.get(format!("{base}/api/orders")), &user.firebase_uid)
        .send()
        .await
        .unwrap();
    let orders: Value = resp.json().await.unwrap();
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_checkouts_of_last_unit() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let alice = register_user(&client).await;
    let bob = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "99.99", 1).await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    let place = |uid: String, product_id: String| {
        let client = client.clone();
        let base = base.clone();
        async move {
            with_auth(client.post(format!("{base}/api/orders")), &uid)
                .json(&single_line_order(&product_id, 1, "99.99"))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }
    };

    let (a, b) = tokio::join!(
        place(alice.firebase_uid.clone(), product_id.clone()),
        place(bob.firebase_uid.clone(), product_id.clone()),
    );

    let mut statuses = [a, b];
    statuses.sort_unstable();
    assert_eq!(
        statuses,
        [201, 400],
        "exactly one checkout wins the last unit"
    );

    assert_eq!(product_stock(&client, &product_id).await, 0);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_price_immutability_after_catalog_change() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "25.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&single_line_order(product_id, 1, "25.00"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let order: Value = resp.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    // Reprice the product afterwards.
    let resp = with_auth(
        client.put(format!("{base}/api/products/{product_id}")),
        &admin.firebase_uid,
    )
    .json(&json!({"price": "999.99"}))
    .send()
    .await
    .unwrap();
    assert!(resp.status().is_success());

    // The order's captured price and total are unchanged.
    let resp = with_auth(
        client.get(format!("{base}/api/orders/{order_id}")),
        &user.firebase_uid,
    )
    .send()
    .await
    .unwrap();
    let order: Value = resp.json().await.unwrap();
    assert_eq!(order["items"][0]["price"], "25.00");
    assert_eq!(order["total"], "25.00");
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_status_transition_guard() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "10.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&single_line_order(product_id, 1, "10.00"))
        .send()
        .await
        .unwrap();
    let order: Value = resp.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    let set_status = |status: &'static str| {
        let client = client.clone();
        let base = base.clone();
        let uid = admin.firebase_uid.clone();
        let order_id = order_id.to_owned();
        async move {
            with_auth(client.put(format!("{base}/api/orders/{order_id}/status")), &uid)
                .json(&json!({"status": status}))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }
    };

    // Skipping ahead is rejected.
    assert_eq!(set_status("shipped").await, 400);

    // The forward path works one step at a time.
    assert_eq!(set_status("confirmed").await, 200);
    assert_eq!(set_status("processing").await, 200);
    assert_eq!(set_status("shipped").await, 200);

    // Backward and terminal transitions are rejected.
    assert_eq!(set_status("pending").await, 400);
    assert_eq!(set_status("cancelled").await, 400);

    assert_eq!(set_status("delivered").await, 200);
    assert_eq!(set_status("cancelled").await, 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_customer_cancel_while_pending() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "10.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/orders")), &user.firebase_uid)
        .json(&single_line_order(product_id, 1, "10.00"))
        .send()
        .await
        .unwrap();
    let order: Value = resp.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    let resp = with_auth(
        client.post(format!("{base}/api/orders/{order_id}/cancel")),
        &user.firebase_uid,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);
    let cancelled: Value = resp.json().await.unwrap();
    assert_eq!(cancelled["status"], "cancelled");

    // Cancelling again is rejected: cancelled is terminal.
    let resp = with_auth(
        client.post(format!("{base}/api/orders/{order_id}/cancel")),
        &user.firebase_uid,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_order_detail_restricted_to_owner_or_admin() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let owner = register_user(&client).await;
    let stranger = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "10.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let resp = with_auth(client.post(format!("{base}/api/orders")), &owner.firebase_uid)
        .json(&single_line_order(product_id, 1, "10.00"))
        .send()
        .await
        .unwrap();
    let order: Value = resp.json().await.unwrap();
    let order_id = order["id"].as_str().unwrap();

    let url = format!("{base}/api/orders/{order_id}");

    let resp = with_auth(client.get(&url), &stranger.firebase_uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = with_auth(client.get(&url), &owner.firebase_uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = with_auth(client.get(&url), &admin.firebase_uid)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
