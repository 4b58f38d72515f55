//! Integration tests for review aggregation.
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

async fn product_aggregates(client: &reqwest::Client, product_id: &str) -> (String, i64) {
    let resp = client
        .get(format!("{}/api/products/{product_id}", api_base_url()))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    (
        body["rating"].as_str().unwrap().to_owned(),
        body["reviewCount"].as_i64().unwrap(),
    )
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_rating_aggregate_recomputed_on_insert() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "30.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    for rating in [5, 3, 4] {
        let reviewer = register_user(&client).await;
        let resp = with_auth(client.post(format!("{base}/api/reviews")), &reviewer.firebase_uid)
            .json(&json!({
                "productId": product_id,
                "rating": rating,
                "comment": "integration test review",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let (rating, count) = product_aggregates(&client, product_id).await;
    assert_eq!(rating, "4.00");
    assert_eq!(count, 3);

    // A fourth review moves the mean to 3.50.
    let reviewer = register_user(&client).await;
    let resp = with_auth(client.post(format!("{base}/api/reviews")), &reviewer.firebase_uid)
        .json(&json!({"productId": product_id, "rating": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let (rating, count) = product_aggregates(&client, product_id).await;
    assert_eq!(rating, "3.50");
    assert_eq!(count, 4);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_reviews_lose_no_updates() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "30.00", 10).await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    // Eight concurrent reviewers; mean of [1..=8 mapped to 1-5 cycle] is
    // computed below from what we actually submit.
    let ratings = [5, 3, 4, 2, 5, 1, 4, 4];
    let mut reviewers = Vec::new();
    for _ in ratings {
        reviewers.push(register_user(&client).await);
    }

    let mut handles = Vec::new();
    for (reviewer, rating) in reviewers.iter().zip(ratings) {
        let client = client.clone();
        let base = base.clone();
        let uid = reviewer.firebase_uid.clone();
        let product_id = product_id.clone();
        handles.push(tokio::spawn(async move {
            with_auth(client.post(format!("{base}/api/reviews")), &uid)
                .json(&json!({"productId": product_id, "rating": rating}))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 201);
    }

    let total: i32 = ratings.iter().sum();
    #[allow(clippy::cast_precision_loss)]
    let expected = format!("{:.2}", f64::from(total) / ratings.len() as f64);

    let (rating, count) = product_aggregates(&client, &product_id).await;
    assert_eq!(count, ratings.len() as i64);
    assert_eq!(rating, expected, "no review insert may be lost");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_out_of_range_rating_rejected() {
    let client = client();
    let pool = test_pool().await;
    let admin = register_admin(&client, &pool).await;
    let user = register_user(&client).await;
    let base = api_base_url();

    let product = create_product(&client, &admin, "30.00", 10).await;
    let product_id = product["id"].as_str().unwrap();

    for rating in [0, 6] {
        let resp = with_auth(client.post(format!("{base}/api/reviews")), &user.firebase_uid)
            .json(&json!({"productId": product_id, "rating": rating}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    let (_, count) = product_aggregates(&client, product_id).await;
    assert_eq!(count, 0);
}
