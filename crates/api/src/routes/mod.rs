//! HTTP route handlers for the Melula API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB connectivity)
//!
//! # Auth & users
//! POST /api/auth/register               - Create user record
//! GET  /api/auth/me                     - Current user (auth)
//! PUT  /api/users/{uid}                 - Update own profile (auth)
//! PUT  /api/users/{uid}/profile-image   - Update own avatar (auth)
//!
//! # Catalog
//! GET  /api/products                    - Filtered product listing
//! GET  /api/products/{id}               - Product detail
//! GET  /api/products/{id}/reviews       - Reviews for a product
//! POST /api/products                    - Create product (admin)
//! PUT  /api/products/{id}               - Update product (admin)
//! DELETE /api/products/{id}             - Soft-delete product (admin)
//! GET  /api/categories                  - Category listing
//! POST/PUT/DELETE /api/categories...    - Category management (admin)
//!
//! # Cart & wishlist (auth)
//! GET/POST /api/cart, PUT/DELETE /api/cart/{id}, DELETE /api/cart
//! GET/POST /api/wishlist, DELETE /api/wishlist/{id}
//! GET  /api/wishlist/check/{productId}
//!
//! # Orders (auth)
//! GET  /api/orders                      - Own orders (all for admins)
//! GET  /api/orders/{id}                 - Order detail (owner or admin)
//! POST /api/orders                      - Place order
//! POST /api/orders/{id}/cancel          - Cancel while still cancellable
//! POST /api/orders/{id}/capture         - Capture payment
//! PUT  /api/orders/{id}/status          - Transition status (admin)
//!
//! # Other
//! GET/POST/PUT/DELETE /api/addresses... - Address book (auth)
//! POST /api/reviews                     - Create review (auth)
//! GET  /api/admin/*                     - Dashboard, export, users (admin)
//! GET  /api/analytics/visitors          - Visitor counters
//! POST /api/payments/intent             - Stripe payment intent (auth)
//! GET/POST /api/payments/paypal/*       - PayPal setup/order/capture
//! ```

pub mod addresses;
pub mod admin;
pub mod analytics;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod users;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/me", get(users::me))
}

/// Create the user profile routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/{uid}", put(users::update_profile))
        .route("/{uid}/profile-image", put(users::update_profile_image))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/reviews", get(reviews::for_product))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            put(categories::update).delete(categories::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::index).post(cart::add).delete(cart::clear))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).post(wishlist::add))
        .route("/{id}", delete(wishlist::remove))
        .route("/check/{product_id}", get(wishlist::check))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/capture", post(orders::capture))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::remove),
        )
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/export", get(admin::export))
        .route("/users", get(admin::users))
        .route("/users/{id}/role", put(admin::update_role))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/intent", post(payments::create_intent))
        .route("/paypal/setup", get(payments::paypal_setup))
        .route("/paypal/order", post(payments::paypal_order))
        .route(
            "/paypal/order/{order_id}/capture",
            post(payments::paypal_capture),
        )
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/addresses", address_routes())
        .route("/api/reviews", post(reviews::create))
        .nest("/api/admin", admin_routes())
        .route("/api/analytics/visitors", get(analytics::visitors))
        .nest("/api/payments", payment_routes())
}
