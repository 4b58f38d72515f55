//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::payments::{PaypalGateway, StripeGateway};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and payment gateways.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    stripe: StripeGateway,
    paypal: PaypalGateway,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let stripe = StripeGateway::new(&config.stripe);
        let paypal = PaypalGateway::new(&config.paypal);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                stripe,
                paypal,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Stripe gateway.
    #[must_use]
    pub fn stripe(&self) -> &StripeGateway {
        &self.inner.stripe
    }

    /// Get a reference to the PayPal gateway.
    #[must_use]
    pub fn paypal(&self) -> &PaypalGateway {
        &self.inner.paypal
    }
}
