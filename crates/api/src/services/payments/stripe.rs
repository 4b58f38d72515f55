//! Stripe payment adapter.
//!
//! Talks to the Stripe REST API directly: form-encoded requests, amounts in
//! minor units, bearer auth with the secret key. Intents are created with
//! manual capture so settlement happens through the capture endpoint.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::StripeConfig;

use super::{PaymentCapture, PaymentError, PaymentIntent, PaymentProvider, provider_error, to_minor_units};

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Stripe REST API client.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
    status: String,
}

impl StripeGateway {
    /// Create a new Stripe gateway.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            base_url: STRIPE_API_BASE.to_owned(),
        }
    }
}

impl PaymentProvider for StripeGateway {
    async fn create_intent(
        &self,
        amount: rust_decimal::Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let cents = to_minor_units(amount)?;
        let params = [
            ("amount", cents.to_string()),
            ("currency", currency.to_lowercase()),
            ("capture_method", "manual".to_owned()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("stripe", response).await);
        }

        let intent: IntentResponse = response.json().await?;
        let client_token = intent.client_secret.unwrap_or_else(|| intent.id.clone());

        Ok(PaymentIntent {
            id: intent.id,
            client_token,
        })
    }

    async fn capture(&self, provider_order_id: &str) -> Result<PaymentCapture, PaymentError> {
        let response = self
            .client
            .post(format!(
                "{}/v1/payment_intents/{provider_order_id}/capture",
                self.base_url
            ))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        // A declined capture is a settled "no", not a transport failure.
        if response.status() == StatusCode::PAYMENT_REQUIRED {
            return Ok(PaymentCapture {
                success: false,
                transaction_id: None,
            });
        }

        if !response.status().is_success() {
            return Err(provider_error("stripe", response).await);
        }

        let intent: IntentResponse = response.json().await?;

        Ok(PaymentCapture {
            success: intent.status == "succeeded",
            transaction_id: Some(intent.id),
        })
    }
}
