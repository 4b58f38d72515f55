//! PayPal payment adapter.
//!
//! Uses the PayPal REST API: a client-credentials OAuth token per call,
//! JSON order creation under `/v2/checkout/orders`, and capture by order id.
//! Amounts go over the wire as decimal strings, as PayPal expects.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::PaypalConfig;

use super::{PaymentCapture, PaymentError, PaymentIntent, PaymentProvider, provider_error};

const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";
const LIVE_API_BASE: &str = "https://api-m.paypal.com";

/// PayPal REST API client.
pub struct PaypalGateway {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    base_url: &'static str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
}

impl PaypalGateway {
    /// Create a new PayPal gateway.
    #[must_use]
    pub fn new(config: &PaypalConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            base_url: if config.sandbox {
                SANDBOX_API_BASE
            } else {
                LIVE_API_BASE
            },
        }
    }

    /// Fetch a server-side access token via client credentials.
    async fn access_token(&self) -> Result<String, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("paypal", response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Fetch a client token for initializing the browser SDK.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the token request fails.
    pub async fn client_token(&self) -> Result<String, PaymentError> {
        let response = self
            .client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(self.client_secret.expose_secret()))
            .form(&[
                ("grant_type", "client_credentials"),
                ("response_type", "client_token"),
                ("intent", "sdk_init"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("paypal", response).await);
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

impl PaymentProvider for PaypalGateway {
    async fn create_intent(
        &self,
        amount: rust_decimal::Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount.is_sign_negative() || amount.is_zero() {
            return Err(PaymentError::InvalidAmount(amount));
        }

        let token = self.access_token().await?;
        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": currency,
                    "value": amount.to_string(),
                },
            }],
        });

        let response = self
            .client
            .post(format!("{}/v2/checkout/orders", self.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("paypal", response).await);
        }

        let order: OrderResponse = response.json().await?;

        // For PayPal the browser SDK continues the flow with the order id.
        Ok(PaymentIntent {
            client_token: order.id.clone(),
            id: order.id,
        })
    }

    async fn capture(&self, provider_order_id: &str) -> Result<PaymentCapture, PaymentError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{provider_order_id}/capture",
                self.base_url
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error("paypal", response).await);
        }

        let order: OrderResponse = response.json().await?;

        Ok(PaymentCapture {
            success: order.status == "COMPLETED",
            transaction_id: Some(order.id),
        })
    }
}
