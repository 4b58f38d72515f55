//! Payment capture adapters.
//!
//! The order flow talks to Stripe and PayPal through the same two-method
//! shape: create an intent for an amount, then capture it by provider order
//! id. Provider-specific request/response formats stay inside each adapter.

pub mod paypal;
pub mod stripe;

use rust_decimal::Decimal;
use thiserror::Error;

pub use paypal::PaypalGateway;
pub use stripe::StripeGateway;

/// Errors from payment provider calls.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The HTTP request itself failed.
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The amount cannot be represented in the provider's minor units.
    #[error("invalid payment amount: {0}")]
    InvalidAmount(Decimal),

    /// No adapter exists for this payment method.
    #[error("unsupported payment method: {0}")]
    UnsupportedMethod(String),
}

/// A created payment intent: the provider-side id plus the token the client
/// needs to continue the flow (Stripe's client secret, PayPal's order id).
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub client_token: String,
}

/// Outcome of a capture attempt.
#[derive(Debug, Clone)]
pub struct PaymentCapture {
    pub success: bool,
    pub transaction_id: Option<String>,
}

/// The uniform provider interface the order flow consumes.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Create a payment intent for `amount` in `currency`.
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Capture a previously created provider order / intent.
    async fn capture(&self, provider_order_id: &str) -> Result<PaymentCapture, PaymentError>;
}

/// Dispatch a capture to the adapter matching the order's payment method.
///
/// # Errors
///
/// Returns `PaymentError::UnsupportedMethod` for a method no adapter
/// handles, otherwise whatever the adapter returns.
pub async fn capture_for_method(
    stripe: &StripeGateway,
    paypal: &PaypalGateway,
    method: &str,
    provider_order_id: &str,
) -> Result<PaymentCapture, PaymentError> {
    match method {
        "stripe" => stripe.capture(provider_order_id).await,
        "paypal" => paypal.capture(provider_order_id).await,
        other => Err(PaymentError::UnsupportedMethod(other.to_owned())),
    }
}

/// Build a `Provider` error from a non-success response, consuming its body.
pub(crate) async fn provider_error(
    provider: &'static str,
    response: reqwest::Response,
) -> PaymentError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_owned());
    // Provider error bodies can be verbose; keep logs and Sentry readable.
    let message = message.chars().take(512).collect();
    PaymentError::Provider {
        provider,
        status,
        message,
    }
}

/// Convert a decimal major-unit amount into integer minor units (cents).
///
/// # Errors
///
/// Returns `PaymentError::InvalidAmount` for negative amounts, amounts with
/// sub-cent precision, or amounts too large for an `i64`.
pub(crate) fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    use rust_decimal::prelude::ToPrimitive;

    if amount.is_sign_negative() {
        return Err(PaymentError::InvalidAmount(amount));
    }

    let cents = amount * Decimal::from(100);
    if cents.fract() != Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(amount));
    }

    cents.to_i64().ok_or(PaymentError::InvalidAmount(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)).unwrap(), 1999);
        assert_eq!(to_minor_units(Decimal::new(0, 2)).unwrap(), 0);
        assert_eq!(to_minor_units(Decimal::from(100)).unwrap(), 10_000);
    }

    #[test]
    fn test_to_minor_units_rejects_negative() {
        assert!(matches!(
            to_minor_units(Decimal::new(-100, 2)),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_to_minor_units_rejects_sub_cent() {
        assert!(matches!(
            to_minor_units(Decimal::new(1999, 3)),
            Err(PaymentError::InvalidAmount(_))
        ));
    }
}
