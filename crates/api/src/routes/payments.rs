//! Payment route handlers.
//!
//! These endpoints front the provider adapters for the client-side payment
//! flows: Stripe intents for the card form, PayPal setup/order/capture for
//! the PayPal buttons. Settling an order's `paymentStatus` happens through
//! `POST /api/orders/{id}/capture`.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::services::payments::{PaymentIntent, PaymentProvider};
use crate::state::AppState;

/// Payload for `POST /api/payments/intent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response for `POST /api/payments/intent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,
}

/// Create a Stripe payment intent for the checkout amount.
#[instrument(skip_all)]
pub async fn create_intent(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>> {
    if request.amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "amount must be a positive number".to_owned(),
        ));
    }

    let currency = request.currency.as_deref().unwrap_or("usd");
    let intent = state.stripe().create_intent(request.amount, currency).await?;

    Ok(Json(CreateIntentResponse {
        payment_intent_id: intent.id,
        client_secret: intent.client_token,
    }))
}

/// Response for `GET /api/payments/paypal/setup`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaypalSetupResponse {
    pub client_token: String,
}

/// Fetch a PayPal client token for the browser SDK.
#[instrument(skip_all)]
pub async fn paypal_setup(State(state): State<AppState>) -> Result<Json<PaypalSetupResponse>> {
    let client_token = state.paypal().client_token().await?;
    Ok(Json(PaypalSetupResponse { client_token }))
}

/// Payload for `POST /api/payments/paypal/order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaypalOrderRequest {
    pub amount: Decimal,
    pub currency: String,
}

/// Create a PayPal order for the checkout amount.
#[instrument(skip_all)]
pub async fn paypal_order(
    State(state): State<AppState>,
    Json(request): Json<PaypalOrderRequest>,
) -> Result<Json<PaymentIntent>> {
    if request.amount <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "amount must be a positive number".to_owned(),
        ));
    }
    if request.currency.trim().is_empty() {
        return Err(ApiError::Validation("currency is required".to_owned()));
    }

    let intent = state
        .paypal()
        .create_intent(request.amount, &request.currency)
        .await?;

    Ok(Json(intent))
}

/// Response for `POST /api/payments/paypal/order/{orderId}/capture`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaypalCaptureResponse {
    pub success: bool,
    pub transaction_id: Option<String>,
}

/// Capture a PayPal order directly.
#[instrument(skip_all, fields(paypal_order_id = %order_id))]
pub async fn paypal_capture(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PaypalCaptureResponse>> {
    let capture = state.paypal().capture(&order_id).await?;

    Ok(Json(PaypalCaptureResponse {
        success: capture.success,
        transaction_id: capture.transaction_id,
    }))
}
