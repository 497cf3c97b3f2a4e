//! Stripe-backed checkout adapter.
//!
//! Talks to the hosted checkout API over HTTPS and verifies webhook
//! callbacks with the shared endpoint secret. Stripe's wire format never
//! leaves this module; the domain only sees [`CheckoutSession`] and
//! [`PaymentEvent`].

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{
    CheckoutError, CheckoutRequest, CheckoutService, CheckoutSession, PaymentEvent,
};

const CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Form fields for a subscription checkout session.
///
/// The price is defined inline as a monthly recurring plan; the user id
/// travels in the session metadata so the completion webhook can find the
/// wallet to credit.
fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "subscription".to_owned()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("line_items[0][price_data][currency]", "usd".to_owned()),
        (
            "line_items[0][price_data][product_data][name]",
            "Mentoring plan".to_owned(),
        ),
        (
            "line_items[0][price_data][recurring][interval]",
            "month".to_owned(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        ("line_items[0][quantity]", "1".to_owned()),
        ("metadata[user_id]", request.user_id.as_ref().to_owned()),
    ]
}

/// Checkout adapter for the Stripe API.
#[derive(Clone)]
pub struct StripeCheckoutService {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeCheckoutService {
    /// Create an adapter with the account secret key and the webhook
    /// endpoint secret.
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            webhook_secret: webhook_secret.into(),
        }
    }
}

/// Successful response from the checkout session endpoint.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

/// Error envelope Stripe returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Webhook event envelope.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: WebhookObject,
}

#[derive(Debug, Deserialize)]
struct WebhookObject {
    id: String,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    metadata: Option<WebhookMetadata>,
}

#[derive(Debug, Deserialize)]
struct WebhookMetadata {
    #[serde(default)]
    user_id: Option<String>,
}

/// Signature over the timestamped payload, hex encoded.
fn payload_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(timestamp.as_bytes());
    hasher.update(b".");
    hasher.update(body);
    hex::encode(hasher.finalize())
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.bytes()
        .zip(right.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Split a `t=<unix>,v1=<hex>` signature header into its parts.
fn parse_signature_header(header: &str) -> Option<(&str, &str)> {
    let mut timestamp = None;
    let mut signature = None;
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }
    Some((timestamp?, signature?))
}

fn decode_event(body: &[u8]) -> Result<PaymentEvent, CheckoutError> {
    let event: WebhookEvent = serde_json::from_slice(body)
        .map_err(|err| CheckoutError::malformed_event(err.to_string()))?;

    if event.kind != "checkout.session.completed" {
        return Ok(PaymentEvent::Ignored { kind: event.kind });
    }

    let object = event
        .data
        .map(|data| data.object)
        .ok_or_else(|| CheckoutError::malformed_event("completed event is missing data"))?;
    let amount_cents = object
        .amount_total
        .ok_or_else(|| CheckoutError::malformed_event("completed event is missing amount"))?;
    let user_id = object
        .metadata
        .and_then(|metadata| metadata.user_id)
        .ok_or_else(|| CheckoutError::malformed_event("completed event is missing user id"))?;
    let user_id = UserId::new(&user_id)
        .map_err(|err| CheckoutError::malformed_event(format!("bad user id: {err}")))?;

    Ok(PaymentEvent::CheckoutCompleted {
        session_id: object.id,
        user_id,
        amount_cents,
    })
}

#[async_trait]
impl CheckoutService for StripeCheckoutService {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let response = self
            .http
            .post(CHECKOUT_SESSIONS_URL)
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(&request))
            .send()
            .await
            .map_err(|err| CheckoutError::unreachable(err.to_string()))?;

        if response.status().is_success() {
            let session: SessionResponse = response
                .json()
                .await
                .map_err(|err| CheckoutError::malformed_event(err.to_string()))?;
            Ok(CheckoutSession {
                session_id: session.id,
                checkout_url: session.url,
            })
        } else {
            let status = response.status();
            let message = match response.json::<ApiErrorResponse>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => format!("checkout session request failed with {status}"),
            };
            debug!(%status, message, "stripe rejected checkout session");
            Err(CheckoutError::rejected(message))
        }
    }

    fn verify_event(&self, signature: &str, body: &[u8]) -> Result<PaymentEvent, CheckoutError> {
        let Some((timestamp, received)) = parse_signature_header(signature) else {
            return Err(CheckoutError::InvalidSignature);
        };
        let expected = payload_signature(&self.webhook_secret, timestamp, body);
        if !constant_time_eq(&expected, received) {
            return Err(CheckoutError::InvalidSignature);
        }
        decode_event(body)
    }
}
