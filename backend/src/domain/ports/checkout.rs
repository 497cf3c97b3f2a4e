//! Port for the external payment provider.
//!
//! The HTTP adapter starts hosted checkout sessions through this port and
//! hands provider callbacks back to it for verification. The provider's wire
//! format stays behind the outbound adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by checkout adapters.
    pub enum CheckoutError {
        /// The provider could not be reached.
        Unreachable { message: String } =>
            "payment provider unreachable: {message}",
        /// The provider rejected the request.
        Rejected { message: String } =>
            "payment provider rejected the request: {message}",
        /// A callback failed signature verification.
        InvalidSignature => "callback signature verification failed",
        /// A callback payload could not be decoded.
        MalformedEvent { message: String } =>
            "malformed provider event: {message}",
    }
}

/// Request to start a hosted checkout session for a subscription plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub user_id: UserId,
    pub amount_cents: i64,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted checkout session handed back to the client for redirect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

/// Verified provider callback event.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// Checkout completed; credit the user's wallet.
    CheckoutCompleted {
        session_id: String,
        user_id: UserId,
        amount_cents: i64,
    },
    /// Any event kind the service does not act on.
    Ignored { kind: String },
}

/// Port for payment provider interactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Start a hosted checkout session.
    async fn create_checkout(&self, request: CheckoutRequest)
    -> Result<CheckoutSession, CheckoutError>;

    /// Verify a provider callback and decode it into a [`PaymentEvent`].
    fn verify_event(&self, signature: &str, body: &[u8]) -> Result<PaymentEvent, CheckoutError>;
}

/// Fixture checkout service for tests and provider-less development.
///
/// Sessions point at a placeholder URL and every callback verifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCheckoutService;

#[async_trait]
impl CheckoutService for FixtureCheckoutService {
    async fn create_checkout(
        &self,
        _request: CheckoutRequest,
    ) -> Result<CheckoutSession, CheckoutError> {
        let session_id = format!("cs_test_{}", Uuid::new_v4().simple());
        Ok(CheckoutSession {
            checkout_url: format!("https://checkout.example.test/{session_id}"),
            session_id,
        })
    }

    fn verify_event(&self, _signature: &str, body: &[u8]) -> Result<PaymentEvent, CheckoutError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawEvent {
            kind: String,
            #[serde(default)]
            session_id: Option<String>,
            #[serde(default)]
            user_id: Option<UserId>,
            #[serde(default)]
            amount_cents: Option<i64>,
        }

        let raw: RawEvent = serde_json::from_slice(body)
            .map_err(|err| CheckoutError::malformed_event(err.to_string()))?;
        if raw.kind == "checkout.completed" {
            match (raw.session_id, raw.user_id, raw.amount_cents) {
                (Some(session_id), Some(user_id), Some(amount_cents)) => {
                    Ok(PaymentEvent::CheckoutCompleted {
                        session_id,
                        user_id,
                        amount_cents,
                    })
                }
                _ => Err(CheckoutError::malformed_event(
                    "checkout.completed event is missing fields",
                )),
            }
        } else {
            Ok(PaymentEvent::Ignored { kind: raw.kind })
        }
    }
}
