//! Subscription checkout endpoints backed by the hosted payment provider.
//!
//! `checkout` starts a provider session for the logged-in user; `webhook`
//! receives provider callbacks, verifies their signature, and credits the
//! wallet when a checkout completes. The webhook is authenticated by the
//! signature alone, never by a session cookie.

use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{CheckoutError, CheckoutRequest, CheckoutSession, PaymentEvent};
use crate::domain::{ApiResult, Error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_positive_cents;
use crate::inbound::http::wallet::map_wallet_repository_error;

/// Header carrying the provider's callback signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Checkout request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    /// Monthly plan price in cents; must be positive.
    pub amount_cents: i64,
    /// Where the provider sends the user after payment.
    pub success_url: String,
    /// Where the provider sends the user on abandonment.
    pub cancel_url: String,
}

fn map_checkout_error(err: CheckoutError) -> Error {
    match err {
        CheckoutError::Unreachable { .. } => {
            Error::service_unavailable("payment provider is unavailable")
        }
        CheckoutError::Rejected { .. } => {
            Error::invalid_request("payment provider rejected the checkout")
        }
        CheckoutError::InvalidSignature => Error::unauthorized("invalid webhook signature"),
        CheckoutError::MalformedEvent { .. } => Error::invalid_request("malformed webhook event"),
    }
}

/// Start a hosted checkout session for the session user's subscription plan.
#[utoipa::path(
    post,
    path = "/api/v1/payments/checkout",
    request_body = CheckoutBody,
    responses(
        (status = 200, description = "Redirect the client to the returned URL"),
        (status = 400, description = "Validation failed"),
        (status = 503, description = "Provider unreachable"),
    ),
    tag = "payments"
)]
pub async fn checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Json<CheckoutBody>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let body = body.into_inner();
    let amount_cents = require_positive_cents("amountCents", body.amount_cents)?;
    let session: CheckoutSession = state
        .checkout
        .create_checkout(CheckoutRequest {
            user_id: actor,
            amount_cents,
            success_url: body.success_url,
            cancel_url: body.cancel_url,
        })
        .await
        .map_err(map_checkout_error)?;
    Ok(HttpResponse::Ok().json(session))
}

/// Receive and apply a provider callback.
///
/// The raw body is verified against the signature header before any
/// deserialisation is trusted. Events other than completed checkouts are
/// acknowledged without side effects so the provider stops retrying them.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body(
        content = String,
        content_type = "application/json",
        description = "Raw provider event payload"
    ),
    responses(
        (status = 200, description = "Event processed or ignored"),
        (status = 401, description = "Signature verification failed"),
    ),
    tag = "payments"
)]
pub async fn webhook(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("missing webhook signature"))?;
    let event = state
        .checkout
        .verify_event(signature, &body)
        .map_err(map_checkout_error)?;

    match event {
        PaymentEvent::CheckoutCompleted {
            session_id,
            user_id,
            amount_cents,
        } => {
            let mut wallet = state
                .wallets
                .find_or_open_for_user(&user_id)
                .await
                .map_err(map_wallet_repository_error)?;
            let entry = wallet
                .credit(
                    amount_cents,
                    Some(format!("checkout {session_id}")),
                    Utc::now(),
                )
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            state
                .wallets
                .record(&wallet, &entry)
                .await
                .map_err(map_wallet_repository_error)?;
            tracing::info!(
                session_id = %session_id,
                user_id = %user_id,
                amount_cents,
                "wallet credited from completed checkout"
            );
        }
        PaymentEvent::Ignored { kind } => {
            tracing::debug!(kind = %kind, "ignoring provider event");
        }
    }
    Ok(HttpResponse::Ok().json(json!({ "received": true })))
}
