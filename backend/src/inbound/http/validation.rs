//! Request validation helpers shared by HTTP handlers.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, error::Error as ActixError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Parse a UUID path or body field, reporting the offending field on failure.
pub fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID"))
            .with_details(json!({ "field": field }))
    })
}

/// Require a strictly positive cent amount.
pub fn require_positive_cents(field: &str, amount: i64) -> Result<i64, Error> {
    if amount > 0 {
        Ok(amount)
    } else {
        Err(
            Error::invalid_request(format!("{field} must be a positive number of cents"))
                .with_details(json!({ "field": field })),
        )
    }
}

/// Map JSON body deserialisation failures onto the domain error shape so
/// malformed payloads produce the same envelope as every other failure.
///
/// Wire with `web::JsonConfig::default().error_handler(json_error_handler)`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> ActixError {
    Error::invalid_request(format!("invalid request body: {err}")).into()
}
