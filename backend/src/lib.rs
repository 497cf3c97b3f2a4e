//! Mentoring-platform backend library.
//!
//! Layering follows a hexagonal shape: `domain` holds entities, services, and
//! ports; `inbound` adapts HTTP and WebSocket traffic onto those ports;
//! `outbound` implements the ports against PostgreSQL and Stripe.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware re-exported for app builders.
pub use middleware::trace::Trace;
