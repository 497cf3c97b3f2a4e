//! Inbound adapters driving the domain (HTTP and WebSocket).

pub mod http;
pub mod ws;
