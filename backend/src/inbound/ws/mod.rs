//! WebSocket inbound adapter for real-time chat.
//!
//! Responsibilities:
//! - authenticate upgrade requests against the session cookie
//! - run the per-connection handler with heartbeats
//! - fan events out to room subscribers through the in-process registry

use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::error;

mod session;

pub mod messages;
pub mod rooms;
pub mod state;

use crate::inbound::http::session::SessionContext;

/// Handle WebSocket upgrade for the `/ws` endpoint.
///
/// Upgrades are only offered to logged-in users; the session user becomes
/// the socket's actor for every chat operation.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<state::WsState>,
    session_ctx: SessionContext,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let user_id = session_ctx.require_user_id()?;

    let (response, ws_session, msg_stream) = actix_ws::handle(&req, stream).map_err(|err| {
        error!(error = %err, "WebSocket upgrade failed");
        err
    })?;

    actix_web::rt::spawn(session::handle_ws_session(
        state.chat.clone(),
        state.rooms.clone(),
        user_id,
        ws_session,
        msg_stream,
    ));

    Ok(response)
}
