//! Shared WebSocket adapter state.
//!
//! Socket handlers depend on the chat driving port plus the in-process room
//! registry; everything else stays behind those seams so the adapter is
//! testable with deterministic doubles.

use std::sync::Arc;

use crate::domain::ports::{ChatCommand, FixtureChatCommand};
use crate::inbound::ws::rooms::RoomRegistry;

/// Dependency bundle for WebSocket handlers.
#[derive(Clone)]
pub struct WsState {
    pub chat: Arc<dyn ChatCommand>,
    pub rooms: Arc<RoomRegistry>,
}

impl WsState {
    /// Construct state from an explicit port implementation.
    pub fn new(chat: Arc<dyn ChatCommand>) -> Self {
        Self {
            chat,
            rooms: Arc::new(RoomRegistry::new()),
        }
    }

    /// State backed by the fixture chat port, for tests and for running
    /// without a configured database.
    pub fn fixture() -> Self {
        Self::new(Arc::new(FixtureChatCommand))
    }
}
