//! In-process fan-out of room events to connected sockets.
//!
//! Each room maps to a broadcast channel. Sockets subscribe on `joinRoom`
//! and the channel is dropped once the last subscriber disconnects, so idle
//! rooms cost nothing between conversations.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::domain::ConversationId;
use crate::inbound::ws::messages::ServerEvent;

/// Buffered events per room before slow subscribers start lagging.
const ROOM_CHANNEL_CAPACITY: usize = 64;

/// Registry of live room channels.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<ConversationId, broadcast::Sender<ServerEvent>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room, creating its channel on first join.
    pub fn subscribe(&self, room_id: ConversationId) -> broadcast::Receiver<ServerEvent> {
        let mut rooms = self.rooms.lock().expect("room registry lock");
        rooms
            .entry(room_id)
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Broadcast an event to a room's subscribers.
    ///
    /// Returns the number of sockets reached. A room nobody listens to is
    /// removed rather than kept around.
    pub fn publish(&self, room_id: ConversationId, event: ServerEvent) -> usize {
        let mut rooms = self.rooms.lock().expect("room registry lock");
        let Some(sender) = rooms.get(&room_id) else {
            return 0;
        };
        match sender.send(event) {
            Ok(reached) => reached,
            Err(_) => {
                rooms.remove(&room_id);
                0
            }
        }
    }

    /// Drop a room's channel once its last subscriber left.
    pub fn prune(&self, room_id: ConversationId) {
        let mut rooms = self.rooms.lock().expect("room registry lock");
        if let Some(sender) = rooms.get(&room_id)
            && sender.receiver_count() == 0
        {
            rooms.remove(&room_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn room_count(&self) -> usize {
        self.rooms.lock().expect("room registry lock").len()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::inbound::ws::messages::ErrorEvent;
    use crate::domain::ErrorCode;

    fn probe_event() -> ServerEvent {
        ServerEvent::Error(ErrorEvent {
            code: ErrorCode::InvalidRequest,
            message: "probe".to_owned(),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let registry = RoomRegistry::new();
        let room = ConversationId::random();
        let mut first = registry.subscribe(room);
        let mut second = registry.subscribe(room);

        assert_eq!(registry.publish(room, probe_event()), 2);
        assert_eq!(first.recv().await.expect("event delivered"), probe_event());
        assert_eq!(second.recv().await.expect("event delivered"), probe_event());
    }

    #[rstest]
    fn publish_to_unknown_room_reaches_nobody() {
        let registry = RoomRegistry::new();
        assert_eq!(registry.publish(ConversationId::random(), probe_event()), 0);
    }

    #[rstest]
    fn rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let room = ConversationId::random();
        let other = ConversationId::random();
        let _subscriber = registry.subscribe(room);
        let mut other_subscriber = registry.subscribe(other);

        registry.publish(room, probe_event());
        assert!(matches!(
            other_subscriber.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[rstest]
    fn abandoned_rooms_are_pruned() {
        let registry = RoomRegistry::new();
        let room = ConversationId::random();
        let subscriber = registry.subscribe(room);
        assert_eq!(registry.room_count(), 1);

        drop(subscriber);
        registry.prune(room);
        assert_eq!(registry.room_count(), 0);
    }

    #[rstest]
    fn prune_keeps_rooms_with_listeners() {
        let registry = RoomRegistry::new();
        let room = ConversationId::random();
        let _subscriber = registry.subscribe(room);
        registry.prune(room);
        assert_eq!(registry.room_count(), 1);
    }
}
