//! Per-connection WebSocket handler.
//!
//! Keeps framing and heartbeats at the edge while deferring chat behaviour
//! to the injected driving port. The public contract pings every 5s and
//! considers a connection idle after 10s without client traffic. Tests
//! shorten these intervals to speed up feedback.

use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::sync::broadcast;
use tokio::time;
use tracing::warn;

use crate::domain::ports::{ChatCommand, MarkSeenRequest, SendMessageRequest};
use crate::domain::{ConversationId, Error, UserId};
use crate::inbound::ws::messages::{ClientEvent, ErrorEvent, ServerEvent, UserJoinedEvent};
use crate::inbound::ws::rooms::RoomRegistry;

/// Time between heartbeats to the client.
#[cfg(not(test))]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
pub(super) const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(50);

/// Max idle time before disconnecting the client.
#[cfg(not(test))]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
pub(super) const CLIENT_TIMEOUT: Duration = Duration::from_millis(100);

pub(super) async fn handle_ws_session(
    chat: Arc<dyn ChatCommand>,
    rooms: Arc<RoomRegistry>,
    user_id: UserId,
    session: Session,
    stream: MessageStream,
) {
    WsSession::new(chat, rooms, user_id)
        .run(session, stream)
        .await;
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    InvalidPayload,
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

enum Turn {
    Heartbeat,
    Client(Option<Result<Message, ProtocolError>>),
    Room(Option<ServerEvent>),
}

struct Subscription {
    room_id: ConversationId,
    receiver: broadcast::Receiver<ServerEvent>,
}

struct WsSession {
    chat: Arc<dyn ChatCommand>,
    rooms: Arc<RoomRegistry>,
    user_id: UserId,
    subscription: Option<Subscription>,
}

impl WsSession {
    fn new(chat: Arc<dyn ChatCommand>, rooms: Arc<RoomRegistry>, user_id: UserId) -> Self {
        Self {
            chat,
            rooms,
            user_id,
            subscription: None,
        }
    }

    async fn run(&mut self, mut session: Session, mut stream: MessageStream) {
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        loop {
            // Select into a plain value first; handling the turn needs
            // mutable access the select arms cannot share.
            let turn = tokio::select! {
                _ = heartbeat.tick() => Turn::Heartbeat,
                message = stream.recv() => Turn::Client(message),
                event = Self::next_room_event(&mut self.subscription) => Turn::Room(event),
            };

            let result = match turn {
                Turn::Heartbeat => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat)
                        .await
                }
                Turn::Client(message) => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                Turn::Room(Some(event)) => Self::send_json(&mut session, &event)
                    .await
                    .map_err(SessionError::Network),
                Turn::Room(None) => Ok(()),
            };

            if let Err(error) = result {
                self.log_shutdown_reason(&error);
                let close_action = Self::close_action_for(&error);
                self.leave_room();
                Self::close_session_if_needed(session, close_action).await;
                return;
            }
        }
    }

    /// Await the next event for the joined room, or park forever when the
    /// socket has not joined one yet so the select loop stays heartbeat-driven.
    async fn next_room_event(subscription: &mut Option<Subscription>) -> Option<ServerEvent> {
        let Some(active) = subscription.as_mut() else {
            std::future::pending::<()>().await;
            unreachable!("pending future never resolves");
        };
        match active.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "socket lagged behind room broadcast");
                None
            }
            Err(broadcast::error::RecvError::Closed) => {
                *subscription = None;
                None
            }
        }
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &mut self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(session, text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(
        &mut self,
        session: &mut Session,
        text: &str,
    ) -> Result<(), SessionError> {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                return Err(SessionError::InvalidPayload);
            }
        };

        let outcome = match event {
            ClientEvent::JoinRoom(request) => {
                self.handle_join_room(request.room_id).await.map(Some)
            }
            ClientEvent::SendMessage(request) => self.handle_send_message(request).await,
            ClientEvent::MarkSeen(request) => self.handle_mark_seen(request).await,
        };

        match outcome {
            Ok(Some(reply)) => Self::send_json(session, &reply)
                .await
                .map_err(SessionError::Network),
            Ok(None) => Ok(()),
            Err(error) => {
                // Domain rejections stay on the wire as error events; only
                // transport-level faults tear down the connection.
                let reply = ServerEvent::Error(ErrorEvent::from(error));
                Self::send_json(session, &reply)
                    .await
                    .map_err(SessionError::Network)
            }
        }
    }

    /// Join a room: authorise through the port, then subscribe for fan-out,
    /// announce to existing members, and reply with the history window.
    async fn handle_join_room(&mut self, room_id: ConversationId) -> Result<ServerEvent, Error> {
        let response = self.chat.join_room(&self.user_id, room_id).await?;
        self.leave_room();
        // Announce before subscribing so the joiner does not hear its own
        // arrival.
        self.rooms.publish(
            room_id,
            ServerEvent::UserJoined(UserJoinedEvent {
                room_id,
                user_id: self.user_id.clone(),
            }),
        );
        let receiver = self.rooms.subscribe(room_id);
        self.subscription = Some(Subscription { room_id, receiver });
        Ok(ServerEvent::History(response))
    }

    /// Persist a message, then fan it out. The sender receives the stored
    /// payload through its own room subscription like everyone else, so no
    /// direct reply is needed.
    async fn handle_send_message(
        &mut self,
        request: SendMessageRequest,
    ) -> Result<Option<ServerEvent>, Error> {
        if !self.joined(request.room_id) {
            return Err(Error::invalid_request("join the room before sending"));
        }

        let room_id = request.room_id;
        let payload = self.chat.send_message(&self.user_id, request).await?;
        self.rooms
            .publish(room_id, ServerEvent::ReceiveMessage(payload));
        Ok(None)
    }

    /// Record a view of a message and fan the updated payload out so every
    /// member, the sender included, sees the status change.
    async fn handle_mark_seen(
        &mut self,
        request: MarkSeenRequest,
    ) -> Result<Option<ServerEvent>, Error> {
        if !self.joined(request.room_id) {
            return Err(Error::invalid_request(
                "join the room before marking messages seen",
            ));
        }

        let room_id = request.room_id;
        let payload = self.chat.mark_seen(&self.user_id, request).await?;
        self.rooms
            .publish(room_id, ServerEvent::MessageSeen(payload));
        Ok(None)
    }

    fn joined(&self, room_id: ConversationId) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|active| active.room_id == room_id)
    }

    fn leave_room(&mut self) {
        if let Some(active) = self.subscription.take() {
            let room_id = active.room_id;
            drop(active);
            self.rooms.prune(room_id);
        }
    }

    async fn send_json<T: serde::Serialize>(
        session: &mut Session,
        payload: &T,
    ) -> Result<(), Closed> {
        match serde_json::to_string(payload) {
            Ok(body) => session.text(body).await,
            Err(error) => {
                // In debug builds fail fast so schema drift is fixed; in
                // release we log and keep the connection alive.
                if cfg!(debug_assertions) {
                    panic!("socket events must serialize: {error}");
                } else {
                    warn!(error = %error, "Failed to serialize WebSocket payload");
                }
                Ok(())
            }
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::InvalidPayload
            | SessionError::ClientClosed(_)
            | SessionError::StreamClosed => {}
        }
    }

    fn close_action_for(error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::InvalidPayload => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Policy,
                description: Some("invalid payload".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
