//! Validated inbound events and the subscribe side of the channel.
//!
//! [`LobbyEvent`] is what the state machines consume. Conversion from a raw
//! [`ServerMessage`] happens once, at the channel boundary, and rejects
//! payloads the state machines cannot use.

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::{MembershipEntry, RoomSnapshot, ServerMessage};

/// Events emitted by a [`RealtimeChannel`](crate::RealtimeChannel).
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// Synthetic: the transport loop is running. Always the first event.
    Connected,
    /// New snapshot of the client's room.
    RoomPassed { room: RoomSnapshot, users: Value },
    /// New global membership list.
    UsersPassed { entries: Vec<MembershipEntry> },
    /// The client was removed from its room.
    Kicked,
    /// The room's game is starting.
    Started { time: Value },
    /// Synthetic: the transport loop has exited. Always the last event.
    Disconnected { reason: Option<String> },
}

impl LobbyEvent {
    /// Validate a decoded server message.
    ///
    /// Returns `None` for a `pass-room` missing its room or users.
    pub fn from_message(msg: ServerMessage) -> Option<Self> {
        match msg {
            ServerMessage::PassRoom(payload) => match (payload.room, payload.users) {
                (Some(room), Some(users)) if !users.is_null() => {
                    Some(Self::RoomPassed { room, users })
                }
                (room, users) => {
                    warn!(
                        has_room = room.is_some(),
                        has_users = users.is_some(),
                        "dropping malformed pass-room payload"
                    );
                    None
                }
            },
            ServerMessage::PassUsers(entries) => Some(Self::UsersPassed { entries }),
            ServerMessage::Kicked => Some(Self::Kicked),
            ServerMessage::Start(time) => Some(Self::Started { time }),
        }
    }
}

/// Something that reacts to inbound lobby events.
///
/// Each call must fully apply the event before returning; [`pump`] never
/// interleaves two events.
pub trait EventHandler {
    fn handle_event(&mut self, event: LobbyEvent);
}

/// Feed events from `events` into `handler` in arrival order.
///
/// Returns the disconnect reason once [`LobbyEvent::Disconnected`] is seen, or
/// `None` if the channel closed without one. The `Disconnected` event is not
/// forwarded to the handler.
pub async fn pump<H>(events: &mut mpsc::Receiver<LobbyEvent>, handler: &mut H) -> Option<String>
where
    H: EventHandler + ?Sized,
{
    while let Some(event) = events.recv().await {
        if let LobbyEvent::Disconnected { reason } = event {
            debug!(?reason, "pump: channel disconnected");
            return reason;
        }
        handler.handle_event(event);
    }
    debug!("pump: event channel closed");
    None
}
