//! Wire types for the real-time lobby channel and the statistics endpoint.
//!
//! Channel messages are adjacently tagged JSON objects:
//! `{"event": "pass-users", "data": [...]}`. Events without a payload omit
//! `data`. Player and member payloads the lobby does not interpret are kept
//! as raw [`serde_json::Value`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// ── Type aliases ────────────────────────────────────────────────────

/// Numeric room identifier assigned by the lobby server.
pub type RoomNumber = i64;

/// Numeric player identifier from the statistics source.
pub type PlayerId = i64;

// ── Room payloads ───────────────────────────────────────────────────

/// The state of a single room as pushed by the server.
///
/// Name and members always travel together, so a snapshot is replaced
/// wholesale and never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Display name of the room.
    #[serde(default)]
    pub name: String,
    /// Opaque member references, in server order.
    #[serde(default)]
    pub members: Vec<Value>,
}

impl RoomSnapshot {
    /// Create a snapshot with the given name and members.
    pub fn new(name: impl Into<String>, members: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}

/// Payload of the inbound `pass-room` event.
///
/// Both fields are optional on the wire so that a malformed push still
/// decodes; it is rejected later when converted to a
/// [`LobbyEvent`](crate::LobbyEvent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassRoomPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Value>,
}

/// One entry of the global membership list pushed by `pass-users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipEntry {
    /// Room the user currently sits in.
    pub room: RoomNumber,
    /// Remaining user fields, carried through untouched.
    #[serde(flatten)]
    pub user: Map<String, Value>,
}

impl MembershipEntry {
    /// Create an entry with no extra user fields.
    pub fn in_room(room: RoomNumber) -> Self {
        Self {
            room,
            user: Map::new(),
        }
    }
}

// ── Messages ────────────────────────────────────────────────────────

/// Events sent from the client to the lobby server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ask for a snapshot of the room this client sits in.
    ExportRoom,
    /// Ask for the global membership list.
    ExportUsers,
}

/// Events sent from the lobby server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Current state of the client's room.
    PassRoom(PassRoomPayload),
    /// Flat list of every connected user and the room they are in.
    PassUsers(Vec<MembershipEntry>),
    /// The client was removed from its room.
    Kicked,
    /// The room's game is starting. The value is passed through uninterpreted.
    Start(Value),
}

impl ClientMessage {
    /// Encode as one channel text frame.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Serialization`](crate::LobbyError::Serialization)
    /// if the message cannot be encoded.
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl ServerMessage {
    /// Decode one channel text frame.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Serialization`](crate::LobbyError::Serialization)
    /// for malformed JSON or an unknown event.
    pub fn from_frame(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

// ── Statistics records ──────────────────────────────────────────────

/// A player record exactly as the statistics endpoint returns it.
///
/// The upstream vocabulary is fixed; every field but `ID` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlayerRecord {
    #[serde(rename = "ID")]
    pub id: PlayerId,
    #[serde(rename = "Avatar", default)]
    pub avatar: String,
    #[serde(rename = "Nazwa", default)]
    pub name: String,
    #[serde(rename = "Ranking", default, skip_serializing_if = "Option::is_none")]
    pub ranking: Option<i64>,
    #[serde(rename = "Wygrane", default)]
    pub wins: i64,
    #[serde(rename = "Remisy", default)]
    pub draws: i64,
    #[serde(rename = "Przegrane", default)]
    pub losses: i64,
}

/// Immutable player snapshot used by the statistics table. Identity is `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub display_name: String,
    pub avatar_url: String,
    /// Leaderboard position, `None` when the source did not report one.
    pub ranking_position: Option<i64>,
    pub wins: i64,
    pub draws: i64,
    pub losses: i64,
}

impl From<RawPlayerRecord> for PlayerRecord {
    fn from(raw: RawPlayerRecord) -> Self {
        Self {
            id: raw.id,
            display_name: raw.name,
            avatar_url: raw.avatar,
            ranking_position: raw.ranking,
            wins: raw.wins,
            draws: raw.draws,
            losses: raw.losses,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_kebab_case_event_names() {
        let json = serde_json::to_value(ClientMessage::ExportRoom).unwrap();
        assert_eq!(json, json!({ "event": "export-room" }));
        let json = serde_json::to_value(ClientMessage::ExportUsers).unwrap();
        assert_eq!(json, json!({ "event": "export-users" }));
    }

    #[test]
    fn pass_users_decodes_entries_with_extra_fields() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "event": "pass-users",
            "data": [{ "room": 2, "name": "alice" }, { "room": 3 }]
        }))
        .unwrap();
        let ServerMessage::PassUsers(entries) = msg else {
            panic!("expected PassUsers, got {msg:?}");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].room, 2);
        assert_eq!(entries[0].user.get("name"), Some(&json!("alice")));
        assert!(entries[1].user.is_empty());
    }

    #[test]
    fn kicked_decodes_without_data() {
        let msg: ServerMessage = serde_json::from_str(r#"{"event":"kicked"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Kicked);
    }

    #[test]
    fn start_keeps_time_value_opaque() {
        let msg: ServerMessage = serde_json::from_str(r#"{"event":"start","data":3000}"#).unwrap();
        assert_eq!(msg, ServerMessage::Start(json!(3000)));
    }

    #[test]
    fn pass_room_with_missing_users_still_decodes() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "event": "pass-room",
            "data": { "room": { "name": "r1" } }
        }))
        .unwrap();
        let ServerMessage::PassRoom(payload) = msg else {
            panic!("expected PassRoom, got {msg:?}");
        };
        assert_eq!(payload.room, Some(RoomSnapshot::new("r1", vec![])));
        assert!(payload.users.is_none());
    }

    #[test]
    fn frames_encode_and_decode_through_the_error_type() {
        assert_eq!(
            ClientMessage::ExportRoom.to_frame().unwrap(),
            r#"{"event":"export-room"}"#
        );
        assert_eq!(
            ServerMessage::from_frame(r#"{"event":"kicked"}"#).unwrap(),
            ServerMessage::Kicked
        );
        assert!(matches!(
            ServerMessage::from_frame("not json"),
            Err(crate::LobbyError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_event_is_rejected() {
        let result = serde_json::from_str::<ServerMessage>(r#"{"event":"explode"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn raw_record_defaults_missing_fields() {
        let raw: RawPlayerRecord = serde_json::from_str(r#"{"ID": 7, "Ranking": 4}"#).unwrap();
        let record = PlayerRecord::from(raw);
        assert_eq!(record.id, 7);
        assert_eq!(record.ranking_position, Some(4));
        assert_eq!(record.display_name, "");
        assert_eq!((record.wins, record.draws, record.losses), (0, 0, 0));
    }

    #[test]
    fn raw_record_maps_upstream_vocabulary() {
        let raw: RawPlayerRecord = serde_json::from_value(json!({
            "ID": 1,
            "Avatar": "https://example.test/cat.jpg",
            "Nazwa": "Testowy Kot",
            "Ranking": 1,
            "Wygrane": 999,
            "Remisy": 0,
            "Przegrane": 2
        }))
        .unwrap();
        let record = PlayerRecord::from(raw);
        assert_eq!(record.display_name, "Testowy Kot");
        assert_eq!(record.avatar_url, "https://example.test/cat.jpg");
        assert_eq!(record.wins, 999);
        assert_eq!(record.losses, 2);
    }
}
