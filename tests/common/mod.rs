#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for lobby board integration tests.
//!
//! Provides a channel-linked [`MockTransport`] / [`MockServer`] pair, a
//! canned [`FixedSource`] for the statistics table, and helpers that build
//! server event JSON.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lobby_board::protocol::{MembershipEntry, PassRoomPayload, RoomSnapshot, ServerMessage};
use lobby_board::{LobbyError, RawPlayerRecord, StatsSource, Transport};
use serde_json::Value;
use tokio::sync::mpsc;

type Frame = Result<String, LobbyError>;

// ── MockTransport ───────────────────────────────────────────────────

/// Client half of an in-memory connection.
///
/// Frames pushed through the paired [`MockServer`] are returned by `recv()`
/// in order; everything the client sends shows up in
/// [`MockServer::next_request`]. Dropping or hanging up the server closes
/// the connection.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Frame>,
    outgoing: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

/// Server half of an in-memory connection.
pub struct MockServer {
    to_client: Option<mpsc::UnboundedSender<Frame>>,
    from_client: mpsc::UnboundedReceiver<String>,
    /// Whether the client called `close()`.
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn linked() -> (Self, MockServer) {
        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming,
            outgoing,
            closed: Arc::clone(&closed),
        };
        let server = MockServer {
            to_client: Some(to_client),
            from_client,
            closed,
        };
        (transport, server)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), LobbyError> {
        self.outgoing
            .send(message)
            .map_err(|e| LobbyError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, LobbyError>> {
        self.incoming.recv().await
    }

    async fn close(&mut self) -> Result<(), LobbyError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

impl MockServer {
    /// Deliver one text frame to the client.
    pub fn push(&self, frame: impl Into<String>) {
        if let Some(tx) = &self.to_client {
            tx.send(Ok(frame.into())).unwrap();
        }
    }

    /// Make the client's next `recv()` fail.
    pub fn fail(&self, reason: &str) {
        if let Some(tx) = &self.to_client {
            tx.send(Err(LobbyError::TransportReceive(reason.into())))
                .unwrap();
        }
    }

    /// Close the connection from the server side once queued frames drain.
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    /// Wait for the next frame the client sent.
    pub async fn next_request(&mut self) -> String {
        self.from_client
            .recv()
            .await
            .expect("client connection dropped")
    }
}

// ── Statistics source ───────────────────────────────────────────────

/// A [`StatsSource`] that always returns the same roster, or always fails.
pub enum FixedSource {
    Players(Vec<RawPlayerRecord>),
    Status(u16),
}

#[async_trait]
impl StatsSource for FixedSource {
    async fn fetch_players(&self) -> Result<Vec<RawPlayerRecord>, LobbyError> {
        match self {
            Self::Players(players) => Ok(players.clone()),
            Self::Status(status) => Err(LobbyError::HttpStatus(*status)),
        }
    }
}

/// A player with only an id and a ranking position.
pub fn ranked_player(id: i64, rank: i64) -> RawPlayerRecord {
    RawPlayerRecord {
        id,
        ranking: Some(rank),
        ..Default::default()
    }
}

/// Players `1..=ranks.len()` with the given ranking positions.
pub fn ranked_players(ranks: &[i64]) -> Vec<RawPlayerRecord> {
    ranks
        .iter()
        .zip(1..)
        .map(|(rank, id)| ranked_player(id, *rank))
        .collect()
}

// ── JSON helper functions ───────────────────────────────────────────

/// JSON for a `pass-room` event whose users mirror the members.
pub fn pass_room_json(name: &str, members: &[&str]) -> String {
    let members: Vec<Value> = members.iter().map(|m| Value::from(*m)).collect();
    serde_json::to_string(&ServerMessage::PassRoom(PassRoomPayload {
        room: Some(RoomSnapshot::new(name, members.clone())),
        users: Some(Value::Array(members)),
    }))
    .expect("pass_room_json serialization")
}

/// JSON for a `pass-users` event with one entry per element of `rooms`.
pub fn pass_users_json(rooms: &[i64]) -> String {
    let entries = rooms.iter().copied().map(MembershipEntry::in_room).collect();
    serde_json::to_string(&ServerMessage::PassUsers(entries)).expect("pass_users_json serialization")
}

pub fn kicked_json() -> String {
    serde_json::to_string(&ServerMessage::Kicked).expect("kicked_json serialization")
}

pub fn start_json(time: Value) -> String {
    serde_json::to_string(&ServerMessage::Start(time)).expect("start_json serialization")
}
