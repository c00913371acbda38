//! State machine for the lobby of a single game room.
//!
//! ```text
//! Forming ──pass-room──▶ Active ──start──▶ Started
//!    │                     │
//!    └──────kicked─────────┴──▶ Terminated ──accept──▶ Left
//!
//! leave (any phase) ──▶ Left
//! ```
//!
//! `Started`, `Terminated` and `Left` ignore further inbound events.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, warn};

use crate::channel::Outbound;
use crate::error::UnknownControl;
use crate::event::{EventHandler, LobbyEvent};
use crate::navigation::{Navigator, Route};
use crate::protocol::{ClientMessage, RoomSnapshot};

/// Lifecycle phase of a [`RoomLobby`].
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyPhase {
    /// Mounted, waiting for the first room snapshot.
    Forming,
    /// At least one snapshot received.
    Active,
    /// The game started; `time` is whatever the server sent with `start`.
    Started { time: Value },
    /// Kicked from the room. The recovery control is shown.
    Terminated,
    /// The lobby was left through a leave or recovery action.
    Left,
}

impl LobbyPhase {
    /// Whether inbound room events still apply.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Forming | Self::Active)
    }
}

/// Actionable elements of the lobby view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyControl {
    AcceptNewGame,
    Leave,
}

impl LobbyControl {
    pub fn id(self) -> &'static str {
        match self {
            Self::AcceptNewGame => "accept-multiplayer-game",
            Self::Leave => "lobby-leave",
        }
    }
}

impl fmt::Display for LobbyControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LobbyControl {
    type Err = UnknownControl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept-multiplayer-game" => Ok(Self::AcceptNewGame),
            "lobby-leave" => Ok(Self::Leave),
            other => Err(UnknownControl(other.to_string())),
        }
    }
}

/// Lobby of the room this client sits in.
#[derive(Debug)]
pub struct RoomLobby<O, N> {
    outbound: O,
    navigator: N,
    phase: LobbyPhase,
    room: RoomSnapshot,
    users: Value,
}

impl<O: Outbound, N: Navigator> RoomLobby<O, N> {
    /// Mount the lobby and ask the server for the current room.
    pub fn mount(outbound: O, navigator: N) -> Self {
        let lobby = Self {
            outbound,
            navigator,
            phase: LobbyPhase::Forming,
            room: RoomSnapshot::default(),
            users: Value::Null,
        };
        if let Err(e) = lobby.outbound.emit(ClientMessage::ExportRoom) {
            warn!("lobby: could not request room export: {e}");
        }
        lobby
    }

    /// Replace the placeholder shown before the first snapshot arrives.
    #[must_use]
    pub fn with_initial_room(mut self, room: RoomSnapshot) -> Self {
        if self.phase == LobbyPhase::Forming {
            self.room = room;
        }
        self
    }

    pub fn phase(&self) -> &LobbyPhase {
        &self.phase
    }

    pub fn room(&self) -> &RoomSnapshot {
        &self.room
    }

    /// Users payload from the latest snapshot, `Null` before the first one.
    pub fn users(&self) -> &Value {
        &self.users
    }

    /// Number of members in the current snapshot.
    pub fn occupancy(&self) -> usize {
        self.room.members.len()
    }

    /// Whether the "accept new game" control is on screen.
    pub fn recovery_available(&self) -> bool {
        self.phase == LobbyPhase::Terminated
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Apply a fresh room snapshot.
    pub fn pass_room(&mut self, room: RoomSnapshot, users: Value) {
        if !self.phase.is_open() {
            debug!(phase = ?self.phase, "lobby: ignoring pass-room");
            return;
        }
        debug!(name = %room.name, members = room.members.len(), "lobby: room updated");
        self.room = room;
        self.users = users;
        self.phase = LobbyPhase::Active;
    }

    /// The server removed this client from the room.
    pub fn kicked(&mut self) {
        if !self.phase.is_open() {
            debug!(phase = ?self.phase, "lobby: ignoring kicked");
            return;
        }
        debug!("lobby: kicked");
        self.phase = LobbyPhase::Terminated;
    }

    /// The room's game is starting.
    pub fn start(&mut self, time: Value) {
        if !self.phase.is_open() {
            debug!(phase = ?self.phase, "lobby: ignoring start");
            return;
        }
        debug!(%time, "lobby: game starting");
        self.phase = LobbyPhase::Started { time };
        self.navigator.navigate(Route::GameView);
    }

    /// Accept a new multiplayer game after being kicked.
    ///
    /// Returns `false` (and does nothing) unless the lobby is `Terminated`.
    pub fn accept_new_game(&mut self) -> bool {
        if !self.recovery_available() {
            debug!(phase = ?self.phase, "lobby: no recovery to accept");
            return false;
        }
        self.phase = LobbyPhase::Left;
        self.navigator.navigate(Route::Multiplayer);
        true
    }

    /// Leave the lobby for the room directory. Available in every phase.
    pub fn leave(&mut self) {
        debug!(phase = ?self.phase, "lobby: leaving");
        self.phase = LobbyPhase::Left;
        self.navigator.navigate(Route::Multiplayer);
    }

    /// Activate a UI control. Returns whether it had an effect.
    pub fn click(&mut self, control: LobbyControl) -> bool {
        match control {
            LobbyControl::AcceptNewGame => self.accept_new_game(),
            LobbyControl::Leave => {
                self.leave();
                true
            }
        }
    }
}

impl<O: Outbound, N: Navigator> EventHandler for RoomLobby<O, N> {
    fn handle_event(&mut self, event: LobbyEvent) {
        match event {
            LobbyEvent::RoomPassed { room, users } => self.pass_room(room, users),
            LobbyEvent::Kicked => self.kicked(),
            LobbyEvent::Started { time } => self.start(time),
            LobbyEvent::Connected
            | LobbyEvent::UsersPassed { .. }
            | LobbyEvent::Disconnected { .. } => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::navigation::History;
    use serde_json::json;
    use tokio::sync::mpsc;

    type TestLobby = RoomLobby<mpsc::UnboundedSender<ClientMessage>, History>;

    fn mounted() -> (TestLobby, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RoomLobby::mount(tx, History::new()), rx)
    }

    #[test]
    fn mount_requests_room_export() {
        let (lobby, mut rx) = mounted();
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::ExportRoom);
        assert!(rx.try_recv().is_err());
        assert_eq!(lobby.phase(), &LobbyPhase::Forming);
    }

    #[test]
    fn mount_survives_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel::<ClientMessage>();
        drop(rx);
        let lobby = RoomLobby::mount(tx, History::new());
        assert_eq!(lobby.phase(), &LobbyPhase::Forming);
    }

    #[test]
    fn initial_room_is_shown_before_first_snapshot() {
        let (lobby, _rx) = mounted();
        let lobby = lobby.with_initial_room(RoomSnapshot::new("test", vec![]));
        assert_eq!(lobby.room().name, "test");
        assert_eq!(lobby.occupancy(), 0);
    }

    #[test]
    fn pass_room_replaces_snapshot_and_activates() {
        let (mut lobby, _rx) = mounted();
        lobby.pass_room(
            RoomSnapshot::new("room_updated", vec![json!("a"), json!("b")]),
            json!(["a", "b"]),
        );
        assert_eq!(lobby.phase(), &LobbyPhase::Active);
        assert_eq!(lobby.room().name, "room_updated");
        assert_eq!(lobby.occupancy(), 2);
        assert_eq!(lobby.users(), &json!(["a", "b"]));

        lobby.pass_room(RoomSnapshot::new("smaller", vec![json!("a")]), json!(["a"]));
        assert_eq!(lobby.occupancy(), 1);
        assert_eq!(lobby.room().name, "smaller");
    }

    #[test]
    fn start_navigates_to_game_view_and_keeps_time() {
        let (mut lobby, _rx) = mounted();
        lobby.start(json!(3000));
        assert_eq!(lobby.phase(), &LobbyPhase::Started { time: json!(3000) });
        assert_eq!(lobby.navigator().pathname(), "/game-view");
    }

    #[test]
    fn kicked_then_accept_goes_to_multiplayer() {
        let (mut lobby, _rx) = mounted();
        lobby.pass_room(RoomSnapshot::new("r", vec![]), json!([]));
        assert!(!lobby.recovery_available());

        lobby.kicked();
        assert_eq!(lobby.phase(), &LobbyPhase::Terminated);
        assert!(lobby.recovery_available());
        assert!(lobby.navigator().current().is_none());

        assert!(lobby.click(LobbyControl::AcceptNewGame));
        assert_eq!(lobby.navigator().pathname(), "/multiplayer");
        assert_eq!(lobby.phase(), &LobbyPhase::Left);
    }

    #[test]
    fn accept_without_kick_is_a_no_op() {
        let (mut lobby, _rx) = mounted();
        assert!(!lobby.accept_new_game());
        assert!(lobby.navigator().entries().is_empty());
    }

    #[test]
    fn leave_works_after_game_started() {
        let (mut lobby, _rx) = mounted();
        lobby.start(json!(3000));
        assert!(lobby.click(LobbyControl::Leave));
        assert_eq!(
            lobby.navigator().entries(),
            &[Route::GameView, Route::Multiplayer]
        );
    }

    #[test]
    fn terminal_phases_ignore_later_events() {
        let (mut lobby, _rx) = mounted();
        lobby.kicked();
        lobby.kicked();
        lobby.start(json!(1));
        lobby.pass_room(RoomSnapshot::new("late", vec![json!("x")]), json!([]));
        assert_eq!(lobby.phase(), &LobbyPhase::Terminated);
        assert_eq!(lobby.room().name, "");
        assert!(lobby.navigator().entries().is_empty());

        let (mut started, _rx) = mounted();
        started.start(json!(1));
        started.handle_event(LobbyEvent::Kicked);
        assert_eq!(started.phase(), &LobbyPhase::Started { time: json!(1) });
    }

    #[test]
    fn handle_event_dispatches_and_ignores_directory_events() {
        let (mut lobby, _rx) = mounted();
        lobby.handle_event(LobbyEvent::UsersPassed { entries: vec![] });
        assert_eq!(lobby.phase(), &LobbyPhase::Forming);
        lobby.handle_event(LobbyEvent::RoomPassed {
            room: RoomSnapshot::new("r", vec![json!(1)]),
            users: json!([1]),
        });
        assert_eq!(lobby.occupancy(), 1);
    }

    #[test]
    fn control_ids_round_trip() {
        for control in [LobbyControl::AcceptNewGame, LobbyControl::Leave] {
            assert_eq!(control.id().parse::<LobbyControl>().unwrap(), control);
        }
        assert!("next-page".parse::<LobbyControl>().is_err());
    }
}
