//! Logical navigation targets and the navigator seam.

use std::fmt;

use crate::protocol::RoomNumber;

/// A view the client can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// The running game.
    GameView,
    /// The room directory.
    Multiplayer,
    /// Form for opening a new room.
    CreateRoom,
    /// Lobby of a specific room.
    GameLobby { room_id: RoomNumber },
}

impl Route {
    /// Path of the view, without route parameters.
    pub fn path(&self) -> &'static str {
        match self {
            Self::GameView => "/game-view",
            Self::Multiplayer => "/multiplayer",
            Self::CreateRoom => "/create-room",
            Self::GameLobby { .. } => "/game-lobby",
        }
    }

    /// Room id carried by the route, if any.
    pub fn room_id(&self) -> Option<RoomNumber> {
        match self {
            Self::GameLobby { room_id } => Some(*room_id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameLobby { room_id } => write!(f, "{}?room={room_id}", self.path()),
            other => f.write_str(other.path()),
        }
    }
}

/// Receives navigation commands issued by the state machines.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn navigate(&mut self, route: Route) {
        (**self).navigate(route);
    }
}

/// In-memory navigation history.
///
/// Starts with no entry; every [`navigate`](Navigator::navigate) call pushes one.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Route>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent route, if any navigation happened.
    pub fn current(&self) -> Option<Route> {
        self.entries.last().copied()
    }

    /// Path of the most recent route, `"/"` before the first navigation.
    pub fn pathname(&self) -> &'static str {
        self.current().map_or("/", |route| route.path())
    }

    /// Every route pushed so far, oldest first.
    pub fn entries(&self) -> &[Route] {
        &self.entries
    }
}

impl Navigator for History {
    fn navigate(&mut self, route: Route) {
        tracing::debug!(%route, "navigate");
        self.entries.push(route);
    }
}
