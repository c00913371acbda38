//! State machine for the multiplayer room browser.
//!
//! The directory owns no room state of its own: every `pass-users` push
//! rebuilds the listing by grouping the flat membership list by room.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::channel::Outbound;
use crate::error::UnknownControl;
use crate::event::{EventHandler, LobbyEvent};
use crate::navigation::{Navigator, Route};
use crate::protocol::{ClientMessage, MembershipEntry, RoomNumber};

/// One row of the room browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomListing {
    pub room_id: RoomNumber,
    /// Number of membership entries naming this room.
    pub occupancy: usize,
}

/// Group `entries` by room, in the order rooms are first seen.
pub fn group_rooms(entries: &[MembershipEntry]) -> Vec<RoomListing> {
    let mut listings: Vec<RoomListing> = Vec::new();
    let mut slots: HashMap<RoomNumber, usize> = HashMap::new();

    for entry in entries {
        match slots.get(&entry.room) {
            Some(&slot) => {
                if let Some(listing) = listings.get_mut(slot) {
                    listing.occupancy += 1;
                }
            }
            None => {
                slots.insert(entry.room, listings.len());
                listings.push(RoomListing {
                    room_id: entry.room,
                    occupancy: 1,
                });
            }
        }
    }

    listings
}

/// Actionable elements of the room browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryControl {
    CreateRoom,
    /// The join button on a room's row.
    JoinRoom(RoomNumber),
}

impl DirectoryControl {
    pub const CREATE_ROOM_ID: &'static str = "create-room-btn";
    pub const JOIN_ROOM_ID: &'static str = "join-btn";

    /// Element id of the control. Every join button shares one id.
    pub fn id(self) -> &'static str {
        match self {
            Self::CreateRoom => Self::CREATE_ROOM_ID,
            Self::JoinRoom(_) => Self::JOIN_ROOM_ID,
        }
    }
}

impl fmt::Display for DirectoryControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DirectoryControl {
    type Err = UnknownControl;

    /// Parses the create button only; join buttons need their row's room.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::CREATE_ROOM_ID => Ok(Self::CreateRoom),
            other => Err(UnknownControl(other.to_string())),
        }
    }
}

/// The multiplayer room browser.
#[derive(Debug)]
pub struct RoomDirectory<O, N> {
    outbound: O,
    navigator: N,
    rooms: Vec<RoomListing>,
}

impl<O: Outbound, N: Navigator> RoomDirectory<O, N> {
    /// Mount the directory and ask the server for the membership list.
    pub fn mount(outbound: O, navigator: N) -> Self {
        let directory = Self {
            outbound,
            navigator,
            rooms: Vec::new(),
        };
        if let Err(e) = directory.outbound.emit(ClientMessage::ExportUsers) {
            warn!("directory: could not request user export: {e}");
        }
        directory
    }

    /// Rooms currently listed, in discovery order.
    pub fn rooms(&self) -> &[RoomListing] {
        &self.rooms
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Rebuild the listing from a fresh membership list.
    pub fn pass_users(&mut self, entries: &[MembershipEntry]) {
        self.rooms = group_rooms(entries);
        debug!(
            users = entries.len(),
            rooms = self.rooms.len(),
            "directory: listing rebuilt"
        );
    }

    /// Open the room-creation view.
    pub fn create_room(&mut self) {
        self.navigator.navigate(Route::CreateRoom);
    }

    /// Enter the lobby of a listed room.
    ///
    /// Returns `false` (and does nothing) when the room is not listed.
    pub fn join_room(&mut self, room_id: RoomNumber) -> bool {
        if !self.rooms.iter().any(|room| room.room_id == room_id) {
            debug!(room_id, "directory: join for unlisted room ignored");
            return false;
        }
        self.navigator.navigate(Route::GameLobby { room_id });
        true
    }

    /// Activate a UI control. Returns whether it had an effect.
    pub fn click(&mut self, control: DirectoryControl) -> bool {
        match control {
            DirectoryControl::CreateRoom => {
                self.create_room();
                true
            }
            DirectoryControl::JoinRoom(room_id) => self.join_room(room_id),
        }
    }
}

impl<O: Outbound, N: Navigator> EventHandler for RoomDirectory<O, N> {
    fn handle_event(&mut self, event: LobbyEvent) {
        if let LobbyEvent::UsersPassed { entries } = event {
            self.pass_users(&entries);
        }
    }
}
