//! # Lobby Board
//!
//! Client-side state core for a multiplayer game lobby and its player
//! statistics table.
//!
//! The crate holds no UI. It models three views as state machines that react
//! to server events and user actions, and tells the host where to navigate:
//!
//! - [`RoomLobby`]: the lobby of the room this client sits in
//! - [`RoomDirectory`]: the list of open rooms, grouped from the membership list
//! - [`StatisticsTable`]: the leaderboard, filtered, sorted and paged by
//!   [`projection`]
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement [`Transport`] for any text channel
//! - **WebSocket built-in**: default `transport-websocket` feature provides `WebSocketTransport`
//! - **HTTP statistics**: default `http-source` feature provides `HttpStatsSource`
//! - **Event-driven**: typed [`LobbyEvent`]s arrive on a channel and are
//!   applied in order by [`pump`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lobby_board::{
//!     pump, ChannelConfig, History, RealtimeChannel, RoomDirectory, WebSocketTransport,
//! };
//!
//! # async fn run() -> Result<(), lobby_board::LobbyError> {
//! let transport = WebSocketTransport::connect("ws://localhost:3000/lobby").await?;
//! let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
//!
//! let mut directory = RoomDirectory::mount(&channel, History::new());
//! pump(&mut events, &mut directory).await;
//! for room in directory.rooms() {
//!     println!("room {} has {} players", room.room_id, room.occupancy);
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod directory;
pub mod error;
pub mod event;
pub mod lobby;
pub mod navigation;
pub mod projection;
pub mod protocol;
pub mod source;
pub mod sources;
pub mod stats;
pub mod transport;
pub mod transports;

pub use channel::{ChannelConfig, Outbound};
#[cfg(feature = "tokio-runtime")]
pub use channel::RealtimeChannel;
pub use directory::{DirectoryControl, RoomDirectory, RoomListing};
pub use error::{LobbyError, UnknownControl};
pub use event::{pump, EventHandler, LobbyEvent};
pub use lobby::{LobbyControl, LobbyPhase, RoomLobby};
pub use navigation::{History, Navigator, Route};
pub use projection::{RankCeiling, SortDirection, SortKey, ViewOptions, PAGE_SIZE};
pub use protocol::{
    ClientMessage, MembershipEntry, PlayerRecord, RawPlayerRecord, RoomSnapshot, ServerMessage,
};
pub use source::StatsSource;
#[cfg(feature = "http-source")]
pub use sources::{HttpSourceConfig, HttpStatsSource};
pub use stats::{FetchTicket, SortColumn, StatisticsTable, StatsControl, StatsRow};
pub use transport::Transport;
#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
