//! Real-time channel handle.
//!
//! [`RealtimeChannel`] is a thin handle that talks to a background transport
//! loop over an unbounded MPSC channel. Validated [`LobbyEvent`]s come back on
//! the bounded receiver returned from [`RealtimeChannel::start`].
//!
//! # Example
//!
//! ```rust,ignore
//! let transport = connect_somehow().await;
//! let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
//!
//! let mut directory = RoomDirectory::mount(channel, History::new());
//! pump(&mut events, &mut directory).await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::{LobbyError, Result};
use crate::protocol::ClientMessage;

#[cfg(feature = "tokio-runtime")]
mod realtime;

#[cfg(feature = "tokio-runtime")]
pub use realtime::RealtimeChannel;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Outbound seam ───────────────────────────────────────────────────

/// Send side of the real-time channel, as seen by the state machines.
///
/// Emitting is fire-and-forget: the call returns once the message is queued.
pub trait Outbound {
    /// Queue `message` for delivery to the server.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotConnected`] if nothing is listening anymore.
    fn emit(&self, message: ClientMessage) -> Result<()>;
}

impl Outbound for mpsc::UnboundedSender<ClientMessage> {
    fn emit(&self, message: ClientMessage) -> Result<()> {
        self.send(message).map_err(|_| LobbyError::NotConnected)
    }
}

impl<O: Outbound + ?Sized> Outbound for &O {
    fn emit(&self, message: ClientMessage) -> Result<()> {
        (**self).emit(message)
    }
}

impl<O: Outbound + ?Sized> Outbound for Arc<O> {
    fn emit(&self, message: ClientMessage) -> Result<()> {
        (**self).emit(message)
    }
}

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`RealtimeChannel`].
///
/// # Example
///
/// ```
/// use lobby_board::channel::ChannelConfig;
/// use std::time::Duration;
///
/// let config = ChannelConfig::new()
///     .with_event_channel_capacity(64)
///     .with_shutdown_timeout(Duration::from_millis(250));
/// assert_eq!(config.event_channel_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Capacity of the bounded event channel.
    ///
    /// When it is full the transport loop waits for the consumer instead of
    /// dropping events, so lifecycle events are never lost.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// How long [`RealtimeChannel::shutdown`] waits for the loop to close the
    /// transport before aborting it.
    ///
    /// Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self {
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Set the capacity of the bounded event channel (clamped to at least 1).
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}
