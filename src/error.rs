//! Error types for the lobby board.
//!
//! Errors only surface at the edges of the crate: the real-time
//! [`Transport`](crate::Transport), the [`RealtimeChannel`](crate::RealtimeChannel)
//! handle and the [`StatsSource`](crate::StatsSource). The state machines
//! themselves never return errors; they log and keep their prior state.

use thiserror::Error;

/// Errors that can occur when talking to the lobby server or the statistics source.
#[derive(Debug, Error)]
pub enum LobbyError {
    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was closed unexpectedly.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a channel message or player record.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The real-time channel has shut down and can no longer send.
    #[error("not connected to server")]
    NotConnected,

    /// The statistics request could not be completed or decoded.
    #[error("statistics fetch failed: {0}")]
    Fetch(String),

    /// The statistics endpoint answered with a non-success status.
    #[error("statistics endpoint returned HTTP {0}")]
    HttpStatus(u16),

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A UI control id that no view exposes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown control id: {0}")]
pub struct UnknownControl(pub String);

/// A specialized [`Result`] type for lobby board operations.
pub type Result<T> = std::result::Result<T, LobbyError>;
