//! Transport abstraction for the real-time lobby channel.
//!
//! The [`Transport`] trait defines a bidirectional text message channel between
//! the client and the lobby server. Every event travels as one JSON text
//! message, so a transport implementation handles framing internally
//! (WebSocket frames, length-prefixed TCP, an in-process loopback, ...).
//!
//! # Connection Setup
//!
//! Connecting is not part of this trait. Build a connected transport
//! externally, then hand it to [`RealtimeChannel::start`](crate::RealtimeChannel::start).
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use lobby_board::error::LobbyError;
//! use lobby_board::transport::Transport;
//! use tokio::sync::mpsc;
//!
//! struct Loopback {
//!     tx: mpsc::UnboundedSender<String>,
//!     rx: mpsc::UnboundedReceiver<String>,
//! }
//!
//! #[async_trait]
//! impl Transport for Loopback {
//!     async fn send(&mut self, message: String) -> Result<(), LobbyError> {
//!         self.tx
//!             .send(message)
//!             .map_err(|e| LobbyError::TransportSend(e.to_string()))
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, LobbyError>> {
//!         self.rx.recv().await.map(Ok)
//!     }
//!
//!     async fn close(&mut self) -> Result<(), LobbyError> {
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::LobbyError;

/// A bidirectional text message transport for the lobby channel.
///
/// Each call to [`send`](Transport::send) transmits one complete JSON message
/// and each call to [`recv`](Transport::recv) returns one.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) **MUST** be cancel-safe because the channel's
/// transport loop polls it inside `tokio::select!`. A cancelled `recv` must not
/// lose a message. Channel-backed implementations are naturally cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::TransportSend`] if the message could not be sent.
    async fn send(&mut self, message: String) -> Result<(), LobbyError>;

    /// Receive the next JSON text message from the server.
    ///
    /// Returns:
    /// - `Some(Ok(text))`: a complete message was received
    /// - `Some(Err(e))`: a transport error occurred
    /// - `None`: the server closed the connection cleanly
    async fn recv(&mut self) -> Option<Result<String, LobbyError>>;

    /// Close the transport connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release their resources in that case.
    async fn close(&mut self) -> Result<(), LobbyError>;
}
