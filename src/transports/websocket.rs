//! Lobby channel over a WebSocket, using `tokio-tungstenite`.
//!
//! Each channel event travels as one text frame. `ws://` and `wss://` URLs
//! are both accepted.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), lobby_board::LobbyError> {
//! use lobby_board::{ChannelConfig, RealtimeChannel, WebSocketTransport};
//!
//! let transport = WebSocketTransport::connect("ws://localhost:3000/lobby").await?;
//! let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
//! # drop((channel, events.recv().await));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::error::LobbyError;
use crate::transport::Transport;

/// The WebSocket stream wrapped by [`WebSocketTransport`].
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Transport`] carrying lobby events as WebSocket text frames.
///
/// [`recv`](Transport::recv) is cancel-safe, so the transport can sit inside
/// the channel loop's `tokio::select!`.
#[derive(Debug)]
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a connection to the lobby server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Io`] when the URL is invalid or the handshake
    /// fails. The I/O error kind is kept when tungstenite reports one.
    pub async fn connect(url: &str) -> Result<Self, LobbyError> {
        debug!(url = %url, "websocket: connecting");

        let (stream, _response) = tokio_tungstenite::connect_async(url).await.map_err(|e| {
            let kind = match &e {
                tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
                _ => std::io::ErrorKind::Other,
            };
            LobbyError::Io(std::io::Error::new(kind, e))
        })?;

        info!(url = %url, "websocket: connected");
        Ok(Self::from_stream(stream))
    }

    /// Like [`connect`](Self::connect), failing with [`LobbyError::Timeout`]
    /// when the handshake takes longer than `timeout`.
    pub async fn connect_with_timeout(url: &str, timeout: Duration) -> Result<Self, LobbyError> {
        tokio::time::timeout(timeout, Self::connect(url))
            .await
            .map_err(|_| LobbyError::Timeout)?
    }

    /// Wrap a stream that was set up elsewhere (custom TLS, headers, proxy).
    pub fn from_stream(stream: WsStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: String) -> Result<(), LobbyError> {
        if self.closed {
            return Err(LobbyError::TransportClosed);
        }
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| LobbyError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, LobbyError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(LobbyError::TransportReceive(e.to_string()))),
            };

            match frame {
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(close) => {
                    debug!(?close, "websocket: close frame");
                    return None;
                }
                // tungstenite answers pings itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                Message::Binary(bytes) => {
                    warn!(len = bytes.len(), "websocket: skipping binary frame");
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), LobbyError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| LobbyError::TransportSend(e.to_string()))
    }
}
