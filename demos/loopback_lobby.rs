//! # Loopback Lobby Example
//!
//! Runs a room lobby against an in-process fake server, no network needed.
//! Shows how to plug a custom [`Transport`] into a [`RealtimeChannel`].
//!
//! ## Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --example loopback_lobby
//! ```

use async_trait::async_trait;
use lobby_board::protocol::{ClientMessage, PassRoomPayload, ServerMessage};
use lobby_board::{
    pump, ChannelConfig, History, LobbyError, RealtimeChannel, RoomLobby, RoomSnapshot, Transport,
};
use serde_json::json;
use tokio::sync::mpsc;

/// Client end of an in-memory text pipe.
struct Loopback {
    to_server: mpsc::UnboundedSender<String>,
    from_server: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl Transport for Loopback {
    async fn send(&mut self, message: String) -> Result<(), LobbyError> {
        self.to_server
            .send(message)
            .map_err(|e| LobbyError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, LobbyError>> {
        self.from_server.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), LobbyError> {
        self.from_server.close();
        Ok(())
    }
}

/// Answers `export-room` with a two-player room, then starts the game.
async fn fake_server(
    mut requests: mpsc::UnboundedReceiver<String>,
    replies: mpsc::UnboundedSender<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    while let Some(request) = requests.recv().await {
        let request: ClientMessage = serde_json::from_str(&request)?;
        tracing::info!(?request, "server: request");
        if request != ClientMessage::ExportRoom {
            continue;
        }

        let members = vec![json!({"id": 1, "name": "kot"}), json!({"id": 2, "name": "pies"})];
        let room = ServerMessage::PassRoom(PassRoomPayload {
            room: Some(RoomSnapshot::new("loopback", members.clone())),
            users: Some(json!(members)),
        });
        replies.send(serde_json::to_string(&room)?)?;
        replies.send(serde_json::to_string(&ServerMessage::Start(json!(3000)))?)?;
        // Dropping `replies` closes the connection.
        return Ok(());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (to_server, requests) = mpsc::unbounded_channel();
    let (replies, from_server) = mpsc::unbounded_channel();
    let server = tokio::spawn(fake_server(requests, replies));

    let transport = Loopback {
        to_server,
        from_server,
    };
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

    let mut lobby = RoomLobby::mount(&channel, History::new());
    let reason = pump(&mut events, &mut lobby).await;

    println!("room:       {}", lobby.room().name);
    println!("players:    {}", lobby.occupancy());
    println!("phase:      {:?}", lobby.phase());
    println!("navigated:  {:?}", lobby.navigator().entries());
    println!("disconnect: {reason:?}");

    server.await??;
    Ok(())
}
