//! # Lobby Browser Example
//!
//! Connects to a lobby server, lists the open rooms, joins the first one and
//! follows its lobby until the game starts. If a statistics endpoint is
//! configured the top players are printed first.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example lobby_browser
//!
//! # Override the endpoints:
//! LOBBY_URL=ws://my-server:3000/lobby \
//! STATS_URL=http://my-server:5000/players \
//! cargo run --example lobby_browser
//! ```

use lobby_board::{
    pump, ChannelConfig, History, LobbyEvent, LobbyPhase, RealtimeChannel, RoomDirectory,
    RoomLobby, WebSocketTransport,
};

/// Default server URL when `LOBBY_URL` is not set.
const DEFAULT_URL: &str = "ws://localhost:3000/lobby";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Set `RUST_LOG=debug` to see state transitions.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Leaderboard ─────────────────────────────────────────────────
    print_top_players().await?;

    // ── Connect ─────────────────────────────────────────────────────
    let url = std::env::var("LOBBY_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    tracing::info!("Connecting to {url}");
    let transport = WebSocketTransport::connect(&url).await?;
    let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

    // ── Directory ───────────────────────────────────────────────────
    // Wait for the first membership push, then pick a room.
    let mut directory = RoomDirectory::mount(&channel, History::new());
    let room_id = loop {
        match events.recv().await {
            Some(LobbyEvent::Disconnected { reason }) => {
                tracing::warn!(?reason, "disconnected before any room was listed");
                return Ok(());
            }
            None => return Ok(()),
            Some(event) => {
                lobby_board::EventHandler::handle_event(&mut directory, event);
                if let Some(room) = directory.rooms().first() {
                    for listing in directory.rooms() {
                        println!("room {:>4}  players {}", listing.room_id, listing.occupancy);
                    }
                    break room.room_id;
                }
            }
        }
    };

    if !directory.join_room(room_id) {
        return Ok(());
    }
    if let Some(route) = directory.navigator().current() {
        tracing::info!(%route, "joining");
    }

    // ── Lobby ───────────────────────────────────────────────────────
    let mut lobby = RoomLobby::mount(&channel, History::new());
    let interrupted = tokio::select! {
        reason = pump(&mut events, &mut lobby) => {
            tracing::info!(?reason, "channel closed");
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        tracing::info!("Ctrl+C received, leaving");
        lobby.leave();
    }

    match lobby.phase() {
        LobbyPhase::Started { time } => println!("game starting ({time})"),
        LobbyPhase::Terminated => println!("kicked from room {room_id}"),
        other => println!("lobby ended in {other:?}"),
    }

    drop(lobby);
    drop(directory);
    channel.shutdown().await;
    Ok(())
}

/// Print the top ten when `STATS_URL` points at a statistics endpoint.
#[cfg(feature = "http-source")]
async fn print_top_players() -> Result<(), Box<dyn std::error::Error>> {
    use lobby_board::{HttpSourceConfig, HttpStatsSource, StatisticsTable, StatsControl};

    let Ok(url) = std::env::var("STATS_URL") else {
        return Ok(());
    };
    let source = HttpStatsSource::new(HttpSourceConfig::new(url))?;
    let mut table = StatisticsTable::new();
    if !table.load(&source).await {
        tracing::warn!("statistics unavailable");
        return Ok(());
    }

    table.click("filter-top-10".parse::<StatsControl>()?);
    table.click("sort-up-by-rank".parse::<StatsControl>()?);
    for row in table.rows() {
        println!("{:>4}  {}  {}", row.rank, row.summary, row.identity);
    }
    Ok(())
}

#[cfg(not(feature = "http-source"))]
async fn print_top_players() -> Result<(), Box<dyn std::error::Error>> {
    Ok(())
}
