#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! End-to-end flows: mock server → `RealtimeChannel` → `pump` → view state.

mod common;

use std::sync::atomic::Ordering;

use common::{kicked_json, pass_room_json, pass_users_json, start_json, MockTransport};
use lobby_board::{
    pump, ChannelConfig, DirectoryControl, History, LobbyControl, LobbyEvent, LobbyPhase,
    RealtimeChannel, RoomDirectory, RoomListing, RoomLobby, Route,
};
use serde_json::json;

#[tokio::test]
async fn lobby_mount_requests_room_and_applies_snapshots() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

    let mut lobby = RoomLobby::mount(&channel, History::new());
    assert_eq!(server.next_request().await, r#"{"event":"export-room"}"#);

    server.push(pass_room_json("room_updated", &["a", "b", "c"]));
    server.push(pass_room_json("room_updated", &["a", "b"]));
    server.hang_up();

    let reason = pump(&mut events, &mut lobby).await;
    assert!(reason.is_none());
    assert_eq!(lobby.phase(), &LobbyPhase::Active);
    assert_eq!(lobby.room().name, "room_updated");
    assert_eq!(lobby.occupancy(), 2);
    assert_eq!(lobby.users(), &json!(["a", "b"]));
}

#[tokio::test]
async fn lobby_start_navigates_to_game_view() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    let mut lobby = RoomLobby::mount(&channel, History::new());
    server.next_request().await;

    server.push(pass_room_json("r", &["a"]));
    server.push(start_json(json!(3000)));
    // Ignored: the lobby is already terminal.
    server.push(kicked_json());
    server.hang_up();

    pump(&mut events, &mut lobby).await;
    assert_eq!(lobby.phase(), &LobbyPhase::Started { time: json!(3000) });
    assert_eq!(lobby.navigator().pathname(), "/game-view");

    assert!(lobby.click(LobbyControl::Leave));
    assert_eq!(lobby.navigator().pathname(), "/multiplayer");
}

#[tokio::test]
async fn kicked_lobby_offers_recovery_to_directory() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    let mut lobby = RoomLobby::mount(&channel, History::new());
    server.next_request().await;

    server.push(pass_room_json("r", &["a", "b"]));
    server.push(kicked_json());
    server.hang_up();
    pump(&mut events, &mut lobby).await;

    assert_eq!(lobby.phase(), &LobbyPhase::Terminated);
    assert!(lobby.recovery_available());
    assert!(lobby.click("accept-multiplayer-game".parse().unwrap()));
    assert_eq!(lobby.navigator().current(), Some(Route::Multiplayer));
}

#[tokio::test]
async fn malformed_pass_room_keeps_prior_state() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    let mut lobby = RoomLobby::mount(&channel, History::new());
    server.next_request().await;

    server.push(pass_room_json("first", &["a"]));
    server.push(r#"{"event":"pass-room","data":{"room":{"name":"broken"}}}"#);
    server.push(r#"{"event":"pass-room","data":{"users":[]}}"#);
    server.push("not json at all");
    server.hang_up();
    pump(&mut events, &mut lobby).await;

    assert_eq!(lobby.room().name, "first");
    assert_eq!(lobby.occupancy(), 1);
}

#[tokio::test]
async fn transport_failure_ends_the_pump_with_a_reason() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    let mut lobby = RoomLobby::mount(&channel, History::new());
    server.next_request().await;

    server.fail("connection reset");
    let reason = pump(&mut events, &mut lobby).await.unwrap();
    assert!(reason.contains("connection reset"), "reason: {reason}");
    assert_eq!(lobby.phase(), &LobbyPhase::Forming);
    assert!(!channel.is_connected());
}

#[tokio::test]
async fn directory_groups_rooms_and_joins_one() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

    let mut directory = RoomDirectory::mount(&channel, History::new());
    assert_eq!(server.next_request().await, r#"{"event":"export-users"}"#);

    server.push(pass_users_json(&[2, 2, 3]));
    server.hang_up();
    pump(&mut events, &mut directory).await;

    assert_eq!(
        directory.rooms(),
        &[
            RoomListing {
                room_id: 2,
                occupancy: 2
            },
            RoomListing {
                room_id: 3,
                occupancy: 1
            },
        ]
    );

    assert!(!directory.click(DirectoryControl::JoinRoom(9)));
    assert!(directory.click(DirectoryControl::JoinRoom(2)));
    let route = directory.navigator().current().unwrap();
    assert_eq!(route, Route::GameLobby { room_id: 2 });
    assert_eq!(route.to_string(), "/game-lobby?room=2");
}

#[tokio::test]
async fn directory_create_room_navigates_without_touching_listing() {
    let (transport, mut server) = MockTransport::linked();
    let (channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    let mut directory = RoomDirectory::mount(&channel, History::new());
    server.next_request().await;

    server.push(pass_users_json(&[7]));
    server.hang_up();
    pump(&mut events, &mut directory).await;

    assert!(directory.click("create-room-btn".parse().unwrap()));
    assert_eq!(directory.navigator().pathname(), "/create-room");
    assert_eq!(directory.rooms().len(), 1);
}

#[tokio::test]
async fn shutdown_closes_transport_and_rejects_sends() {
    let (transport, server) = MockTransport::linked();
    let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
    assert_eq!(events.recv().await, Some(LobbyEvent::Connected));

    channel.shutdown().await;
    assert!(server.closed.load(Ordering::Relaxed));
    assert!(matches!(
        events.recv().await,
        Some(LobbyEvent::Disconnected { .. })
    ));
    assert!(events.recv().await.is_none());

    // A view mounted after shutdown still comes up; the request is just lost.
    let lobby = RoomLobby::mount(&channel, History::new());
    assert_eq!(lobby.phase(), &LobbyPhase::Forming);
}
