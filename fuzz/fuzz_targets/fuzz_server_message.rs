#![no_main]

use libfuzzer_sys::fuzz_target;
use lobby_board::protocol::ServerMessage;
use lobby_board::LobbyEvent;

fuzz_target!(|data: &[u8]| {
    // Decoding and validation must never panic, whatever the server sends.
    if let Ok(msg) = serde_json::from_slice::<ServerMessage>(data) {
        let _ = LobbyEvent::from_message(msg);
    }
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = ServerMessage::from_frame(text);
    }
});
