//! Background transport loop and the handle that drives it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use super::{ChannelConfig, Outbound};
use crate::error::{LobbyError, Result};
use crate::event::LobbyEvent;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::transport::Transport;

/// Handle to a running real-time channel.
///
/// Created via [`RealtimeChannel::start`]. Sending only queues the message;
/// there is no round trip to await.
pub struct RealtimeChannel {
    cmd_tx: mpsc::UnboundedSender<ClientMessage>,
    connected: Arc<AtomicBool>,
    task: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    shutdown_timeout: Duration,
}

impl RealtimeChannel {
    /// Spawn the transport loop and return a handle plus the event receiver.
    ///
    /// The receiver yields [`LobbyEvent::Connected`] first and
    /// [`LobbyEvent::Disconnected`] last.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        transport: impl Transport,
        config: ChannelConfig,
    ) -> (Self, mpsc::Receiver<LobbyEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<ClientMessage>();
        // tokio panics on a zero-capacity channel.
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<LobbyEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let connected = Arc::new(AtomicBool::new(true));

        let task = tokio::spawn(transport_loop(
            transport,
            cmd_rx,
            event_tx,
            Arc::clone(&connected),
            shutdown_rx,
        ));

        let channel = Self {
            cmd_tx,
            connected,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (channel, event_rx)
    }

    /// Queue a message for the server.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::NotConnected`] once the transport loop has exited.
    pub fn send(&self, message: ClientMessage) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(LobbyError::NotConnected);
        }
        self.cmd_tx
            .send(message)
            .map_err(|_| LobbyError::NotConnected)
    }

    /// Returns `true` while the transport loop is believed to be running.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Close the transport and stop the background task.
    ///
    /// The event receiver yields `Disconnected` and then `None`.
    pub async fn shutdown(&mut self) {
        debug!("RealtimeChannel: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("transport loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("transport loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("transport loop aborted: {join_err}");
                    }
                }
            }
        }

        self.connected.store(false, Ordering::Release);
    }
}

impl Outbound for RealtimeChannel {
    fn emit(&self, message: ClientMessage) -> Result<()> {
        self.send(message)
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("connected", &self.is_connected())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        // No executor to drive an async close from here; abort instead.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Transport loop ──────────────────────────────────────────────────

/// Multiplexes outbound commands, the shutdown signal and inbound frames.
///
/// Exits when the handle is dropped or shut down, when the server closes the
/// connection, or on a transport error.
async fn transport_loop(
    mut transport: impl Transport,
    mut cmd_rx: mpsc::UnboundedReceiver<ClientMessage>,
    event_tx: mpsc::Sender<LobbyEvent>,
    connected: Arc<AtomicBool>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("transport loop started");

    emit_event(&event_tx, LobbyEvent::Connected).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(msg) => {
                        debug!(?msg, "sending client message");
                        match msg.to_frame() {
                            Ok(json) => {
                                if let Err(e) = transport.send(json).await {
                                    error!("transport send error: {e}");
                                    emit_disconnected(
                                        &event_tx,
                                        &connected,
                                        Some(format!("transport send error: {e}")),
                                    ).await;
                                    break;
                                }
                            }
                            Err(e) => error!("failed to serialize ClientMessage: {e}"),
                        }
                    }
                    None => {
                        debug!("command channel closed, shutting down transport loop");
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                        break;
                    }
                }
            }

            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                let _ = transport.close().await;
                emit_disconnected(&event_tx, &connected, Some("client shut down".into())).await;
                break;
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => match ServerMessage::from_frame(&text) {
                        Ok(msg) => {
                            if let Some(event) = LobbyEvent::from_message(msg) {
                                emit_event(&event_tx, event).await;
                            }
                        }
                        Err(e) => warn!("failed to decode server message: {e}; raw: {text}"),
                    },
                    Some(Err(e)) => {
                        error!("transport receive error: {e}");
                        emit_disconnected(
                            &event_tx,
                            &connected,
                            Some(format!("transport receive error: {e}")),
                        ).await;
                        break;
                    }
                    None => {
                        debug!("transport closed by server");
                        emit_disconnected(&event_tx, &connected, None).await;
                        break;
                    }
                }
            }
        }
    }

    debug!("transport loop exited");
}

/// Deliver an event, waiting for room in the channel.
async fn emit_event(event_tx: &mpsc::Sender<LobbyEvent>, event: LobbyEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

async fn emit_disconnected(
    event_tx: &mpsc::Sender<LobbyEvent>,
    connected: &AtomicBool,
    reason: Option<String>,
) {
    connected.store(false, Ordering::Release);
    emit_event(event_tx, LobbyEvent::Disconnected { reason }).await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    type Scripted = Option<std::result::Result<String, LobbyError>>;

    struct MockTransport {
        incoming: VecDeque<Scripted>,
        sent: Arc<StdMutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl MockTransport {
        fn new(incoming: Vec<Scripted>) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let transport = Self {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
            };
            (transport, sent, closed)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> std::result::Result<(), LobbyError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, LobbyError>> {
            match self.incoming.pop_front() {
                Some(item) => item,
                // Script exhausted: stay open until shutdown.
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> std::result::Result<(), LobbyError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    fn kicked_json() -> String {
        serde_json::to_string(&ServerMessage::Kicked).unwrap()
    }

    #[tokio::test]
    async fn connected_is_first_event() {
        let (transport, _sent, _closed) = MockTransport::new(vec![]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

        assert_eq!(events.recv().await, Some(LobbyEvent::Connected));
        channel.shutdown().await;
    }

    #[tokio::test]
    async fn inbound_frames_become_events_in_order() {
        let start = serde_json::to_string(&ServerMessage::Start(serde_json::json!(3000))).unwrap();
        let (transport, _sent, _closed) =
            MockTransport::new(vec![Some(Ok(kicked_json())), Some(Ok(start))]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

        assert_eq!(events.recv().await, Some(LobbyEvent::Connected));
        assert_eq!(events.recv().await, Some(LobbyEvent::Kicked));
        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Started {
                time: serde_json::json!(3000)
            })
        );

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn undecodable_frames_are_skipped() {
        let (transport, _sent, _closed) = MockTransport::new(vec![
            Some(Ok("not json".into())),
            Some(Ok(r#"{"event":"pass-room","data":{"room":{"name":"x"}}}"#.into())),
            Some(Ok(kicked_json())),
        ]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

        assert_eq!(events.recv().await, Some(LobbyEvent::Connected));
        assert_eq!(events.recv().await, Some(LobbyEvent::Kicked));

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn send_serializes_client_message() {
        let (transport, sent, _closed) = MockTransport::new(vec![]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
        let _ = events.recv().await; // Connected

        channel.emit(ClientMessage::ExportUsers).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let messages = sent.lock().unwrap();
            assert_eq!(messages.len(), 1);
            assert_eq!(messages[0], r#"{"event":"export-users"}"#);
        }

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn disconnected_on_transport_close() {
        let (transport, _sent, _closed) = MockTransport::new(vec![None]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

        let _ = events.recv().await; // Connected
        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Disconnected { reason: None })
        );
        assert!(!channel.is_connected());

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn transport_recv_error_emits_disconnected() {
        let (transport, _sent, _closed) = MockTransport::new(vec![Some(Err(
            LobbyError::TransportReceive("boom".into()),
        ))]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());

        let _ = events.recv().await; // Connected
        let Some(LobbyEvent::Disconnected { reason }) = events.recv().await else {
            panic!("expected Disconnected");
        };
        assert!(reason.unwrap().contains("boom"));

        channel.shutdown().await;
    }

    #[tokio::test]
    async fn not_connected_after_shutdown() {
        let (transport, _sent, closed) = MockTransport::new(vec![]);
        let (mut channel, mut events) = RealtimeChannel::start(transport, ChannelConfig::new());
        let _ = events.recv().await; // Connected

        channel.shutdown().await;

        assert!(matches!(
            channel.send(ClientMessage::ExportRoom),
            Err(LobbyError::NotConnected)
        ));
        assert_eq!(
            events.recv().await,
            Some(LobbyEvent::Disconnected {
                reason: Some("client shut down".into())
            })
        );
        assert!(closed.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn small_capacity_delivers_every_event() {
        let mut incoming: Vec<Scripted> = (0..20).map(|_| Some(Ok(kicked_json()))).collect();
        incoming.push(None);
        let (transport, _sent, _closed) = MockTransport::new(incoming);

        let config = ChannelConfig::new().with_event_channel_capacity(1);
        let (mut channel, mut events) = RealtimeChannel::start(transport, config);

        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut kicked = 0;
        while let Some(event) = events.recv().await {
            if event == LobbyEvent::Kicked {
                kicked += 1;
            }
        }
        assert_eq!(kicked, 20);

        channel.shutdown().await;
    }

    /// Transport whose `close()` never finishes.
    struct HangingCloseTransport {
        dropped: Arc<AtomicBool>,
    }

    impl Drop for HangingCloseTransport {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::Release);
        }
    }

    #[async_trait]
    impl Transport for HangingCloseTransport {
        async fn send(&mut self, _message: String) -> std::result::Result<(), LobbyError> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, LobbyError>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> std::result::Result<(), LobbyError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn shutdown_timeout_aborts_stuck_transport_task() {
        let dropped = Arc::new(AtomicBool::new(false));
        let transport = HangingCloseTransport {
            dropped: Arc::clone(&dropped),
        };
        let config = ChannelConfig::new().with_shutdown_timeout(Duration::from_millis(20));
        let (mut channel, mut events) = RealtimeChannel::start(transport, config);
        let _ = events.recv().await; // Connected

        channel.shutdown().await;

        assert!(dropped.load(Ordering::Acquire));
        assert!(!channel.is_connected());
    }
}
