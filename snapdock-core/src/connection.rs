//! Live connection manager
//!
//! Maintains a best-effort persistent WebSocket to the companion server,
//! forwards token/status pushes to the owning client, and exposes a
//! fire-and-forget `send`. The manager retries forever with capped
//! exponential backoff; there is no retry limit and no terminal failure
//! state. Messages sent while the channel is down are dropped, not queued.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::protocol::{self, ClientMessage, ServerEvent};

/// Default backoff floor
pub const DEFAULT_RECONNECT_FLOOR_MS: u64 = 1000;
/// Default backoff ceiling
pub const DEFAULT_RECONNECT_CEILING_MS: u64 = 15_000;

/// Reconnect backoff bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub floor: Duration,
    pub ceiling: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            floor: Duration::from_millis(DEFAULT_RECONNECT_FLOOR_MS),
            ceiling: Duration::from_millis(DEFAULT_RECONNECT_CEILING_MS),
        }
    }
}

/// Mutable backoff scalar, owned exclusively by the connection task.
///
/// Doubles on every consecutive failure (capped at the ceiling) and resets
/// to the floor on a successful open.
#[derive(Debug)]
pub struct ReconnectDelay {
    current: Duration,
    policy: ReconnectPolicy,
}

impl ReconnectDelay {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            current: policy.floor,
            policy,
        }
    }

    /// Delay to wait before the next attempt; the one after doubles.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.policy.ceiling);
        delay
    }

    /// Back to the floor, called on every successful open.
    pub fn reset(&mut self) {
        self.current = self.policy.floor;
    }
}

/// Connection state, owned by the manager and mirrored to observers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Events surfaced to the owning client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Channel opened (`true`) or closed (`false`)
    Status(bool),
    /// Session token pushed by the server
    Token(String),
}

/// Handle to a spawned connection task.
///
/// Dropping the handle (or calling [`shutdown`](Self::shutdown)) closes the
/// active socket and cancels any pending reconnect, so a torn-down session
/// cannot leak a reconnect loop.
pub struct ConnectionHandle {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    state: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
}

impl ConnectionHandle {
    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observer for state changes (drives the status indicator)
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Serialize and write `message` iff the channel is connected.
    ///
    /// Anything sent while the channel is connecting or down is dropped
    /// with a warning. There is no queueing or replay.
    pub fn send(&self, message: ClientMessage) {
        if self.state() != ConnectionState::Connected {
            warn!("live channel is not connected, dropping outbound message");
            return;
        }
        if self.outbound.send(message).is_err() {
            warn!("connection task is gone, dropping outbound message");
        }
    }

    /// Close the socket and stop reconnecting.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

/// Spawns and owns the single connection task.
///
/// At most one socket exists per spawned manager: the task is the sole
/// owner of the socket handle and the backoff scalar, so a second attempt
/// can never start while one is open.
pub struct ConnectionManager;

impl ConnectionManager {
    /// Spawn the connection task against `url`.
    ///
    /// Returns the handle for `send`/`shutdown` and the receiver carrying
    /// status and token events in arrival order.
    pub fn spawn(
        url: String,
        policy: ReconnectPolicy,
    ) -> (ConnectionHandle, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(run(url, policy, event_tx, outbound_rx, state_tx, shutdown_rx));

        let handle = ConnectionHandle {
            outbound: outbound_tx,
            state: state_rx,
            shutdown: shutdown_tx,
        };
        (handle, event_rx)
    }
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    events: mpsc::UnboundedSender<ConnectionEvent>,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    state: watch::Sender<ConnectionState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delay = ReconnectDelay::new(policy);

    loop {
        if *shutdown.borrow() {
            break;
        }

        let _ = state.send(ConnectionState::Connecting);
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => {
                info!(%url, "live channel connected");
                delay.reset();
                let _ = state.send(ConnectionState::Connected);
                let _ = events.send(ConnectionEvent::Status(true));

                let stopping = drive(socket, &events, &mut outbound, &mut shutdown).await;

                let _ = state.send(ConnectionState::Disconnected);
                let _ = events.send(ConnectionEvent::Status(false));
                if stopping {
                    break;
                }
            }
            Err(err) => {
                // The subsequent backoff wait plays the role of the close
                // event: the attempt failed, the loop carries on.
                warn!(%err, "live channel connect failed");
                let _ = state.send(ConnectionState::Disconnected);
            }
        }

        let wait = delay.next_delay();
        debug!(?wait, "scheduling reconnect");
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!("connection task stopped");
}

/// Drive one open socket until it closes.
///
/// Returns `true` when the owning session is shutting down (no reconnect
/// must follow), `false` on any transport-initiated close.
async fn drive(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    events: &mpsc::UnboundedSender<ConnectionEvent>,
    outbound: &mut mpsc::UnboundedReceiver<ClientMessage>,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(ServerEvent::Token(token)) = protocol::parse_frame(text.as_str()) {
                        let _ = events.send(ConnectionEvent::Token(token));
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("live channel closed by peer");
                    return false;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(%err, "live channel transport error");
                    return false;
                }
            },
            message = outbound.recv() => match message {
                Some(message) => match serde_json::to_string(&message) {
                    Ok(text) => {
                        if let Err(err) = sink.send(Message::text(text)).await {
                            warn!(%err, "live channel write failed");
                            return false;
                        }
                    }
                    Err(err) => warn!(%err, "failed to serialize outbound message"),
                },
                None => return true,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = sink.send(Message::Close(None)).await;
                    return true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc::error::TryRecvError;

    fn policy_ms(floor: u64, ceiling: u64) -> ReconnectPolicy {
        ReconnectPolicy {
            floor: Duration::from_millis(floor),
            ceiling: Duration::from_millis(ceiling),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let mut delay = ReconnectDelay::new(ReconnectPolicy::default());

        let waits: Vec<u64> = (0..6).map(|_| delay.next_delay().as_millis() as u64).collect();
        assert_eq!(waits, vec![1000, 2000, 4000, 8000, 15000, 15000]);
    }

    #[test]
    fn test_delay_resets_to_floor() {
        let mut delay = ReconnectDelay::new(ReconnectPolicy::default());

        delay.next_delay();
        delay.next_delay();
        delay.next_delay();
        delay.reset();

        assert_eq!(delay.next_delay(), Duration::from_millis(1000));
        assert_eq!(delay.next_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_send_is_noop_when_not_connected() {
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, _shutdown_rx) = watch::channel(false);

        let handle = ConnectionHandle {
            outbound: outbound_tx,
            state: state_rx,
            shutdown: shutdown_tx,
        };

        handle.send(ClientMessage::copy_files(vec!["a".to_string(), "b".to_string()]));
        assert!(matches!(outbound_rx.try_recv(), Err(TryRecvError::Empty)));

        state_tx.send(ConnectionState::Connecting).unwrap();
        handle.send(ClientMessage::copy_files(vec!["a".to_string()]));
        assert!(matches!(outbound_rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_status_token_and_send_against_loopback_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

            ws.send(Message::text(r#"{"token":"abc123"}"#)).await.unwrap();
            ws.send(Message::text(r#"{"ping":true}"#)).await.unwrap();
            ws.send(Message::text("not json")).await.unwrap();

            // first text frame back must be the copy action
            let frame = loop {
                match ws.next().await {
                    Some(Ok(Message::Text(text))) => break text,
                    Some(Ok(_)) => continue,
                    other => panic!("expected action frame, got {other:?}"),
                }
            };
            let value: serde_json::Value = serde_json::from_str(frame.as_str()).unwrap();
            assert_eq!(value["type"], "action");
            assert_eq!(value["name"], "copy_files");
            assert_eq!(value["payload"]["hashes"], json!(["a", "b"]));

            // let the client observe the write, then drain until it closes
            ws.send(Message::text(r#"{"token":"ack"}"#)).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (handle, mut events) =
            ConnectionManager::spawn(format!("ws://{addr}/ws"), ReconnectPolicy::default());

        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(true)));
        // the ping and malformed frames in between fire nothing
        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Token("abc123".to_string()))
        );

        handle.send(ClientMessage::copy_files(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Token("ack".to_string()))
        );

        handle.shutdown();
        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(false)));
        assert_eq!(events.recv().await, None);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_unexpected_close() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            // first connection closes immediately
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.close(None).await.unwrap();

            // the manager comes back on its own and gets the token
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::text(r#"{"token":"second"}"#)).await.unwrap();
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (handle, mut events) =
            ConnectionManager::spawn(format!("ws://{addr}/ws"), policy_ms(10, 40));

        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(true)));
        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(false)));
        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(true)));
        assert_eq!(
            events.recv().await,
            Some(ConnectionEvent::Token("second".to_string()))
        );

        handle.shutdown();
        assert_eq!(events.recv().await, Some(ConnectionEvent::Status(false)));
        assert_eq!(events.recv().await, None);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_cancels_pending_reconnect() {
        // nothing listens here, so the task sits in its backoff wait
        let (handle, mut events) =
            ConnectionManager::spawn("ws://127.0.0.1:9/ws".to_string(), policy_ms(60_000, 60_000));

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown();

        // channel ends instead of waiting out the 60s delay
        let ended = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("connection task did not stop");
        assert_eq!(ended, None);
    }
}
