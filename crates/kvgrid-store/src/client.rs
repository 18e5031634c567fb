//! Async WebSocket client for the store bridge.
//!
//! The [`StoreClient`] connects to the bridge over WebSocket, forwards push
//! batches through an mpsc event channel, and accepts fire-and-forget update
//! frames through a command channel. A background Tokio task owns the socket;
//! the task cleans up automatically when the client is dropped (the command
//! channel closes, which signals the task to exit).

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use kvgrid_core::prelude::*;

use crate::protocol::{encode_update, parse_push, RawPair};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Initial reconnection backoff duration.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum reconnection backoff duration (cap).
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Maximum number of consecutive reconnection attempts before giving up.
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Capacity of the command channel (bounded, to apply backpressure).
const CMD_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the event channel (push batches can be bursty).
const EVENT_CHANNEL_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Current connection state of a [`StoreClient`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// Not connected and not attempting to connect.
    Disconnected,
    /// Initial connection attempt in progress.
    Connecting,
    /// Connected and ready to exchange messages.
    Connected,
    /// Connection lost; background task is retrying.
    Reconnecting {
        /// The current reconnection attempt number (1-indexed).
        attempt: u32,
    },
}

/// Events forwarded from the background task to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Connection established (initial or after a reconnect).
    Connected,
    /// Connection lost; retry `attempt` of [`MAX_RECONNECT_ATTEMPTS`] pending.
    Reconnecting { attempt: u32 },
    /// Connection closed for good (clean shutdown or retries exhausted).
    Disconnected,
    /// One inbound push frame's `(key, value)` pairs, in frame order.
    Batch(Vec<RawPair>),
}

// ---------------------------------------------------------------------------
// Internal command type
// ---------------------------------------------------------------------------

/// Internal messages sent from the public API to the background task.
enum ClientCommand {
    /// Write an update frame to the socket. Fire-and-forget: no response is
    /// awaited and write failures are only logged.
    SendUpdate {
        key: String,
        value: serde_json::Value,
    },
    /// Gracefully close the WebSocket connection and stop the background task.
    Disconnect,
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;

// ---------------------------------------------------------------------------
// UpdateHandle
// ---------------------------------------------------------------------------

/// A clonable handle for sending outbound value updates.
///
/// Shares the underlying WebSocket connection with the [`StoreClient`] that
/// created it. The handle becomes inoperable when the client (or its
/// background task) is dropped - sends will return [`Error::ChannelClosed`].
#[derive(Clone)]
pub struct UpdateHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    state: Arc<std::sync::RwLock<ConnectionState>>,
}

impl std::fmt::Debug for UpdateHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner()).clone();
        f.debug_struct("UpdateHandle")
            .field("connection_state", &state)
            .finish()
    }
}

impl UpdateHandle {
    /// Queue an update frame for the background task to write.
    ///
    /// Returns as soon as the frame is queued; delivery is not confirmed and
    /// there is no ordering guarantee relative to subsequent inbound pushes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the background task has exited.
    pub async fn send_update(&self, key: String, value: serde_json::Value) -> Result<()> {
        self.cmd_tx
            .send(ClientCommand::SendUpdate { key, value })
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Return the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Return `true` if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        *self.state.read().unwrap_or_else(|e| e.into_inner()) == ConnectionState::Connected
    }

}

// ---------------------------------------------------------------------------
// StoreClient
// ---------------------------------------------------------------------------

/// Async WebSocket client for the store bridge.
///
/// Create with [`StoreClient::connect`], consume push batches via
/// [`event_receiver`](StoreClient::event_receiver), and send updates through
/// an [`UpdateHandle`] from [`update_handle`](StoreClient::update_handle).
pub struct StoreClient {
    /// Shared update handle - owns the cmd_tx and state.
    handle: UpdateHandle,
    /// Push-event receiver (not clonable; owned exclusively by this client).
    event_rx: mpsc::Receiver<StoreEvent>,
}

impl StoreClient {
    /// Connect to the store bridge at `ws_uri` and return a client.
    ///
    /// Spawns a background task that manages the WebSocket connection,
    /// including automatic reconnection with exponential backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connection cannot be established.
    pub async fn connect(ws_uri: &str) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ClientCommand>(CMD_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<StoreEvent>(EVENT_CHANNEL_CAPACITY);
        let state = Arc::new(std::sync::RwLock::new(ConnectionState::Connecting));

        // Attempt the first connection before returning so callers know
        // whether the URI is reachable.
        info!("Connecting to store bridge at {}", ws_uri);
        let ws_stream = connect_ws(ws_uri).await?;

        {
            let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
            *guard = ConnectionState::Connected;
        }
        let _ = event_tx.send(StoreEvent::Connected).await;

        let ws_uri_owned = ws_uri.to_string();
        let state_clone = Arc::clone(&state);

        tokio::spawn(run_client_task(
            ws_uri_owned,
            ws_stream,
            cmd_rx,
            event_tx,
            state_clone,
        ));

        Ok(Self {
            handle: UpdateHandle { cmd_tx, state },
            event_rx,
        })
    }

    /// Create a clonable update handle that shares this client's connection.
    pub fn update_handle(&self) -> UpdateHandle {
        self.handle.clone()
    }

    /// Return a mutable reference to the push-event receiver.
    ///
    /// Callers can `recv()` or `try_recv()` on this to consume connection
    /// state changes and push batches.
    pub fn event_receiver(&mut self) -> &mut mpsc::Receiver<StoreEvent> {
        &mut self.event_rx
    }

    /// Return the current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.handle.connection_state()
    }

    /// Return `true` if the client is currently connected.
    pub fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    /// Gracefully close the WebSocket connection.
    ///
    /// Sends a Disconnect command to the background task and returns
    /// immediately; the task sends a Close frame and terminates.
    pub async fn disconnect(&self) {
        // Ignore the send error - if the channel is already closed the task
        // has already exited.
        let _ = self.handle.cmd_tx.send(ClientCommand::Disconnect).await;
    }
}

// ---------------------------------------------------------------------------
// Background task
// ---------------------------------------------------------------------------

/// Entry point for the background WebSocket I/O task.
///
/// Accepts an already-open `ws_stream` for the first connection, then manages
/// reconnection on unexpected disconnects.
async fn run_client_task(
    ws_uri: String,
    ws_stream: WsStream,
    mut cmd_rx: mpsc::Receiver<ClientCommand>,
    event_tx: mpsc::Sender<StoreEvent>,
    state: Arc<std::sync::RwLock<ConnectionState>>,
) {
    // Run the read/write loop with the initial connection.
    let reconnect = run_io_loop(ws_stream, &mut cmd_rx, &event_tx).await;

    if !reconnect {
        // Either we received a Disconnect command or the cmd channel closed.
        set_state(&state, ConnectionState::Disconnected);
        let _ = event_tx.send(StoreEvent::Disconnected).await;
        return;
    }

    // Connection lost unexpectedly - attempt reconnection with backoff.
    let mut attempt: u32 = 1;
    loop {
        if attempt > MAX_RECONNECT_ATTEMPTS {
            error!(
                "Store bridge: exceeded {} reconnection attempts, giving up",
                MAX_RECONNECT_ATTEMPTS
            );
            set_state(&state, ConnectionState::Disconnected);
            let _ = event_tx.send(StoreEvent::Disconnected).await;
            break;
        }

        set_state(&state, ConnectionState::Reconnecting { attempt });
        let _ = event_tx.send(StoreEvent::Reconnecting { attempt }).await;

        let backoff = compute_backoff(attempt);
        warn!(
            "Store bridge: connection lost, retrying in {:?} (attempt {}/{})",
            backoff, attempt, MAX_RECONNECT_ATTEMPTS
        );
        tokio::time::sleep(backoff).await;

        // If the cmd channel closed while we were sleeping the client was
        // dropped and there is no point reconnecting.
        if cmd_rx.is_closed() {
            set_state(&state, ConnectionState::Disconnected);
            break;
        }

        match connect_ws(&ws_uri).await {
            Ok(ws_stream) => {
                info!("Store bridge: reconnected (attempt {})", attempt);
                set_state(&state, ConnectionState::Connected);
                let _ = event_tx.send(StoreEvent::Connected).await;

                attempt = 1; // reset on success

                let reconnect = run_io_loop(ws_stream, &mut cmd_rx, &event_tx).await;
                if !reconnect {
                    set_state(&state, ConnectionState::Disconnected);
                    let _ = event_tx.send(StoreEvent::Disconnected).await;
                    break;
                }
            }
            Err(err) => {
                warn!("Store bridge: reconnection attempt {} failed: {}", attempt, err);
                attempt += 1;
            }
        }
    }

    debug!("Store bridge background task exiting");
}

/// Run one connection's read/write select loop.
///
/// Returns `true` if the connection was lost unexpectedly (caller should
/// reconnect), or `false` if the task should terminate (Disconnect command or
/// channel closed).
async fn run_io_loop(
    ws_stream: WsStream,
    cmd_rx: &mut mpsc::Receiver<ClientCommand>,
    event_tx: &mpsc::Sender<StoreEvent>,
) -> bool {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            // ── Incoming WebSocket message ───────────────────────────────
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_push_frame(text.as_str(), event_tx).await;
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("Store bridge: received Close frame");
                        return true; // reconnect
                    }
                    Some(Ok(_)) => {
                        // Ping/Pong/Binary - ignore
                    }
                    Some(Err(err)) => {
                        warn!("Store bridge: WebSocket read error: {}", err);
                        return true; // reconnect
                    }
                    None => {
                        debug!("Store bridge: WebSocket stream ended");
                        return true; // reconnect
                    }
                }
            }

            // ── Outgoing command from the public API ─────────────────────
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ClientCommand::SendUpdate { key, value }) => {
                        let frame = encode_update(&key, &value);
                        debug!("Store bridge: sending update for {:?}", key);
                        if let Err(err) = ws_sink.send(WsMessage::text(frame)).await {
                            // Fire-and-forget: the echo push will reveal
                            // whether the write took effect.
                            warn!("Store bridge: update write failed for {:?}: {}", key, err);
                        }
                    }
                    Some(ClientCommand::Disconnect) => {
                        send_close(&mut ws_sink).await;
                        return false; // clean shutdown
                    }
                    None => {
                        // The StoreClient was dropped - close gracefully.
                        debug!("Store bridge: command channel closed, shutting down");
                        send_close(&mut ws_sink).await;
                        return false;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Establish a new WebSocket connection to `ws_uri`.
async fn connect_ws(ws_uri: &str) -> Result<WsStream> {
    validate_ws_uri(ws_uri)?;
    let (ws_stream, _response) = connect_async(ws_uri)
        .await
        .map_err(|err| Error::store(format!("Failed to connect to store bridge: {err}")))?;
    Ok(ws_stream)
}

/// Reject malformed or non-WebSocket URLs before dialing.
fn validate_ws_uri(ws_uri: &str) -> Result<()> {
    let parsed = url::Url::parse(ws_uri)
        .map_err(|err| Error::config(format!("invalid store URL {ws_uri:?}: {err}")))?;
    match parsed.scheme() {
        "ws" | "wss" => Ok(()),
        scheme => Err(Error::config(format!(
            "store URL must use ws:// or wss://, got {scheme}://"
        ))),
    }
}

/// Compute exponential backoff duration for reconnection attempt `n`.
///
/// The formula is `INITIAL_BACKOFF * 2^(n-1)`, capped at `MAX_BACKOFF`.
fn compute_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);
    let multiplier: u64 = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let secs = INITIAL_BACKOFF.as_secs().saturating_mul(multiplier);
    Duration::from_secs(secs.min(MAX_BACKOFF.as_secs()))
}

/// Parse an inbound text frame and forward the batch to the event channel.
async fn handle_push_frame(text: &str, event_tx: &mpsc::Sender<StoreEvent>) {
    match parse_push(text) {
        Ok(batch) => {
            if event_tx.send(StoreEvent::Batch(batch)).await.is_err() {
                debug!("Store bridge: event receiver dropped, batch discarded");
            }
        }
        Err(err) => {
            // A frame that is not a batch at all is dropped whole; malformed
            // values inside a well-formed batch are handled per pair by the
            // reconciler.
            warn!("Store bridge: ignoring unparseable push frame: {}", err);
        }
    }
}

/// Overwrite the shared connection state. A poisoned lock still holds a
/// valid `ConnectionState`, so recover the guard and write through it.
fn set_state(state: &Arc<std::sync::RwLock<ConnectionState>>, new_state: ConnectionState) {
    let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
    *guard = new_state;
}

/// Send a Close frame, ignoring errors (the connection may already be gone).
async fn send_close(ws_sink: &mut WsSink) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.flush().await;
}
