//! Event client with fixed-interval automatic reconnection

use super::registry::{dispatch, EventHandler, HandlerRegistry};
use super::types::{
    ConnectionState, Envelope, OutboundEnvelope, WsConfig, WsError, SUBSCRIBE_TYPE,
};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<Socket, Message>;
type WsStream = SplitStream<Socket>;

/// How long `disconnect` waits for the close handshake
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for the admin event stream
///
/// Holds at most one live socket. Inbound `{"type", "data"}` envelopes are
/// routed to the handlers registered for their type, each on its own task.
/// When the connection drops the client reconnects after a fixed interval,
/// up to the configured number of attempts. Cloning yields another handle
/// to the same connection.
#[derive(Clone)]
pub struct EventClient {
    inner: Arc<Inner>,
}

struct Inner {
    config: WsConfig,
    shared: Mutex<Shared>,
    state_tx: watch::Sender<ConnectionState>,
}

/// Everything mutable, behind the one lock
struct Shared {
    state: ConnectionState,
    sink: Option<WsSink>,
    handlers: HandlerRegistry,
    /// Cancelled by `disconnect` or a fresh `connect`; stops the read task
    /// and any pending reconnect belonging to the old cycle.
    cycle: Option<CancellationToken>,
    /// Bumped for every established socket
    generation: u64,
    /// Reconnect attempts since the last application `connect`
    reconnect_attempts: u32,
}

impl EventClient {
    /// Create a new client; nothing is dialled until [`connect`](Self::connect)
    pub fn new(config: WsConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                config,
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    sink: None,
                    handlers: HandlerRegistry::new(),
                    cycle: None,
                    generation: 0,
                    reconnect_attempts: 0,
                }),
                state_tx,
            }),
        }
    }

    /// Get the configured base URL
    pub fn url(&self) -> &str {
        &self.inner.config.url
    }

    pub fn config(&self) -> &WsConfig {
        &self.inner.config
    }

    /// Open the connection and start the background read loop
    ///
    /// Returns immediately with `Ok` when already connected. While another
    /// handshake is in flight this waits for its outcome instead of dialling
    /// a second socket. A reconnect pending from an earlier cycle is
    /// cancelled and the attempt counter starts over.
    pub async fn connect(&self) -> Result<(), WsError> {
        let mut state_rx = self.inner.state_tx.subscribe();

        let cycle = loop {
            let mut shared = self.inner.shared.lock().await;
            match shared.state {
                ConnectionState::Connected => {
                    tracing::debug!("Admin event stream already connected");
                    return Ok(());
                }
                ConnectionState::Connecting => {
                    drop(shared);
                    if state_rx
                        .wait_for(|state| *state != ConnectionState::Connecting)
                        .await
                        .is_err()
                    {
                        return Err(WsError::NotConnected);
                    }
                }
                ConnectionState::Disconnected => {
                    if let Some(stale) = shared.cycle.take() {
                        stale.cancel();
                    }
                    shared.reconnect_attempts = 0;
                    let cycle = CancellationToken::new();
                    shared.cycle = Some(cycle.clone());
                    self.inner
                        .transition(&mut shared, ConnectionState::Connecting);
                    break cycle;
                }
            }
        };

        match self.inner.dial(&cycle).await? {
            Some((stream, generation)) => {
                tokio::spawn(run_session(
                    Arc::clone(&self.inner),
                    cycle,
                    stream,
                    generation,
                ));
                Ok(())
            }
            None => Err(WsError::ConnectFailure(
                "cancelled by disconnect".to_string(),
            )),
        }
    }

    /// Close the connection; a pending reconnect or in-flight handshake is
    /// abandoned
    pub async fn disconnect(&self) {
        let sink = {
            let mut shared = self.inner.shared.lock().await;
            if let Some(cycle) = shared.cycle.take() {
                cycle.cancel();
            }
            self.inner
                .transition(&mut shared, ConnectionState::Disconnected);
            shared.sink.take()
        };

        if let Some(mut sink) = sink {
            match timeout(CLOSE_TIMEOUT, sink.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "Error closing admin event stream"),
                Err(_) => tracing::debug!("Timed out closing admin event stream"),
            }
            tracing::info!(url = %self.inner.config.url, "Admin event stream disconnected");
        }
    }

    /// Serialize `payload` as JSON and write it as one text frame
    pub async fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<(), WsError> {
        let mut shared = self.inner.shared.lock().await;

        if shared.state != ConnectionState::Connected {
            return Err(WsError::NotConnected);
        }
        let sink = shared.sink.as_mut().ok_or(WsError::NotConnected)?;

        let text = serde_json::to_string(payload)
            .map_err(|e| WsError::SerializationFailure(e.to_string()))?;

        sink.send(Message::Text(text))
            .await
            .map_err(|e| WsError::SendFailure(e.to_string()))
    }

    /// Send `{"type": "subscribe", "data": subscription}`
    pub async fn subscribe<T: Serialize + ?Sized>(&self, subscription: &T) -> Result<(), WsError> {
        self.send(&OutboundEnvelope::new(SUBSCRIBE_TYPE, subscription))
            .await
    }

    /// Register a closure for `event_type`
    pub async fn on<F>(&self, event_type: impl Into<String>, handler: F)
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.add_handler(event_type, handler).await;
    }

    /// Register a handler for `event_type`; kept across reconnects
    pub async fn add_handler<H>(&self, event_type: impl Into<String>, handler: H)
    where
        H: EventHandler + 'static,
    {
        let mut shared = self.inner.shared.lock().await;
        shared.handlers.register(event_type, Arc::new(handler));
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.shared.lock().await.state
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// Reconnect attempts made since the last call to `connect`
    pub async fn reconnect_attempts(&self) -> u32 {
        self.inner.shared.lock().await.reconnect_attempts
    }

    /// Watch state transitions, including `Connecting`
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient")
            .field("url", &self.inner.config.url)
            .field("reconnect", &self.inner.config.reconnect)
            .field("state", &*self.inner.state_tx.borrow())
            .finish()
    }
}

impl Inner {
    fn transition(&self, shared: &mut Shared, next: ConnectionState) {
        if shared.state == next {
            return;
        }
        tracing::debug!(from = %shared.state, to = %next, "Admin event stream state change");
        shared.state = next;
        self.state_tx.send_replace(next);
        let connected = if next == ConnectionState::Connected { 1.0 } else { 0.0 };
        telemetry::set_gauge(GaugeMetric::Connected, connected);
    }

    /// Handshake bounded by `connect_timeout`, without touching shared state
    async fn handshake(&self) -> Result<Socket, WsError> {
        let endpoint = self.config.endpoint()?;
        match timeout(self.config.connect_timeout, connect_async(endpoint.as_str())).await {
            Ok(Ok((socket, _response))) => Ok(socket),
            Ok(Err(e)) => Err(WsError::ConnectFailure(e.to_string())),
            Err(_) => Err(WsError::ConnectFailure(format!(
                "handshake timed out after {:?}",
                self.config.connect_timeout
            ))),
        }
    }

    /// Dial and install the write half. The caller has already moved the
    /// state to `Connecting` and released the lock; the handshake runs
    /// unlocked so queries and `send` keep answering. Returns `Ok(None)`
    /// when `cycle` is cancelled before the socket is installed.
    async fn dial(&self, cycle: &CancellationToken) -> Result<Option<(WsStream, u64)>, WsError> {
        tracing::info!(url = %self.config.url, "Connecting to admin event stream");

        let result = tokio::select! {
            result = self.handshake() => result,
            _ = cycle.cancelled() => {
                tracing::debug!("Handshake abandoned by disconnect");
                return Ok(None);
            }
        };

        let mut shared = self.shared.lock().await;
        if cycle.is_cancelled() {
            // disconnect already settled the state; a late socket is dropped
            return Ok(None);
        }

        match result {
            Ok(socket) => {
                if shared.state == ConnectionState::Connected {
                    return Ok(None);
                }
                let (sink, stream) = socket.split();
                shared.sink = Some(sink);
                shared.generation += 1;
                self.transition(&mut shared, ConnectionState::Connected);
                telemetry::increment(CounterMetric::Connects, 1);
                tracing::info!(url = %self.config.url, "Admin event stream connected");
                Ok(Some((stream, shared.generation)))
            }
            Err(e) => {
                self.transition(&mut shared, ConnectionState::Disconnected);
                telemetry::increment(CounterMetric::ConnectFailures, 1);
                tracing::warn!(url = %self.config.url, error = %e, "Admin event stream connect failed");
                Err(e)
            }
        }
    }

    /// Read until the socket fails; returns why
    async fn read_frames(&self, stream: &mut WsStream) -> String {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => self.handle_frame(text.as_bytes()).await,
                Ok(Message::Binary(data)) => self.handle_frame(&data).await,
                Ok(Message::Close(frame)) => {
                    return match frame {
                        Some(frame) => format!("closed by server: {} {}", frame.code, frame.reason),
                        None => "closed by server".to_string(),
                    };
                }
                // tungstenite answers pings on its own
                Ok(_) => {}
                Err(e) => return e.to_string(),
            }
        }
        "stream ended".to_string()
    }

    async fn handle_frame(&self, payload: &[u8]) {
        let Some(envelope) = Envelope::decode(payload) else {
            telemetry::increment(CounterMetric::FramesDropped, 1);
            tracing::debug!(
                len = payload.len(),
                preview = %String::from_utf8_lossy(&payload[..payload.len().min(100)]),
                "Dropping malformed admin event frame"
            );
            return;
        };

        let handlers = self
            .shared
            .lock()
            .await
            .handlers
            .handlers_for(&envelope.event_type);

        tracing::debug!(
            event_type = %envelope.event_type,
            handlers = handlers.len(),
            "Dispatching admin event"
        );
        telemetry::increment(CounterMetric::HandlerInvocations, handlers.len() as u64);
        dispatch(handlers, envelope.data);
    }

    /// Record the loss of connection `generation`. Returns false when the
    /// cycle was cancelled or a newer socket has already replaced it.
    async fn mark_lost(&self, generation: u64, cycle: &CancellationToken) -> bool {
        let mut shared = self.shared.lock().await;
        if cycle.is_cancelled() || shared.generation != generation {
            return false;
        }
        shared.sink = None;
        self.transition(&mut shared, ConnectionState::Disconnected);
        true
    }

    /// Retry the handshake at a fixed interval until it succeeds, the
    /// attempts run out, or the cycle is cancelled.
    async fn reconnect(&self, cycle: &CancellationToken) -> Option<(WsStream, u64)> {
        let policy = &self.config.reconnect;
        if !policy.enabled {
            tracing::info!("Auto-reconnect disabled, staying disconnected");
            return None;
        }

        loop {
            let attempt = {
                let mut shared = self.shared.lock().await;
                if cycle.is_cancelled() {
                    return None;
                }
                if policy.is_exhausted(shared.reconnect_attempts) {
                    tracing::error!(
                        attempts = shared.reconnect_attempts,
                        "Max reconnection attempts reached"
                    );
                    telemetry::increment(CounterMetric::ReconnectsExhausted, 1);
                    return None;
                }
                shared.reconnect_attempts += 1;
                shared.reconnect_attempts
            };

            tracing::info!(
                attempt,
                delay_ms = policy.interval.as_millis() as u64,
                "Reconnecting to admin event stream"
            );

            tokio::select! {
                _ = sleep(policy.interval) => {}
                _ = cycle.cancelled() => {
                    tracing::debug!(attempt, "Pending reconnect cancelled");
                    return None;
                }
            }

            {
                let mut shared = self.shared.lock().await;
                if cycle.is_cancelled() || shared.state != ConnectionState::Disconnected {
                    return None;
                }
                self.transition(&mut shared, ConnectionState::Connecting);
            }
            telemetry::increment(CounterMetric::ReconnectAttempts, 1);

            match self.dial(cycle).await {
                Ok(Some(next)) => return Some(next),
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Reconnection attempt failed");
                }
            }
        }
    }
}

/// Background task for one connection cycle: the read loop, then
/// reconnection, then the read loop again on the new socket.
async fn run_session(
    inner: Arc<Inner>,
    cycle: CancellationToken,
    mut stream: WsStream,
    mut generation: u64,
) {
    loop {
        let reason = tokio::select! {
            _ = cycle.cancelled() => {
                tracing::debug!(generation, "Read loop stopped by disconnect");
                return;
            }
            reason = inner.read_frames(&mut stream) => reason,
        };

        telemetry::increment(CounterMetric::ConnectionLost, 1);
        tracing::warn!(generation, reason = %reason, "Admin event stream lost");

        if !inner.mark_lost(generation, &cycle).await {
            return;
        }

        match inner.reconnect(&cycle).await {
            Some((next, next_generation)) => {
                stream = next;
                generation = next_generation;
            }
            None => return,
        }
    }
}
