// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Keep-alive WebSocket client.
//!
//! Maintains a persistent connection for the duration of the active workflow so the
//! server considers the session live. After each successful handshake the client sends
//! the asset-topic subscription and spawns two independent background tasks: a
//! heartbeat pinging on a fixed interval and a receive loop draining inbound frames.
//! Unexpected closure triggers a full reconnect (handshake + subscribe + both tasks)
//! after a fixed delay, in an explicit loop with an attempt counter.

use std::{sync::Arc, time::Duration};

use base64::Engine;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use rand::RngCore;
use tokio::{
    net::TcpStream,
    sync::Mutex,
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, handshake::client::Request},
};
use tokio_util::sync::CancellationToken;

use super::{
    error::VanillaWsError,
    messages::{PingFrame, SubscribeFrame},
};
use crate::{common::epoch_millis, config::VanillaBotConfig};

/// Handshake deadline for one connection attempt.
const OPEN_TIMEOUT_SECS: u64 = 30;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Generates a fresh random `Sec-WebSocket-Key` (16 random bytes, base64).
#[must_use]
pub fn generate_sec_websocket_key() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Handle to one connection supervisor and its shutdown token.
#[derive(Debug)]
struct ConnectionHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Keep-alive WebSocket client for the Vanilla asset stream.
#[derive(Debug)]
pub struct VanillaWebSocketClient {
    session: String,
    url: String,
    user_agent: String,
    heartbeat_interval: Duration,
    reconnect_delay: Duration,
    reconnect_max_attempts: Option<u32>,
    supervisor: Mutex<Option<ConnectionHandle>>,
}

impl VanillaWebSocketClient {
    /// Creates a new [`VanillaWebSocketClient`] for one session.
    #[must_use]
    pub fn new(session: impl Into<String>, config: &VanillaBotConfig) -> Self {
        Self {
            session: session.into(),
            url: config.ws_url(),
            user_agent: config.user_agent(),
            heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs.unwrap_or(6)),
            reconnect_delay: Duration::from_secs(config.ws_reconnect_delay_secs.unwrap_or(5)),
            reconnect_max_attempts: config.ws_reconnect_max_attempts,
            supervisor: Mutex::new(None),
        }
    }

    /// Opens the connection and keeps it alive until [`Self::close`] is called.
    ///
    /// Returns immediately; connection management runs in a background task. Calling
    /// this twice is a no-op.
    pub async fn connect(&self, user_id: i64) {
        let mut guard = self.supervisor.lock().await;
        if guard.is_some() {
            tracing::info!(session = %self.session, "WebSocket already connected");
            return;
        }
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::run_connection_loop(
            self.session.clone(),
            self.url.clone(),
            self.user_agent.clone(),
            SubscribeFrame::assets(user_id),
            self.heartbeat_interval,
            self.reconnect_delay,
            self.reconnect_max_attempts,
            cancel.clone(),
        ));
        *guard = Some(ConnectionHandle { cancel, task });
    }

    /// Returns `true` while the connection supervisor is still running.
    pub async fn is_running(&self) -> bool {
        self.supervisor
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    /// Shuts the connection down, cancelling both background activities.
    ///
    /// Best-effort: errors during close are logged, never raised.
    pub async fn close(&self) {
        if let Some(handle) = self.supervisor.lock().await.take() {
            handle.cancel.cancel();
            if let Err(error) = handle.task.await {
                if !error.is_cancelled() {
                    tracing::warn!(
                        session = %self.session,
                        %error,
                        "Keep-alive supervisor ended abnormally",
                    );
                }
            }
        }
    }

    /// Connect/reconnect loop: one iteration per connection lifetime.
    #[allow(clippy::too_many_arguments)]
    async fn run_connection_loop(
        session: String,
        url: String,
        user_agent: String,
        subscribe: SubscribeFrame,
        heartbeat_interval: Duration,
        reconnect_delay: Duration,
        reconnect_max_attempts: Option<u32>,
        cancel: CancellationToken,
    ) {
        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                break;
            }
            match Self::connect_and_subscribe(&url, &user_agent, &subscribe).await {
                Ok(stream) => {
                    attempt = 0;
                    tracing::info!(session = %session, "Connected to WebSocket server");
                    let (sink, stream_rx) = stream.split();
                    let sink = Arc::new(Mutex::new(sink));

                    // Both activities start only after a successful handshake + subscribe
                    let mut heartbeat = tokio::spawn(Self::heartbeat_loop(
                        session.clone(),
                        Arc::clone(&sink),
                        heartbeat_interval,
                        cancel.child_token(),
                    ));
                    let mut receive = tokio::spawn(Self::receive_loop(
                        session.clone(),
                        stream_rx,
                        cancel.child_token(),
                    ));

                    tokio::select! {
                        _ = cancel.cancelled() => {
                            heartbeat.abort();
                            receive.abort();
                            if let Err(error) = sink.lock().await.close().await {
                                tracing::warn!(
                                    session = %session,
                                    %error,
                                    "Error while closing WebSocket",
                                );
                            }
                        }
                        _ = &mut heartbeat => receive.abort(),
                        _ = &mut receive => heartbeat.abort(),
                    }
                }
                Err(error) => {
                    tracing::error!(session = %session, %error, "Error connecting to WebSocket");
                }
            }

            if cancel.is_cancelled() {
                break;
            }
            attempt += 1;
            if let Some(cap) = reconnect_max_attempts {
                if attempt >= cap {
                    tracing::error!(
                        session = %session,
                        attempts = attempt,
                        "WebSocket reconnect attempts exhausted",
                    );
                    break;
                }
            }
            tracing::info!(
                session = %session,
                attempt,
                "Attempting WebSocket reconnect in {}s",
                reconnect_delay.as_secs(),
            );
            tokio::time::sleep(reconnect_delay).await;
        }
    }

    /// Performs the upgrade handshake and sends the subscription frame.
    async fn connect_and_subscribe(
        url: &str,
        user_agent: &str,
        subscribe: &SubscribeFrame,
    ) -> Result<WsStream, VanillaWsError> {
        let request = build_upgrade_request(url, user_agent)?;
        let (mut stream, _response) =
            timeout(Duration::from_secs(OPEN_TIMEOUT_SECS), connect_async(request))
                .await
                .map_err(|_| VanillaWsError::ConnectTimeout(OPEN_TIMEOUT_SECS))??;
        let frame = serde_json::to_string(subscribe)?;
        stream.send(Message::Text(frame.into())).await?;
        Ok(stream)
    }

    /// Sends `{"ping": <epoch_ms>}` on every interval tick while the connection is open.
    async fn heartbeat_loop(
        session: String,
        sink: Arc<Mutex<WsSink>>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let frame = PingFrame { ping: epoch_millis() };
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(error) => {
                            tracing::error!(session = %session, %error, "Failed to encode ping");
                            break;
                        }
                    };
                    if let Err(error) = sink.lock().await.send(Message::Text(text.into())).await {
                        tracing::error!(
                            session = %session,
                            %error,
                            "WebSocket connection closed while sending ping",
                        );
                        break;
                    }
                }
            }
        }
    }

    /// Drains inbound frames; payloads are discarded after being read so server-side
    /// closure surfaces here promptly.
    async fn receive_loop(
        session: String,
        mut stream: SplitStream<WsStream>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = stream.next() => match message {
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => {
                        tracing::error!(session = %session, %error, "Error while receiving messages");
                        break;
                    }
                    None => {
                        tracing::debug!(session = %session, "WebSocket stream ended");
                        break;
                    }
                },
            }
        }
    }
}

/// Builds the upgrade request with browser-shaped headers and a fresh random key.
fn build_upgrade_request(url: &str, user_agent: &str) -> Result<Request, VanillaWsError> {
    let uri: http::Uri = url
        .parse()
        .map_err(|error: http::uri::InvalidUri| VanillaWsError::InvalidUrl(error.to_string()))?;
    let host = uri
        .host()
        .ok_or_else(|| VanillaWsError::InvalidUrl(format!("missing host: {url}")))?
        .to_string();
    let origin = format!("https://{host}");

    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("Host", &host)
        .header("Connection", "Upgrade")
        .header("Upgrade", "websocket")
        .header("Sec-WebSocket-Version", "13")
        .header("Sec-WebSocket-Key", generate_sec_websocket_key())
        .header("Sec-WebSocket-Extensions", "permessage-deflate; client_max_window_bits")
        .header("Origin", origin)
        .header("User-Agent", user_agent)
        .header("Pragma", "no-cache")
        .header("Cache-Control", "no-cache")
        .header("Accept-Encoding", "gzip, deflate, br, zstd")
        .header("Accept-Language", "en,en-US;q=0.9")
        .body(())?;
    Ok(request)
}
