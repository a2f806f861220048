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

//! Integration tests for the keep-alive WebSocket client against a mock Axum server.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use tokio::sync::Mutex;
use vanilla_tapper::{config::VanillaBotConfig, websocket::client::VanillaWebSocketClient};

#[derive(Clone, Default)]
struct WsServerState {
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<String>>>,
    drop_immediately: bool,
}

async fn ws_handler(State(state): State<WsServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |mut socket: WebSocket| async move {
        state.connections.fetch_add(1, Ordering::SeqCst);
        if state.drop_immediately {
            return; // socket dropped right after the handshake
        }
        while let Some(Ok(message)) = socket.recv().await {
            if let Message::Text(text) = message {
                state.received.lock().await.push(text.to_string());
            }
        }
    })
}

async fn start_ws_server(state: WsServerState) -> SocketAddr {
    let router = Router::new().route("/ws", get(ws_handler)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    addr
}

fn ws_config(addr: SocketAddr) -> VanillaBotConfig {
    let mut config = VanillaBotConfig::default();
    config.base_url_ws = Some(format!("ws://{addr}/ws"));
    config.heartbeat_interval_secs = Some(1);
    config.ws_reconnect_delay_secs = Some(1);
    config
}

#[tokio::test]
async fn test_subscribe_then_heartbeats() {
    let state = WsServerState::default();
    let addr = start_ws_server(state.clone()).await;

    let client = VanillaWebSocketClient::new("ws-test", &ws_config(addr));
    client.connect(42).await;
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    client.close().await;

    let received = state.received.lock().await.clone();
    assert!(!received.is_empty(), "no frames received");

    // First frame is the subscription
    let subscribe: serde_json::Value = serde_json::from_str(&received[0]).unwrap();
    assert_eq!(subscribe["event"], "sub");
    assert_eq!(subscribe["topic"], "AssetsTopic");
    assert_eq!(subscribe["params"]["userId"], "42");
    assert_eq!(subscribe["params"]["binary"], true);

    // Heartbeats follow on the fixed interval
    let pings = received[1..]
        .iter()
        .filter(|text| text.contains("ping"))
        .count();
    assert!(pings >= 2, "expected at least 2 pings, got {pings}");
}

#[tokio::test]
async fn test_reconnects_after_server_drop() {
    let state = WsServerState {
        drop_immediately: true,
        ..Default::default()
    };
    let addr = start_ws_server(state.clone()).await;

    let client = VanillaWebSocketClient::new("ws-test", &ws_config(addr));
    client.connect(42).await;
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    client.close().await;

    // Every drop triggers a fresh handshake after the fixed delay
    assert!(
        state.connections.load(Ordering::SeqCst) >= 2,
        "expected at least 2 connections, got {}",
        state.connections.load(Ordering::SeqCst),
    );
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let state = WsServerState::default();
    let addr = start_ws_server(state.clone()).await;

    let client = VanillaWebSocketClient::new("ws-test", &ws_config(addr));
    client.connect(42).await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    client.close().await;
    // A second close must be a harmless no-op
    client.close().await;
}

#[tokio::test]
async fn test_reconnect_attempts_respect_configured_cap() {
    // Nothing is listening on this port; every attempt fails
    let mut config = VanillaBotConfig::default();
    config.base_url_ws = Some("ws://127.0.0.1:9/ws".to_string());
    config.ws_reconnect_delay_secs = Some(0);
    config.ws_reconnect_max_attempts = Some(2);

    let client = VanillaWebSocketClient::new("ws-test", &config);
    client.connect(42).await;

    // The supervisor must give up on its own once the cap is reached
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!client.is_running().await);
    client.close().await;
}
