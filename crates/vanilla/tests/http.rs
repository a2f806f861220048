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

//! Integration tests for the Vanilla HTTP client using a mock Axum server.

use std::{
    io::Write,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::Mutex;
use vanilla_tapper::{
    common::credential::Credential,
    config::VanillaBotConfig,
    http::client::VanillaHttpClient,
};

async fn start_test_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    addr
}

fn test_config(addr: SocketAddr) -> VanillaBotConfig {
    let mut config = VanillaBotConfig::default();
    config.base_url_http = Some(format!("http://{addr}"));
    config.use_start_delay = false;
    config.humanize_pacing = false;
    config.max_retries = Some(3);
    config.retry_delay_initial_secs = Some(0);
    config
}

fn test_client(addr: SocketAddr) -> VanillaHttpClient {
    VanillaHttpClient::new(
        "tester",
        &test_config(addr),
        Credential::new("test_app".to_string(), "test_secret".to_string()),
        Arc::new(Mutex::new(())),
    )
    .expect("Failed to build client")
}

fn user_info_envelope() -> serde_json::Value {
    json!({
        "code": 0,
        "data": {"level": 7, "tapLevel": 2, "volume": 500, "durationDays": 3},
        "message": "",
    })
}

#[tokio::test]
async fn test_retry_then_success_returns_decoded_body() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = Arc::clone(&hits);
    let router = Router::new().route(
        "/bapi/v1/user/info",
        get(move || {
            let hits = Arc::clone(&hits_handler);
            async move {
                if hits.fetch_add(1, Ordering::SeqCst) < 2 {
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                } else {
                    Json(user_info_envelope()).into_response()
                }
            }
        }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    let info = client.user_info(42).await.expect("expected decoded body");
    assert_eq!(info.level, 7);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_degrades_to_none() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = Arc::clone(&hits);
    let router = Router::new().route(
        "/bapi/v1/user/info",
        get(move || {
            let hits = Arc::clone(&hits_handler);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    assert!(client.user_info(42).await.is_none());
    // One request per attempt, up to max_retries
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_non_retryable_failure_aborts_immediately() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_handler = Arc::clone(&hits);
    let router = Router::new().route(
        "/bapi/v1/user/info",
        get(move || {
            let hits = Arc::clone(&hits_handler);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                // 200 with a non-JSON body: decode failure must not be retried
                "not json".into_response()
            }
        }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    assert!(client.user_info(42).await.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_signed_request_headers_and_timestamp() {
    let captured: Arc<DashMap<String, String>> = Arc::new(DashMap::new());
    let captured_handler = Arc::clone(&captured);
    let router = Router::new().route(
        "/bapi/v1/user/info",
        get(move |uri: Uri, headers: HeaderMap| {
            let captured = Arc::clone(&captured_handler);
            async move {
                captured.insert(
                    "query".to_string(),
                    uri.query().unwrap_or_default().to_string(),
                );
                for name in ["x-vanilla-appid", "x-vanilla-appsign", "authorization"] {
                    if let Some(value) = headers.get(name) {
                        captured.insert(
                            name.to_string(),
                            value.to_str().unwrap_or_default().to_string(),
                        );
                    }
                }
                Json(user_info_envelope())
            }
        }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);
    client.set_auth_token("test-token").await;

    client.user_info(42).await.expect("request should succeed");

    let query = captured.get("query").unwrap().clone();
    assert!(query.contains("userId=42"));
    assert!(query.contains("timestamp="));

    assert_eq!(captured.get("x-vanilla-appid").unwrap().as_str(), "test_app");
    assert_eq!(
        captured.get("authorization").unwrap().as_str(),
        "tma test-token"
    );
    let signature = captured.get("x-vanilla-appsign").unwrap().clone();
    assert_eq!(signature.len(), 64);
    assert!(signature.bytes().all(|b| b.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_signature_matches_query_and_body() {
    let captured: Arc<DashMap<String, String>> = Arc::new(DashMap::new());
    let captured_handler = Arc::clone(&captured);
    let router = Router::new().route(
        "/bapi/v1/user/info",
        get(move |uri: Uri, headers: HeaderMap| {
            let captured = Arc::clone(&captured_handler);
            async move {
                captured.insert(
                    "query".to_string(),
                    uri.query().unwrap_or_default().to_string(),
                );
                captured.insert(
                    "signature".to_string(),
                    headers
                        .get("x-vanilla-appsign")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string(),
                );
                Json(user_info_envelope())
            }
        }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    client.user_info(42).await.expect("request should succeed");

    // The server can recompute the signature from the query string it saw
    let credential = Credential::new("test_app".to_string(), "test_secret".to_string());
    let query = captured.get("query").unwrap().clone();
    let expected = credential.sign(&query, None);
    assert_eq!(captured.get("signature").unwrap().as_str(), expected);
}

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn deflate(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn brotli_compress(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
        writer.write_all(bytes).unwrap();
    }
    out
}

#[tokio::test]
async fn test_decompression_round_trip_per_encoding() {
    for encoding in ["gzip", "deflate", "br", "identity"] {
        let body = serde_json::to_vec(&user_info_envelope()).unwrap();
        let compressed = match encoding {
            "gzip" => gzip(&body),
            "deflate" => deflate(&body),
            "br" => brotli_compress(&body),
            _ => body.clone(),
        };
        let router = Router::new().route(
            "/bapi/v1/user/info",
            get(move || {
                let compressed = compressed.clone();
                let encoding = encoding.to_string();
                async move {
                    Response::builder()
                        .status(StatusCode::OK)
                        .header("content-type", "application/json")
                        .header("content-encoding", encoding)
                        .body(Body::from(compressed))
                        .unwrap()
                }
            }),
        );
        let addr = start_test_server(router).await;
        let client = test_client(addr);

        let info = client
            .user_info(42)
            .await
            .unwrap_or_else(|| panic!("decoding failed for encoding {encoding}"));
        assert_eq!(info.level, 7, "wrong level for encoding {encoding}");
    }
}

#[tokio::test]
async fn test_action_envelope_code_discriminates_success() {
    let router = Router::new()
        .route(
            "/bapi/v1/activity/place",
            axum::routing::post(|| async { Json(json!({"code": 0, "data": {}, "message": ""})) }),
        )
        .route(
            "/bapi/v1/activity/timeslot/sign-claim",
            axum::routing::post(
                || async { Json(json!({"code": 1001, "data": {}, "message": "not eligible"})) },
            ),
        );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    assert!(client.complete_task(42, 9).await);
    assert!(!client.claim_sign_in(42).await);
}

#[tokio::test]
async fn test_missing_envelope_fields_yield_defaults() {
    let router = Router::new().route(
        "/bapi/v1/user/asset",
        get(|| async { Json(json!({"code": 0})) }),
    );
    let addr = start_test_server(router).await;
    let client = test_client(addr);

    // Absent `data` decodes to the empty default rather than failing the workflow
    assert!(client.user_assets(42).await.is_empty());
}
