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

//! Vanilla HTTP client implementation.
//!
//! The client signs every request with the application credential, serializes all
//! signed calls within one session through a shared permit, retries transient failures
//! with doubling backoff, and decompresses response bodies itself based on the
//! `content-encoding` header. Exhausted retries degrade to `None` so a failed call
//! means "action not completed this cycle", never a crashed workflow.

use std::{io::Read, sync::Arc, time::Duration};

use reqwest::{
    Method, StatusCode,
    header::{
        ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE, HeaderMap,
        HeaderValue, USER_AGENT,
    },
};
use tokio::sync::{Mutex, RwLock};

use super::{
    error::{VanillaHttpError, should_retry_http_error},
    models::{
        AssetBalance, ChainSignInfo, ChargeState, DailyClaimData, DailySignReward, LevelConfig,
        LoginData, SignInfo, Task, UserInfo, VanillaResponse,
    },
    query::{
        ActivityListQuery, CompleteTaskPayload, ExpendPayload, LoginRequest, UserIdPayload,
        UserIdTextPayload, UserQuery,
    },
    retry::{Backoff, RetryConfig},
};
use crate::{
    common::{
        chrome_major_version,
        consts::{
            ACTIVITY_LIST_PATH, AUTH_SCHEME, CHAIN_SIGN_INFO_PATH, CHARGE_ASSET_PATH,
            CHARGE_REMAINING_PATH, COMPLETE_TASK_PATH, DAILY_SIGN_CLAIM_PATH,
            DAILY_SIGN_CONFIG_PATH, EXPEND_ASSET_PATH, HEADER_APP_ID, HEADER_APP_SIGN,
            LEVEL_OPTIONS_PATH, LEVEL_UPGRADE_PATH, LOGIN_PATH, MANUAL_UPGRADE_PATH,
            SIGN_CLAIM_PATH, SIGN_INFO_PATH, USER_ASSET_PATH, USER_INFO_PATH,
        },
        credential::Credential,
        epoch_millis, sec_ch_ua,
    },
    config::VanillaBotConfig,
};

/// Baseline human-pacing delay applied before most signed requests.
const DEFAULT_PACING_SECS: f64 = 1.0;
/// Pacing before reward-claim requests.
const CLAIM_PACING_SECS: f64 = 5.0;
/// Pacing before the currency-funded level upgrade request.
const LEVEL_UPGRADE_PACING_SECS: f64 = 6.0;

/// HTTP client for the Vanilla game API.
///
/// One instance per session. The request permit serializes all signed requests within
/// the session: the permit is held across signing, the pacing sleep, and the request
/// itself so the embedded timestamp stays fresh relative to the signature.
#[derive(Debug)]
pub struct VanillaHttpClient {
    session: String,
    base_url: String,
    client: reqwest::Client,
    credential: Credential,
    permit: Arc<Mutex<()>>,
    retry: RetryConfig,
    humanize_pacing: bool,
    auth_token: RwLock<Option<String>>,
}

impl VanillaHttpClient {
    /// Creates a new [`VanillaHttpClient`].
    ///
    /// The `permit` is the session-scoped mutual-exclusion primitive; callers that
    /// share a session across components must pass the same instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        session: impl Into<String>,
        config: &VanillaBotConfig,
        credential: Credential,
        permit: Arc<Mutex<()>>,
    ) -> anyhow::Result<Self> {
        let user_agent = config.user_agent();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
        if let Some(major) = chrome_major_version(&user_agent) {
            headers.insert("sec-ch-ua", HeaderValue::from_str(&sec_ch_ua(major))?);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.http_timeout_secs.unwrap_or(60)))
            .danger_accept_invalid_certs(!config.verify_tls);
        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let retry = RetryConfig {
            max_retries: config.max_retries.unwrap_or(10),
            initial_delay_secs: config.retry_delay_initial_secs.unwrap_or(10),
        };

        Ok(Self {
            session: session.into(),
            base_url: config.http_base_url(),
            client: builder.build()?,
            credential,
            permit,
            retry,
            humanize_pacing: config.humanize_pacing,
            auth_token: RwLock::new(None),
        })
    }

    /// Returns the session label this client logs under.
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }

    /// Attaches the bearer token carried on authenticated requests.
    pub async fn set_auth_token(&self, token: impl Into<String>) {
        *self.auth_token.write().await = Some(token.into());
    }

    /// Sends a signed request, retrying transient failures with doubling backoff.
    ///
    /// Returns `None` once retries are exhausted or on any non-retryable failure.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        payload: Option<&serde_json::Value>,
        sleep_secs: f64,
    ) -> Option<VanillaResponse> {
        let body = match payload {
            Some(value) => match serde_json::to_vec(value) {
                Ok(bytes) => Some(bytes),
                Err(error) => {
                    tracing::warn!(session = %self.session, %path, %error, "Failed to encode payload");
                    return None;
                }
            },
            None => None,
        };

        let mut backoff = Backoff::new(&self.retry);
        let mut attempts = 0;
        while attempts < self.retry.max_retries {
            match self
                .attempt(method.clone(), path, query, body.as_deref(), sleep_secs)
                .await
            {
                Ok(envelope) => return Some(envelope),
                Err(error) if should_retry_http_error(&error) => {
                    attempts += 1;
                    let delay = backoff.next_delay(&error);
                    tracing::warn!(
                        session = %self.session,
                        %path,
                        %error,
                        attempt = attempts,
                        max_retries = self.retry.max_retries,
                        "Request failed, retrying in {}s",
                        delay.as_secs(),
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    tracing::warn!(session = %self.session, %path, %error, "Request aborted");
                    return None;
                }
            }
        }

        tracing::warn!(session = %self.session, %path, "Retries exhausted");
        None
    }

    /// Executes one signed attempt while holding the session request permit.
    async fn attempt(
        &self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: Option<&[u8]>,
        sleep_secs: f64,
    ) -> Result<VanillaResponse, VanillaHttpError> {
        let _permit = self.permit.lock().await;

        let timestamp = epoch_millis();
        let full_query = match query {
            Some(q) if !q.is_empty() => format!("{q}&timestamp={timestamp}"),
            _ => format!("timestamp={timestamp}"),
        };
        let signature = self.credential.sign(&full_query, body);
        let url = format!("{}{}?{}", self.base_url, path, full_query);

        let mut request = self
            .client
            .request(method, url)
            .header(HEADER_APP_ID, self.credential.app_id())
            .header(HEADER_APP_SIGN, signature);
        if let Some(token) = self.auth_token.read().await.as_deref() {
            request = request.header(AUTHORIZATION, format!("{AUTH_SCHEME} {token}"));
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        if self.humanize_pacing && sleep_secs > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(sleep_secs)).await;
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(VanillaHttpError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        decode_envelope(&headers, &bytes)
    }

    // -- API operations ---------------------------------------------------------------

    /// Exchanges the mini-app identity for a server user id.
    pub async fn login(&self, request: &LoginRequest) -> Option<LoginData> {
        let payload = serde_json::to_value(request).ok()?;
        self.send(
            Method::POST,
            LOGIN_PATH,
            None,
            Some(&payload),
            DEFAULT_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Fetches a fresh user state snapshot.
    pub async fn user_info(&self, user_id: i64) -> Option<UserInfo> {
        self.send(
            Method::GET,
            USER_INFO_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Fetches all asset balances.
    pub async fn user_assets(&self, user_id: i64) -> Vec<AssetBalance> {
        self.send(
            Method::GET,
            USER_ASSET_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await
        .and_then(|envelope| envelope.decode_data())
        .unwrap_or_default()
    }

    /// Fetches daily bonus availability.
    pub async fn sign_info(&self, user_id: i64) -> Option<SignInfo> {
        self.send(
            Method::GET,
            SIGN_INFO_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Claims the daily bonus; `true` on envelope success.
    pub async fn claim_sign_in(&self, user_id: i64) -> bool {
        let payload = serde_json::json!(UserIdPayload::new(user_id));
        self.send(
            Method::POST,
            SIGN_CLAIM_PATH,
            None,
            Some(&payload),
            CLAIM_PACING_SECS,
        )
        .await
        .is_some_and(|envelope| envelope.is_ok())
    }

    /// Fetches chain (streak) sign-in progress.
    pub async fn chain_sign_info(&self, user_id: i64) -> Option<ChainSignInfo> {
        self.send(
            Method::GET,
            CHAIN_SIGN_INFO_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Fetches the chain sign-in reward schedule.
    pub async fn daily_sign_config(&self) -> Vec<DailySignReward> {
        self.send(
            Method::GET,
            DAILY_SIGN_CONFIG_PATH,
            None,
            None,
            DEFAULT_PACING_SECS,
        )
        .await
        .and_then(|envelope| envelope.decode_data())
        .unwrap_or_default()
    }

    /// Claims the chain sign-in reward for the current streak day.
    pub async fn claim_daily_sign_in(&self, user_id: i64) -> Option<DailyClaimData> {
        let payload = serde_json::json!(UserIdPayload::new(user_id));
        self.send(
            Method::POST,
            DAILY_SIGN_CLAIM_PATH,
            None,
            Some(&payload),
            CLAIM_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Fetches the user's still-missing activity tasks.
    pub async fn activity_list(&self, user_id: i64) -> Vec<Task> {
        self.send(
            Method::GET,
            ACTIVITY_LIST_PATH,
            Some(&ActivityListQuery::missing(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await
        .and_then(|envelope| envelope.decode_data())
        .unwrap_or_default()
    }

    /// Attempts to complete one task; `true` on envelope success.
    pub async fn complete_task(&self, user_id: i64, task_id: i64) -> bool {
        let payload = serde_json::json!(CompleteTaskPayload::new(user_id, task_id));
        self.send(
            Method::POST,
            COMPLETE_TASK_PATH,
            None,
            Some(&payload),
            DEFAULT_PACING_SECS,
        )
        .await
        .is_some_and(|envelope| envelope.is_ok())
    }

    /// Spends tappable currency. Returns the full envelope; an empty `message`
    /// signals a clean tap.
    pub async fn expend_asset(
        &self,
        user_id: i64,
        quantity: i64,
        sleep_secs: f64,
    ) -> Option<VanillaResponse> {
        let payload = serde_json::json!(ExpendPayload::new(user_id, quantity));
        self.send(
            Method::POST,
            EXPEND_ASSET_PATH,
            None,
            Some(&payload),
            sleep_secs,
        )
        .await
    }

    /// Consumes one charge boost to refill the tappable currency.
    ///
    /// Success is signaled by `code == 200` on this endpoint.
    pub async fn consume_charge(&self, user_id: i64) -> Option<VanillaResponse> {
        self.send(
            Method::GET,
            CHARGE_ASSET_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await
    }

    /// Fetches the remaining charge boost count.
    pub async fn charge_remaining(&self, user_id: i64) -> Option<ChargeState> {
        self.send(
            Method::GET,
            CHARGE_REMAINING_PATH,
            Some(&UserQuery::new(user_id).encode()),
            None,
            DEFAULT_PACING_SECS,
        )
        .await?
        .decode_data()
    }

    /// Fetches the per-level tap-economy thresholds.
    pub async fn level_configs(&self) -> Vec<LevelConfig> {
        self.send(
            Method::GET,
            LEVEL_OPTIONS_PATH,
            None,
            None,
            DEFAULT_PACING_SECS,
        )
        .await
        .and_then(|envelope| envelope.decode_data())
        .unwrap_or_default()
    }

    /// Requests the per-level manual upgrade once the tap threshold is reached.
    pub async fn manual_upgrade(&self, user_id: i64) -> Option<VanillaResponse> {
        let payload = serde_json::json!(UserIdTextPayload::new(user_id));
        self.send(
            Method::POST,
            MANUAL_UPGRADE_PATH,
            None,
            Some(&payload),
            DEFAULT_PACING_SECS,
        )
        .await
    }

    /// Requests the currency-funded level upgrade.
    pub async fn upgrade_level(&self, user_id: i64) -> Option<VanillaResponse> {
        let payload = serde_json::json!(UserIdTextPayload::new(user_id));
        self.send(
            Method::POST,
            LEVEL_UPGRADE_PATH,
            None,
            Some(&payload),
            LEVEL_UPGRADE_PACING_SECS,
        )
        .await
    }
}

/// Decompresses and decodes a response body into the envelope.
///
/// Falls back to decoding the raw bytes when manual decompression fails, mirroring the
/// transport library's own JSON path.
fn decode_envelope(headers: &HeaderMap, bytes: &[u8]) -> Result<VanillaResponse, VanillaHttpError> {
    let encoding = headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match decompress_body(&encoding, bytes) {
        Ok(decoded) => serde_json::from_slice(&decoded)
            .or_else(|_| serde_json::from_slice(bytes))
            .map_err(Into::into),
        Err(error) => {
            tracing::warn!(%error, %encoding, "Decompression failed, decoding raw body");
            serde_json::from_slice(bytes).map_err(Into::into)
        }
    }
}

fn decompress_body(encoding: &str, bytes: &[u8]) -> Result<Vec<u8>, VanillaHttpError> {
    let mut decoded = Vec::new();
    match encoding {
        "gzip" => {
            flate2::read::GzDecoder::new(bytes)
                .read_to_end(&mut decoded)
                .map_err(|e| VanillaHttpError::Decompress(e.to_string()))?;
        }
        "deflate" => {
            flate2::read::ZlibDecoder::new(bytes)
                .read_to_end(&mut decoded)
                .map_err(|e| VanillaHttpError::Decompress(e.to_string()))?;
        }
        "br" => {
            brotli::Decompressor::new(bytes, 4096)
                .read_to_end(&mut decoded)
                .map_err(|e| VanillaHttpError::Decompress(e.to_string()))?;
        }
        _ => decoded.extend_from_slice(bytes),
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const BODY: &str = r#"{"code":0,"data":{"level":3},"message":""}"#;

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn deflate(bytes: &[u8]) -> Vec<u8> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    fn br(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
            writer.write_all(bytes).unwrap();
        }
        out
    }

    fn headers_with_encoding(encoding: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if !encoding.is_empty() {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_str(encoding).unwrap());
        }
        headers
    }

    #[rstest]
    #[case("gzip")]
    #[case("deflate")]
    #[case("br")]
    #[case("")]
    fn test_decompression_round_trip(#[case] encoding: &str) {
        let compressed = match encoding {
            "gzip" => gzip(BODY.as_bytes()),
            "deflate" => deflate(BODY.as_bytes()),
            "br" => br(BODY.as_bytes()),
            _ => BODY.as_bytes().to_vec(),
        };
        let envelope = decode_envelope(&headers_with_encoding(encoding), &compressed).unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.data, json!({"level": 3}));
    }

    #[rstest]
    fn test_decode_falls_back_to_raw_body_on_bad_encoding_header() {
        // Header claims gzip but the body is plain JSON
        let envelope = decode_envelope(&headers_with_encoding("gzip"), BODY.as_bytes()).unwrap();
        assert!(envelope.is_ok());
    }

    #[rstest]
    fn test_decode_rejects_garbage() {
        let result = decode_envelope(&headers_with_encoding(""), b"\x00\x01\x02");
        assert!(matches!(result, Err(VanillaHttpError::Json(_))));
    }
}
