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

//! Configuration structures for the Vanilla session client.

use crate::common::consts::{
    DEFAULT_REFERRAL_ID, DEFAULT_USER_AGENT, VANILLA_HTTP_URL, VANILLA_WS_URL,
};

/// Configuration for a single bot session.
///
/// The struct only carries values; loading them from files or the environment is the
/// caller's concern.
#[derive(Clone, Debug)]
pub struct VanillaBotConfig {
    /// Whether to sleep a random delay before the run starts.
    pub use_start_delay: bool,
    /// Start delay bounds in seconds, `[min, max]`.
    pub start_delay_secs: [u64; 2],
    /// Tap request size bounds, `[min, max]`.
    pub tap_count: [i64; 2],
    /// Whether to run the tap loop at all.
    pub auto_tap: bool,
    /// Whether to attempt the currency-funded level upgrade once per run.
    pub upgrade_level_with_sugar: bool,
    /// Default referral code (`inviteId...` format).
    pub referral_id: String,
    /// Whether to verify TLS certificates on outbound HTTP requests.
    pub verify_tls: bool,
    /// Whether to apply artificial pre-request delays emulating human pacing.
    pub humanize_pacing: bool,
    /// Optional HTTP/SOCKS proxy URL.
    pub proxy_url: Option<String>,
    /// Optional override for the REST base URL.
    pub base_url_http: Option<String>,
    /// Optional override for the WebSocket URL.
    pub base_url_ws: Option<String>,
    /// Optional browser user agent override.
    pub user_agent: Option<String>,
    /// Optional REST timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Optional maximum retry attempts for REST requests.
    pub max_retries: Option<u32>,
    /// Optional initial retry backoff in seconds.
    pub retry_delay_initial_secs: Option<u64>,
    /// Optional heartbeat interval (seconds) for the keep-alive socket.
    pub heartbeat_interval_secs: Option<u64>,
    /// Optional delay (seconds) between WebSocket reconnect attempts.
    pub ws_reconnect_delay_secs: Option<u64>,
    /// Optional cap on WebSocket reconnect attempts (unbounded when `None`).
    pub ws_reconnect_max_attempts: Option<u32>,
}

impl Default for VanillaBotConfig {
    fn default() -> Self {
        Self {
            use_start_delay: true,
            start_delay_secs: [30, 60],
            tap_count: [80, 100],
            auto_tap: true,
            upgrade_level_with_sugar: false,
            referral_id: DEFAULT_REFERRAL_ID.to_string(),
            verify_tls: true,
            humanize_pacing: true,
            proxy_url: None,
            base_url_http: None,
            base_url_ws: None,
            user_agent: None,
            http_timeout_secs: Some(60),
            max_retries: Some(10),
            retry_delay_initial_secs: Some(10),
            heartbeat_interval_secs: Some(6),
            ws_reconnect_delay_secs: Some(5),
            ws_reconnect_max_attempts: None,
        }
    }
}

impl VanillaBotConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the REST base URL, considering overrides.
    #[must_use]
    pub fn http_base_url(&self) -> String {
        self.base_url_http
            .clone()
            .unwrap_or_else(|| VANILLA_HTTP_URL.to_string())
    }

    /// Returns the WebSocket URL, considering overrides.
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.base_url_ws
            .clone()
            .unwrap_or_else(|| VANILLA_WS_URL.to_string())
    }

    /// Returns the browser user agent, considering overrides.
    #[must_use]
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}
