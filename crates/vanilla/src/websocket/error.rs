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

//! Vanilla WebSocket client error types.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error types for the keep-alive WebSocket client.
#[derive(Debug, Clone, Error)]
pub enum VanillaWsError {
    /// Invalid or unresolvable endpoint URL.
    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),
    /// The upgrade handshake did not complete within the open timeout.
    #[error("Connection timeout after {0}s")]
    ConnectTimeout(u64),
    /// WebSocket transport error from tungstenite.
    #[error("Transport error: {0}")]
    Transport(String),
    /// JSON serialization error on an outbound frame.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<tungstenite::Error> for VanillaWsError {
    fn from(error: tungstenite::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for VanillaWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<http::Error> for VanillaWsError {
    fn from(error: http::Error) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}
