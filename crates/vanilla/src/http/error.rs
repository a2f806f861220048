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

//! Error structures and enumerations for the Vanilla HTTP client.

use thiserror::Error;

/// A typed error enumeration for the Vanilla HTTP client.
#[derive(Debug, Error)]
pub enum VanillaHttpError {
    /// Non-200 HTTP status returned by the API.
    #[error("Unexpected HTTP status code {status}")]
    UnexpectedStatus { status: u16 },
    /// Request exceeded its deadline.
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Failed to reach the server at all.
    #[error("Connection error: {0}")]
    Connect(String),
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    Json(String),
    /// Failure while decompressing the response body.
    #[error("Decompression error: {0}")]
    Decompress(String),
    /// Any other transport-layer failure; never retried.
    #[error("Request error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for VanillaHttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_decode() {
            Self::Json(error.to_string())
        } else {
            Self::Other(error.to_string())
        }
    }
}

impl From<serde_json::Error> for VanillaHttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

/// Determines whether an error should trigger another retry attempt.
///
/// Only HTTP status failures and network-level timeout/connect errors are retried;
/// anything else aborts the request immediately.
#[must_use]
pub fn should_retry_http_error(error: &VanillaHttpError) -> bool {
    matches!(
        error,
        VanillaHttpError::UnexpectedStatus { .. }
            | VanillaHttpError::Timeout(_)
            | VanillaHttpError::Connect(_)
    )
}
