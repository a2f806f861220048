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

//! Retry/backoff policy for signed HTTP requests.

use std::time::Duration;

use crate::http::error::VanillaHttpError;

/// Delay cap applied to the doubling backoff after timeout errors.
pub const TIMEOUT_BACKOFF_CAP_SECS: u64 = 60;

/// Configuration for request retry behavior.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts before giving up.
    pub max_retries: u32,
    /// Backoff before the second attempt; doubles on each subsequent failure.
    pub initial_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_delay_secs: 10,
        }
    }
}

/// Doubling backoff state for one retry sequence.
///
/// Delays are monotonically non-decreasing across attempts. Timeout failures cap the
/// delay at [`TIMEOUT_BACKOFF_CAP_SECS`] so a slow endpoint cannot stretch the backoff
/// indefinitely, matching the transport contract.
#[derive(Debug)]
pub struct Backoff {
    delay_secs: u64,
}

impl Backoff {
    /// Creates a new [`Backoff`] starting from the configured initial delay.
    #[must_use]
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            delay_secs: config.initial_delay_secs,
        }
    }

    /// Returns the delay to sleep before the next attempt and advances the state
    /// according to the error that triggered the retry.
    pub fn next_delay(&mut self, error: &VanillaHttpError) -> Duration {
        let current = self.delay_secs;
        self.delay_secs = match error {
            VanillaHttpError::Timeout(_) => (self.delay_secs * 2).min(TIMEOUT_BACKOFF_CAP_SECS),
            _ => self.delay_secs * 2,
        };
        Duration::from_secs(current)
    }
}
