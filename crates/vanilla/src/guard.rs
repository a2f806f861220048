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

//! Endpoint health-check contract consulted before each run.

use async_trait::async_trait;

/// Pre-run health check for the game endpoint.
///
/// Implemented by the external change-detection subsystem. Consulted exactly once per
/// run before any API activity; a `false` result aborts the run with a fixed cool-down
/// and no game-API traffic.
#[async_trait]
pub trait ApiGuard: Send + Sync {
    /// Returns `true` when the endpoint still matches the expected fingerprint.
    async fn check_base_url(&self, session: &str) -> bool;
}

/// Guard that always passes; useful when change detection is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl ApiGuard for AllowAll {
    async fn check_base_url(&self, _session: &str) -> bool {
        true
    }
}
