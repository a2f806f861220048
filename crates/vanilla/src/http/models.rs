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

//! Vanilla HTTP API models and types.
//!
//! All structs tolerate missing fields via `serde(default)`: the workflow must keep
//! going on partial envelopes, treating absent data as "nothing to do" rather than
//! failing the loop.

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::common::{
    consts::{TAP_CURRENCY, VANILLA_CHARGE_SUCCESS_CODE, VANILLA_SUCCESS_CODE},
    enums::TradeClaimStatus,
};

/// The `{code, data, message}` wrapper around every API response.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VanillaResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: String,
}

impl VanillaResponse {
    /// Returns `true` when the envelope reports action success (`code == 0`).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == VANILLA_SUCCESS_CODE
    }

    /// Returns `true` when the charge endpoint reports success (`code == 200`).
    #[must_use]
    pub fn is_charge_ok(&self) -> bool {
        self.code == VANILLA_CHARGE_SUCCESS_CODE
    }

    /// Decodes the `data` field into the requested model, or `None` when the field is
    /// absent or has an unexpected shape.
    #[must_use]
    pub fn decode_data<T: DeserializeOwned>(&self) -> Option<T> {
        if self.data.is_null() {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Amounts arrive either as JSON numbers or as decimal strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Login response data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub is_new_user: bool,
    /// Account tier label reported by the server.
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
}

/// User state snapshot; server-authoritative, refreshed before each decision point.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub tap_level: i64,
    /// Cumulative tapped volume.
    #[serde(default)]
    pub volume: i64,
    /// Consecutive sign-in streak length in days.
    #[serde(default)]
    pub duration_days: i64,
    /// Absent status is treated as "no claim available".
    #[serde(default)]
    pub claim_status: Option<TradeClaimStatus>,
}

/// Tap-economy thresholds for one level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    #[serde(default)]
    pub level: i64,
    /// Upper volume bound of the level.
    #[serde(default)]
    pub cost_up: i64,
    /// Lower volume bound of the level.
    #[serde(default)]
    pub cost_down: i64,
    /// Currency refill rate.
    #[serde(default)]
    pub speed_per_hour: i64,
}

impl LevelConfig {
    /// Volume that must be tapped to traverse this level.
    #[must_use]
    pub fn required_tap(&self) -> i64 {
        self.cost_up - self.cost_down
    }
}

/// One currency balance entry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    #[serde(default)]
    pub currency: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: f64,
}

/// Finds the tappable (CONE) balance in an asset list, as a whole unit count.
#[must_use]
pub fn tap_balance(assets: &[AssetBalance]) -> i64 {
    assets
        .iter()
        .find(|asset| asset.currency == TAP_CURRENCY)
        .map(|asset| asset.amount as i64)
        .unwrap_or(0)
}

/// Daily bonus availability.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInfo {
    /// Epoch milliseconds of the next claim window.
    #[serde(default)]
    pub next_reward_timestamp: i64,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub amount: i64,
}

/// Chain (14-day streak) sign-in progress.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSignInfo {
    /// `true` once all streak days are claimed; defaults closed.
    #[serde(default = "default_true")]
    pub is_complete: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ChainSignInfo {
    fn default() -> Self {
        Self { is_complete: true }
    }
}

/// One row of the chain sign-in reward schedule.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySignReward {
    #[serde(default)]
    pub day: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub reward: f64,
}

/// Finds the scheduled reward for the given streak day.
#[must_use]
pub fn reward_for_day(schedule: &[DailySignReward], day: i64) -> f64 {
    schedule
        .iter()
        .find(|entry| entry.day == day)
        .map(|entry| entry.reward)
        .unwrap_or(0.0)
}

/// Result of a chain sign-in claim attempt.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyClaimData {
    /// Mixed-case wire values (`CLAIMED`, `claim-not-satisfy`), kept raw.
    #[serde(default)]
    pub claim_status: Option<String>,
}

/// One activity task.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub reward: f64,
    #[serde(default)]
    pub reward_ccy: Option<String>,
}

/// Remaining charge boosts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeState {
    #[serde(default)]
    pub remaining: i64,
}
