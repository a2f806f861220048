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

//! Enumerations for the Vanilla wire protocol.

use serde::{Deserialize, Serialize};

/// Trade/claim gating status reported on the user info snapshot.
///
/// Drives the chain sign-in claim decision: a claim is only attempted while the status
/// is [`TradeClaimStatus::WaitClaim`] or [`TradeClaimStatus::NotTrade`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeClaimStatus {
    /// Reward accrued and waiting to be claimed.
    WaitClaim,
    /// No qualifying trade yet; claiming requires an expend first.
    NotTrade,
    /// Reward already claimed.
    Claimed,
    /// Any status this client does not model.
    #[default]
    #[serde(other)]
    Unknown,
}

impl TradeClaimStatus {
    /// Returns `true` when the chain sign-in claim may be attempted.
    #[must_use]
    pub fn allows_chain_claim(&self) -> bool {
        matches!(self, Self::WaitClaim | Self::NotTrade)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("\"WAIT_CLAIM\"", TradeClaimStatus::WaitClaim)]
    #[case("\"NOT_TRADE\"", TradeClaimStatus::NotTrade)]
    #[case("\"CLAIMED\"", TradeClaimStatus::Claimed)]
    #[case("\"SOMETHING_NEW\"", TradeClaimStatus::Unknown)]
    fn test_deserialize(#[case] raw: &str, #[case] expected: TradeClaimStatus) {
        let status: TradeClaimStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status, expected);
    }

    #[rstest]
    fn test_allows_chain_claim() {
        assert!(TradeClaimStatus::WaitClaim.allows_chain_claim());
        assert!(TradeClaimStatus::NotTrade.allows_chain_claim());
        assert!(!TradeClaimStatus::Claimed.allows_chain_claim());
        assert!(!TradeClaimStatus::Unknown.allows_chain_claim());
    }
}
