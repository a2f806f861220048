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

//! Outbound WebSocket frames.
//!
//! Inbound frames are opaque to this client: the receive loop drains them unparsed so
//! server-initiated closure is detected promptly.

use serde::{Deserialize, Serialize};

use crate::common::consts::ASSETS_TOPIC;

/// Subscription request sent once per (re)connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubscribeFrame {
    pub id: String,
    pub event: String,
    pub topic: String,
    pub params: SubscribeParams,
}

/// Parameters of the subscription frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeParams {
    pub binary: bool,
    pub user_id: String,
}

impl SubscribeFrame {
    /// Creates the asset-topic subscription for the given user.
    #[must_use]
    pub fn assets(user_id: i64) -> Self {
        Self {
            id: ASSETS_TOPIC.to_string(),
            event: "sub".to_string(),
            topic: ASSETS_TOPIC.to_string(),
            params: SubscribeParams {
                binary: true,
                user_id: user_id.to_string(),
            },
        }
    }
}

/// Heartbeat frame sent on a fixed interval while the connection is open.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PingFrame {
    /// Epoch milliseconds at send time.
    pub ping: i64,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn test_subscribe_frame_wire_shape() {
        let frame = serde_json::to_value(SubscribeFrame::assets(42)).unwrap();
        assert_eq!(
            frame,
            json!({
                "id": "AssetsTopic",
                "event": "sub",
                "topic": "AssetsTopic",
                "params": {"binary": true, "userId": "42"},
            })
        );
    }

    #[rstest]
    fn test_ping_frame_wire_shape() {
        let frame = serde_json::to_value(PingFrame { ping: 1_700_000_000_000 }).unwrap();
        assert_eq!(frame, json!({"ping": 1_700_000_000_000_i64}));
    }
}
