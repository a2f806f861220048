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

//! Vanilla HTTP API query parameter and payload builders.
//!
//! The signature covers the query string exactly as sent on the wire, so every struct
//! here serializes with a stable field order. The `timestamp` parameter is appended by
//! the transport just before signing.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Serializes query parameters into their wire form.
pub(crate) fn encode_query<T: Serialize>(params: &T) -> String {
    serde_urlencoded::to_string(params).unwrap_or_default()
}

/// Query parameters for user-scoped read endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: i64,
}

impl UserQuery {
    /// Creates parameters for the given user.
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }

    #[must_use]
    pub(crate) fn encode(&self) -> String {
        encode_query(self)
    }
}

/// Query parameters for `/bapi/v1/activity/list`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListQuery {
    pub user_id: i64,
    /// Task filter; the workflow only asks for still-missing tasks.
    pub r#type: String,
}

impl ActivityListQuery {
    /// Creates parameters listing the user's missing tasks.
    #[must_use]
    pub fn missing(user_id: i64) -> Self {
        Self {
            user_id,
            r#type: "MISSING".to_string(),
        }
    }

    #[must_use]
    pub(crate) fn encode(&self) -> String {
        encode_query(self)
    }
}

/// Payload for `/bapi/v1/user/login`.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), derive(Debug))]
pub struct LoginRequest {
    /// Messaging-platform numeric user id.
    pub client_user_id: i64,
    #[builder(default)]
    pub first_name: String,
    #[builder(default)]
    pub last_name: String,
    #[builder(default)]
    pub user_name: String,
    /// Referral id digits (without the `inviteId` prefix).
    pub invite_id: String,
}

impl LoginRequest {
    /// Creates a new builder for [`LoginRequest`].
    #[must_use]
    pub fn builder() -> LoginRequestBuilder {
        LoginRequestBuilder::default()
    }
}

/// Payload carrying only the numeric user id (sign-in claims).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdPayload {
    pub user_id: i64,
}

impl UserIdPayload {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Payload carrying the user id in its stringified wire form (level upgrades).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdTextPayload {
    pub user_id: String,
}

impl UserIdTextPayload {
    #[must_use]
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
        }
    }
}

/// Payload for `/bapi/v1/activity/place`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskPayload {
    pub user_id: i64,
    pub task_id: i64,
}

impl CompleteTaskPayload {
    #[must_use]
    pub fn new(user_id: i64, task_id: i64) -> Self {
        Self { user_id, task_id }
    }
}

/// Payload for `/dapi/v1/assets/expend`; both fields are stringified on the wire.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpendPayload {
    pub user_id: String,
    pub quantity: String,
}

impl ExpendPayload {
    #[must_use]
    pub fn new(user_id: i64, quantity: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            quantity: quantity.to_string(),
        }
    }
}
