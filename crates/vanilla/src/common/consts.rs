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

//! Core constants for the Vanilla client.

/// Venue identifier string.
pub const VANILLA: &str = "VANILLA";

// Production URLs
pub const VANILLA_HTTP_URL: &str = "https://tg.vanilla-finance.com";
pub const VANILLA_WS_URL: &str = "wss://tg.vanilla-finance.com/dapi/ws/v1/assets";

// Application identity used for request signing
pub const VANILLA_APP_ID: &str = "237a903dd511477ea4d2a2019ca7c03e";
pub const VANILLA_APP_SECRET: &str = "550e23371cdb4012898efed9295bb9bc9139b19e-d9e648c18074fc2d83d540e1";

// Signed request headers
pub const HEADER_APP_ID: &str = "x-vanilla-appid";
pub const HEADER_APP_SIGN: &str = "x-vanilla-appsign";

/// Scheme prefix for the `authorization` header carrying the mini-app token.
pub const AUTH_SCHEME: &str = "tma";

// Business API paths (`/bapi`)
pub const LOGIN_PATH: &str = "/bapi/v1/user/login";
pub const USER_INFO_PATH: &str = "/bapi/v1/user/info";
pub const USER_ASSET_PATH: &str = "/bapi/v1/user/asset";
pub const LEVEL_OPTIONS_PATH: &str = "/bapi/v1/options/level";
pub const SIGN_INFO_PATH: &str = "/bapi/v1/activity/timeslot/sign-info";
pub const SIGN_CLAIM_PATH: &str = "/bapi/v1/activity/timeslot/sign-claim";
pub const CHAIN_SIGN_INFO_PATH: &str = "/bapi/v1/activity/chain/sign-info";
pub const DAILY_SIGN_CONFIG_PATH: &str = "/bapi/v1/activity/daily-sign-config";
pub const DAILY_SIGN_CLAIM_PATH: &str = "/bapi/v1/activity/daily-sign-claim";
pub const ACTIVITY_LIST_PATH: &str = "/bapi/v1/activity/list";
pub const COMPLETE_TASK_PATH: &str = "/bapi/v1/activity/place";
pub const MANUAL_UPGRADE_PATH: &str = "/bapi/v1/user/level/manual-upgrade";
pub const LEVEL_UPGRADE_PATH: &str = "/bapi/v1/user/level-upgrade";

// Data/asset API paths (`/dapi`)
pub const EXPEND_ASSET_PATH: &str = "/dapi/v1/assets/expend";
pub const CHARGE_ASSET_PATH: &str = "/dapi/v1/assets/charge";
pub const CHARGE_REMAINING_PATH: &str = "/dapi/v1/assets/charge/remaining";

/// The consumable currency spent by tap actions.
pub const TAP_CURRENCY: &str = "CONE";

/// WebSocket subscription topic for asset updates.
pub const ASSETS_TOPIC: &str = "AssetsTopic";

/// Referral code used when no dynamic code is configured.
pub const DEFAULT_REFERRAL_ID: &str = "inviteId10512928";

/// Envelope code denoting success on `/bapi` action endpoints.
pub const VANILLA_SUCCESS_CODE: i64 = 0;

/// Envelope code denoting success on the charge endpoint.
pub const VANILLA_CHARGE_SUCCESS_CODE: i64 = 200;

/// Default browser user agent presented on HTTP and WebSocket connections.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 12; SM-G991B) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/128.0.6613.40 Mobile Safari/537.36";
