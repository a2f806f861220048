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

//! Session automation client for the Vanilla Telegram mini-app game.
//!
//! The crate drives a full game session against the Vanilla HTTP API: it exchanges a
//! mini-app bridge token for a server identity, claims daily and chain sign-in rewards,
//! completes activity tasks, and runs the tap economy loop bounded by server-reported
//! level thresholds and asset balances. A keep-alive WebSocket connection runs
//! concurrently with the HTTP workflow so the server treats the session as live.
//!
//! # Components
//!
//! - [`http::client::VanillaHttpClient`]: signed HTTP client with retry/backoff and one
//!   typed method per server action.
//! - [`websocket::client::VanillaWebSocketClient`]: keep-alive socket with heartbeat and
//!   auto-reconnect.
//! - [`runner::SessionRunner`]: the per-session workflow orchestrator.
//! - [`identity::IdentityBridge`]: contract for the messaging-platform token handshake
//!   (implemented externally).
//! - [`guard::ApiGuard`]: pre-run endpoint health-check contract (implemented externally).

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod guard;
pub mod http;
pub mod identity;
pub mod runner;
pub mod websocket;
