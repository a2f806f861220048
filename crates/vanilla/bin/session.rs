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

//! Runs a single session end to end with a pre-extracted web-app token.
//!
//! # Prerequisites
//!
//! Set environment variables:
//! - `VANILLA_WEB_APP_DATA`: the raw `tgWebAppData` query string from the mini-app URL
//! - `VANILLA_CLIENT_USER_ID`: the platform numeric user id
//! - `VANILLA_USER_NAME` (optional): the platform username

use async_trait::async_trait;
use vanilla_tapper::{
    config::VanillaBotConfig,
    guard::AllowAll,
    identity::{AuthOutcome, IdentityBridge, canonical_web_app_token},
    runner::{RunMode, SessionProfile, SessionRunner},
};

/// Bridge serving a token extracted ahead of time, e.g. from a captured mini-app URL.
#[derive(Debug)]
struct StaticTokenBridge {
    raw_web_app_data: String,
}

#[async_trait]
impl IdentityBridge for StaticTokenBridge {
    async fn web_app_token(&self, _session: &str, _start_param: &str) -> AuthOutcome {
        match canonical_web_app_token(&self.raw_web_app_data) {
            Some(token) => AuthOutcome::Authorized(token),
            None => AuthOutcome::Unknown("web-app data missing required fields".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let raw_web_app_data = std::env::var("VANILLA_WEB_APP_DATA")?;
    let client_user_id: i64 = std::env::var("VANILLA_CLIENT_USER_ID")?.parse()?;
    let user_name = std::env::var("VANILLA_USER_NAME").unwrap_or_default();

    let profile = SessionProfile {
        client_user_id,
        user_name,
        ..Default::default()
    };
    let mut config = VanillaBotConfig::default();
    config.use_start_delay = false;

    let runner = SessionRunner::new(
        "session-1",
        config,
        profile,
        StaticTokenBridge { raw_web_app_data },
        AllowAll,
        RunMode::Sequential,
    )?;

    match runner.run().await {
        Some(minutes) => println!("Run completed; next cycle in {minutes} min"),
        None => eprintln!("Run aborted during authorization"),
    }

    Ok(())
}
