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

//! Per-session workflow orchestrator.
//!
//! Runs the full game workflow as a state sequence: endpoint guard, identity handshake,
//! login, keep-alive socket, state sync, daily bonus, chain sign-in, tasks, optional
//! funded upgrade, tap loop, disconnect, then either sleeps (concurrent mode) or hands
//! the cycle duration back to the outer scheduler (sequential mode). All workflow steps
//! within one session execute strictly sequentially; only the keep-alive socket runs
//! concurrently with them.

use std::{sync::Arc, time::Duration};

use rand::Rng;
use tokio::sync::Mutex;

use crate::{
    common::{
        consts::{DEFAULT_REFERRAL_ID, VANILLA_APP_ID, VANILLA_APP_SECRET},
        credential::Credential,
        enums::TradeClaimStatus,
        epoch_millis,
    },
    config::VanillaBotConfig,
    guard::ApiGuard,
    http::{
        client::VanillaHttpClient,
        models::{ChargeState, UserInfo, reward_for_day, tap_balance},
        query::LoginRequest,
    },
    identity::{AuthOutcome, IdentityBridge, choose_referral, invite_digits},
    websocket::client::VanillaWebSocketClient,
};

/// Nominal workflow cycle length.
const NOMINAL_CYCLE_SECS: u64 = 3 * 3600;
/// Cool-down (minutes) returned when the endpoint guard trips.
const GUARD_COOLDOWN_MINS: u64 = 360;
/// Human-like delay before each task completion attempt.
const TASK_START_DELAY_SECS: u64 = 30;
/// Balance floor below which a charge boost is consumed.
const TAP_BALANCE_FLOOR: i64 = 20;

/// How a session participates in multi-account scheduling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// The session owns its own cycle: sleep between runs and loop forever.
    Concurrent,
    /// One run per invocation; the cycle duration is returned to an outer round-robin
    /// scheduler.
    Sequential,
}

/// Platform account details carried into the login payload.
#[derive(Clone, Debug, Default)]
pub struct SessionProfile {
    /// Messaging-platform numeric user id.
    pub client_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

/// Outcome of a single workflow pass.
enum RunOutcome {
    /// Guard reported an endpoint change; no API traffic was issued.
    GuardTripped,
    /// Identity handshake failed; terminal for this run.
    AuthFailed,
    /// Workflow reached the disconnect state.
    Completed,
    /// Unexpected failure somewhere in the workflow.
    Faulted(String),
}

/// Drives the full game workflow for one session.
pub struct SessionRunner<B, G> {
    session: String,
    config: VanillaBotConfig,
    profile: SessionProfile,
    http: VanillaHttpClient,
    socket: VanillaWebSocketClient,
    bridge: B,
    guard: G,
    mode: RunMode,
}

impl<B, G> std::fmt::Debug for SessionRunner<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRunner")
            .field("session", &self.session)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<B, G> SessionRunner<B, G>
where
    B: IdentityBridge,
    G: ApiGuard,
{
    /// Creates a new [`SessionRunner`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        session: impl Into<String>,
        config: VanillaBotConfig,
        profile: SessionProfile,
        bridge: B,
        guard: G,
        mode: RunMode,
    ) -> anyhow::Result<Self> {
        let session = session.into();
        let credential =
            Credential::new(VANILLA_APP_ID.to_string(), VANILLA_APP_SECRET.to_string());
        // Session-scoped permit: serializes all signed requests within this session
        let permit = Arc::new(Mutex::new(()));
        let http = VanillaHttpClient::new(session.clone(), &config, credential, permit)?;
        let socket = VanillaWebSocketClient::new(session.clone(), &config);

        Ok(Self {
            session,
            config,
            profile,
            http,
            socket,
            bridge,
            guard,
            mode,
        })
    }

    /// Runs the session workflow.
    ///
    /// In [`RunMode::Sequential`] returns the cycle duration in minutes for the outer
    /// scheduler; in [`RunMode::Concurrent`] loops forever, sleeping between cycles.
    /// Returns `None` when the identity handshake fails, and the guard cool-down when
    /// the endpoint check trips.
    pub async fn run(&self) -> Option<u64> {
        if self.config.use_start_delay {
            let [min, max] = self.config.start_delay_secs;
            let delay = rand::thread_rng().gen_range(min..=max.max(min));
            tracing::info!(session = %self.session, "Waiting {delay}s before starting");
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }

        loop {
            match self.run_once().await {
                RunOutcome::GuardTripped => return Some(GUARD_COOLDOWN_MINS),
                RunOutcome::AuthFailed => return None,
                RunOutcome::Completed => {
                    let cycle_mins = NOMINAL_CYCLE_SECS / 60;
                    match self.mode {
                        RunMode::Concurrent => {
                            let sleep_mins =
                                cycle_mins + rand::thread_rng().gen_range(5..=9);
                            tracing::info!(session = %self.session, "Sleeping {sleep_mins} min");
                            tokio::time::sleep(Duration::from_secs(sleep_mins * 60)).await;
                        }
                        RunMode::Sequential => {
                            tracing::info!(session = %self.session, "==== Completed ====");
                            return Some(cycle_mins);
                        }
                    }
                }
                RunOutcome::Faulted(detail) => {
                    let cooldown = rand::thread_rng().gen_range(60..=120);
                    tracing::error!(
                        session = %self.session,
                        %detail,
                        "Unknown error, cooling down {cooldown}s",
                    );
                    tokio::time::sleep(Duration::from_secs(cooldown)).await;
                }
            }
        }
    }

    /// One full workflow pass.
    async fn run_once(&self) -> RunOutcome {
        if !self.guard.check_base_url(&self.session).await {
            tracing::warn!(
                session = %self.session,
                "Detected endpoint change, stopping this run for safety",
            );
            return RunOutcome::GuardTripped;
        }

        // AUTH
        let referral = choose_referral(
            &self.config.referral_id,
            DEFAULT_REFERRAL_ID,
            &mut rand::thread_rng(),
        )
        .to_string();
        let invite_id = invite_digits(&referral).to_string();
        let token = match self.bridge.web_app_token(&self.session, &invite_id).await {
            AuthOutcome::Authorized(token) => token,
            AuthOutcome::Deactivated => {
                tracing::error!(
                    session = %self.session,
                    "Platform account has been deactivated; reactivate it to continue",
                );
                return RunOutcome::AuthFailed;
            }
            AuthOutcome::Banned => {
                tracing::error!(
                    session = %self.session,
                    "Platform account has been banned; contact platform support",
                );
                return RunOutcome::AuthFailed;
            }
            AuthOutcome::Restricted(detail) => {
                tracing::error!(session = %self.session, %detail, "Platform account is restricted");
                return RunOutcome::AuthFailed;
            }
            AuthOutcome::Unauthorized => {
                tracing::error!(
                    session = %self.session,
                    "Session is unauthorized; check the API credentials",
                );
                return RunOutcome::AuthFailed;
            }
            AuthOutcome::Unknown(detail) => {
                tracing::error!(session = %self.session, %detail, "Unknown error during authorization");
                return RunOutcome::AuthFailed;
            }
        };
        self.http.set_auth_token(token).await;

        // LOGIN
        let request = match LoginRequest::builder()
            .client_user_id(self.profile.client_user_id)
            .first_name(self.profile.first_name.clone())
            .last_name(self.profile.last_name.clone())
            .user_name(self.profile.user_name.clone())
            .invite_id(invite_id)
            .build()
        {
            Ok(request) => request,
            Err(error) => return RunOutcome::Faulted(error.to_string()),
        };
        let Some(login) = self.http.login(&request).await else {
            return RunOutcome::Faulted("login request failed".to_string());
        };
        let Some(user_id) = login.user_id else {
            return RunOutcome::Faulted("login response missing user id".to_string());
        };
        if login.is_new_user {
            tracing::info!(session = %self.session, user_id, "Account created successfully");
        } else {
            tracing::info!(session = %self.session, user_id, "Account login successful");
        }

        // Keep the session live for the duration of the workflow
        self.socket.connect(user_id).await;

        // SYNC_STATE
        let user_info = self.http.user_info(user_id).await.unwrap_or_default();
        tracing::info!(
            session = %self.session,
            level = user_info.level,
            tap_level = user_info.tap_level,
            account_type = login.account_type.as_deref().unwrap_or("-"),
            streak_days = user_info.duration_days,
            "User state",
        );
        let assets = self.http.user_assets(user_id).await;
        let balances = assets
            .iter()
            .filter(|asset| asset.amount as i64 != 0)
            .map(|asset| format!("{} {}", asset.amount, asset.currency))
            .collect::<Vec<_>>()
            .join(" - ");
        tracing::info!(session = %self.session, "Balances: {balances}");

        self.claim_daily_bonus(user_id).await;
        self.claim_chain_sign_in(user_id, &user_info).await;
        self.process_tasks(user_id).await;

        if self.config.upgrade_level_with_sugar {
            match self.http.upgrade_level(user_id).await {
                Some(envelope) if envelope.is_ok() => {
                    tracing::info!(
                        session = %self.session,
                        from = user_info.level,
                        to = user_info.level + 1,
                        "Funded level upgrade succeeded",
                    );
                }
                _ => {}
            }
        }

        if self.config.auto_tap {
            self.tap_loop(user_id).await;
        }

        // DISCONNECT
        self.socket.close().await;
        RunOutcome::Completed
    }

    /// DAILY_BONUS: claim when available, otherwise report the remaining wait.
    async fn claim_daily_bonus(&self, user_id: i64) {
        // Absent sign info means no bonus available
        let Some(info) = self.http.sign_info(user_id).await else {
            return;
        };
        if info.available {
            if self.http.claim_sign_in(user_id).await {
                tracing::info!(
                    session = %self.session,
                    amount = info.amount,
                    "Claimed sign-in reward",
                );
            } else {
                tracing::info!(session = %self.session, "Claiming sign-in reward failed");
            }
        } else {
            let (days, hours, minutes, seconds) =
                split_secs((info.next_reward_timestamp - epoch_millis()).max(0) / 1000);
            tracing::info!(
                session = %self.session,
                "Sign-in reward already claimed, next claim in {days}d {hours}h {minutes}m {seconds}s",
            );
        }
    }

    /// CHAIN_SIGNIN: 14-day cumulative streak claim.
    async fn claim_chain_sign_in(&self, user_id: i64, user_info: &UserInfo) {
        let chain = self.http.chain_sign_info(user_id).await.unwrap_or_default();
        let schedule = self.http.daily_sign_config().await;
        let status = user_info.claim_status.unwrap_or_default();
        if chain.is_complete || !status.allows_chain_claim() {
            return;
        }

        let reward = reward_for_day(&schedule, user_info.duration_days + 1);
        if status == TradeClaimStatus::NotTrade {
            // Trade gate: a minimal expend satisfies the server's traded-today precondition
            let _ = self.http.expend_asset(user_id, 1, 2.0).await;
        }

        let claim_status = self
            .http
            .claim_daily_sign_in(user_id)
            .await
            .and_then(|data| data.claim_status);
        match claim_status.as_deref() {
            Some("CLAIMED") => {
                tracing::info!(session = %self.session, reward, "Claimed daily streak reward");
            }
            Some("claim-not-satisfy") => {
                tracing::info!(
                    session = %self.session,
                    "Daily streak reward not claimed, a trade is required first",
                );
            }
            _ => tracing::info!(session = %self.session, "Daily streak reward claim failed"),
        }
    }

    /// TASKS: attempt every incomplete task; one failure never blocks the rest.
    async fn process_tasks(&self, user_id: i64) {
        let tasks = self.http.activity_list(user_id).await;
        for task in tasks {
            if task.is_complete {
                continue;
            }
            if self.config.humanize_pacing {
                tracing::info!(
                    session = %self.session,
                    title = %task.title,
                    "Waiting {TASK_START_DELAY_SECS}s before starting task",
                );
                tokio::time::sleep(Duration::from_secs(TASK_START_DELAY_SECS)).await;
            }
            if self.http.complete_task(user_id, task.task_id).await {
                tracing::info!(
                    session = %self.session,
                    title = %task.title,
                    reward = task.reward,
                    currency = task.reward_ccy.as_deref().unwrap_or("-"),
                    "Task completed",
                );
            } else {
                tracing::info!(session = %self.session, title = %task.title, "Task not completed");
            }
        }
    }

    /// TAP_LOOP: tap toward the level threshold until no action applies.
    ///
    /// Each iteration works from a fresh state snapshot; the decision order is
    /// tap, then threshold upgrade, then charge refill, then exit.
    async fn tap_loop(&self, user_id: i64) {
        loop {
            let Some(user_info) = self.http.user_info(user_id).await else {
                break;
            };
            let levels = self.http.level_configs().await;
            let Some(level_cfg) = levels.iter().find(|cfg| cfg.level == user_info.level) else {
                break;
            };
            let assets = self.http.user_assets(user_id).await;
            let balance = tap_balance(&assets);
            let charge = self
                .http
                .charge_remaining(user_id)
                .await
                .unwrap_or_default();

            let required_tap = level_cfg.required_tap();
            let till_tapped = user_info.volume - level_cfg.cost_down;
            let [tap_min, tap_max] = self.config.tap_count;
            let draw = rand::thread_rng().gen_range(tap_min..=tap_max.max(tap_min));
            let available_tap = tap_amount(draw, required_tap - till_tapped, balance);

            if available_tap > 3 * user_info.level && till_tapped != required_tap {
                let pacing = tap_pacing_secs(tap_min, tap_max, &mut rand::thread_rng());
                let Some(envelope) = self
                    .http
                    .expend_asset(user_id, available_tap, pacing)
                    .await
                else {
                    tracing::warn!(session = %self.session, "Tap not completed this cycle");
                    break;
                };

                let Some(refreshed) = self.http.user_info(user_id).await else {
                    break;
                };
                let levels = self.http.level_configs().await;
                let assets = self.http.user_assets(user_id).await;
                if envelope.message.is_empty() {
                    if let Some(cfg) = levels.iter().find(|cfg| cfg.level == refreshed.level) {
                        tracing::info!(
                            session = %self.session,
                            tapped = available_tap,
                            progress = refreshed.volume - cfg.cost_down,
                            required = cfg.required_tap(),
                            balance = tap_balance(&assets),
                            "Tapped",
                        );
                    }
                }
            } else if till_tapped == required_tap {
                match self.http.manual_upgrade(user_id).await {
                    Some(envelope) if envelope.is_ok() => {
                        tracing::info!(
                            session = %self.session,
                            from = user_info.level,
                            to = user_info.level + 1,
                            "Level upgraded",
                        );
                    }
                    _ => {
                        tracing::warn!(session = %self.session, "Level upgrade failed");
                    }
                }
            } else if available_tap < TAP_BALANCE_FLOOR && charge.remaining != 0 {
                match self.http.consume_charge(user_id).await {
                    Some(envelope) if envelope.is_charge_ok() => {
                        let remaining = envelope
                            .decode_data::<ChargeState>()
                            .map(|state| state.remaining)
                            .unwrap_or_default();
                        tracing::info!(
                            session = %self.session,
                            remaining,
                            "Used charge booster",
                        );
                    }
                    _ => {
                        tracing::warn!(session = %self.session, "Charge booster not applied");
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }
}

/// Caps a tap request: never more than the random draw, the distance left to the level
/// threshold, or the actual currency balance.
#[must_use]
pub fn tap_amount(draw: i64, remaining_to_threshold: i64, balance: i64) -> i64 {
    draw.min(remaining_to_threshold).min(balance).max(0)
}

/// Draws the pre-tap pacing delay: uniform within 2–6% of the configured tap range,
/// rounded to centiseconds.
pub fn tap_pacing_secs<R: Rng>(tap_min: i64, tap_max: i64, rng: &mut R) -> f64 {
    let range_factor = (tap_max - tap_min).max(0) as f64 / 100.0;
    let secs = rng.gen_range(2.0 * range_factor..=6.0 * range_factor);
    (secs * 100.0).round() / 100.0
}

/// Splits a second count into days/hours/minutes/seconds.
fn split_secs(total_secs: i64) -> (i64, i64, i64, i64) {
    (
        total_secs / 86_400,
        total_secs % 86_400 / 3_600,
        total_secs % 3_600 / 60,
        total_secs % 60,
    )
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(95, 600, 1000, 95)] // draw binds
    #[case(95, 50, 1000, 50)] // distance binds
    #[case(95, 600, 30, 30)] // balance binds
    #[case(95, 0, 1000, 0)] // threshold reached
    #[case(95, -10, 1000, 0)] // never negative
    fn test_tap_amount_bounds(
        #[case] draw: i64,
        #[case] remaining: i64,
        #[case] balance: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(tap_amount(draw, remaining, balance), expected);
    }

    #[rstest]
    fn test_tap_amount_never_exceeds_any_bound() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            let draw = rng.gen_range(0..500);
            let remaining = rng.gen_range(-100..500);
            let balance = rng.gen_range(0..500);
            let amount = tap_amount(draw, remaining, balance);
            assert!(amount <= draw);
            assert!(amount <= remaining.max(0));
            assert!(amount <= balance);
            assert!(amount >= 0);
        }
    }

    #[rstest]
    fn test_tap_amount_capped_by_remaining_distance() {
        // level config {costUp:1000, costDown:400}, volume 900:
        // required=600, till=500, remaining distance=100
        let required_tap = 1000 - 400;
        let till_tapped = 900 - 400;
        let remaining = required_tap - till_tapped;
        assert_eq!(remaining, 100);
        // Draw and balance both exceed the remaining distance
        assert!(tap_amount(95, remaining, 5_000) <= 100);
        assert_eq!(tap_amount(500, remaining, 5_000), 100);
    }

    #[rstest]
    fn test_tap_pacing_within_proportional_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            let secs = tap_pacing_secs(80, 100, &mut rng);
            // 2–6% of a range of 20
            assert!((0.4..=1.2).contains(&secs), "pacing was {secs}");
            let centis = secs * 100.0;
            assert!((centis - centis.round()).abs() < 1e-9);
        }
    }

    #[rstest]
    fn test_tap_pacing_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(tap_pacing_secs(100, 100, &mut rng), 0.0);
    }

    #[rstest]
    #[case(0, (0, 0, 0, 0))]
    #[case(59, (0, 0, 0, 59))]
    #[case(3_661, (0, 1, 1, 1))]
    #[case(90_061, (1, 1, 1, 1))]
    fn test_split_secs(#[case] total: i64, #[case] expected: (i64, i64, i64, i64)) {
        assert_eq!(split_secs(total), expected);
    }
}
