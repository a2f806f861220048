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

//! Identity bridge contract and mini-app token handling.
//!
//! The messaging-platform client that performs the actual handshake lives outside this
//! crate; here is only its contract, the token canonicalization, and the referral
//! selection applied at session start.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rand::Rng;

/// Ordered field list a canonical web-app token must carry.
const TOKEN_FIELDS: [&str; 7] = [
    "user",
    "chat_instance",
    "chat_type",
    "start_param",
    "auth_date",
    "signature",
    "hash",
];

/// Characters percent-encoded when re-encoding the `user` field (everything except
/// unreserved characters and `/`).
const USER_FIELD_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Outcome of the identity handshake.
///
/// Every failure variant is terminal for the run; the outer scheduler decides whether
/// to retry later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Handshake succeeded; carries the bearer token.
    Authorized(String),
    /// The platform account has been deactivated.
    Deactivated,
    /// The platform account has been banned.
    Banned,
    /// The platform account is restricted.
    Restricted(String),
    /// The stored session credentials are no longer valid.
    Unauthorized,
    /// Anything else that prevented the handshake.
    Unknown(String),
}

/// Contract for the messaging-platform client producing mini-app tokens.
#[async_trait]
pub trait IdentityBridge: Send + Sync {
    /// Performs the mini-app handshake with the given referral start parameter and
    /// returns the token outcome.
    async fn web_app_token(&self, session: &str, start_param: &str) -> AuthOutcome;
}

/// Rebuilds the canonical bearer token from a raw (URL-decoded) `tgWebAppData` string.
///
/// Splits the `&`-joined `key=value` pairs, URL-decodes each value, then re-joins the
/// required fields in their fixed order, percent-re-encoding only the `user` payload.
/// Returns `None` when any required field is missing.
#[must_use]
pub fn canonical_web_app_token(raw: &str) -> Option<String> {
    let mut fields: Vec<(&str, String)> = Vec::new();
    for pair in raw.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            let decoded = percent_decode_str(value).decode_utf8().ok()?;
            fields.push((key, decoded.into_owned()));
        }
    }

    let lookup = |key: &str| {
        fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
    };

    let mut parts = Vec::with_capacity(TOKEN_FIELDS.len());
    for key in TOKEN_FIELDS {
        let value = lookup(key)?;
        let value = if key == "user" {
            utf8_percent_encode(&value, USER_FIELD_ENCODE_SET).to_string()
        } else {
            value
        };
        parts.push(format!("{key}={value}"));
    }
    Some(parts.join("&"))
}

/// Chooses the referral code for this session: the configured default with 70% weight,
/// the dynamic code with 30%.
///
/// Takes the random source as an argument so tests can seed it.
pub fn choose_referral<'a, R: Rng>(default_code: &'a str, dynamic_code: &'a str, rng: &mut R) -> &'a str {
    if rng.gen_range(0..100) < 70 {
        default_code
    } else {
        dynamic_code
    }
}

/// Extracts the numeric id following the `inviteId` prefix of a referral code.
///
/// Codes without the prefix pass through unchanged.
#[must_use]
pub fn invite_digits(code: &str) -> &str {
    match code.split_once("inviteId") {
        Some((_, digits)) => digits,
        None => code,
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rstest::rstest;

    use super::*;

    const RAW: &str = "user=%7B%22id%22%3A42%2C%22first_name%22%3A%22Ada%22%7D\
        &chat_instance=-1234567890\
        &chat_type=sender\
        &start_param=10512928\
        &auth_date=1700000000\
        &signature=sigvalue\
        &hash=abcdef";

    #[rstest]
    fn test_canonical_token_field_order_and_user_reencoding() {
        let token = canonical_web_app_token(RAW).unwrap();
        let keys: Vec<&str> = token
            .split('&')
            .map(|pair| pair.split_once('=').unwrap().0)
            .collect();
        assert_eq!(keys, TOKEN_FIELDS.to_vec());
        // The user payload stays percent-encoded; the rest is decoded
        assert!(token.contains("user=%7B%22id%22%3A42"));
        assert!(token.contains("chat_instance=-1234567890"));
        assert!(token.ends_with("hash=abcdef"));
    }

    #[rstest]
    fn test_canonical_token_missing_field_is_none() {
        let raw = "user=%7B%7D&chat_type=sender&auth_date=1&signature=s&hash=h";
        assert!(canonical_web_app_token(raw).is_none());
    }

    #[rstest]
    fn test_choose_referral_is_reproducible_with_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(
                choose_referral("inviteId1", "inviteId2", &mut a),
                choose_referral("inviteId1", "inviteId2", &mut b),
            );
        }
    }

    #[rstest]
    fn test_choose_referral_weighting() {
        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;
        let defaults = (0..draws)
            .filter(|_| choose_referral("a", "b", &mut rng) == "a")
            .count();
        let share = defaults as f64 / draws as f64;
        assert!((0.65..0.75).contains(&share), "share was {share}");
    }

    #[rstest]
    #[case("inviteId10512928", "10512928")]
    #[case("10512928", "10512928")]
    #[case("inviteId", "")]
    fn test_invite_digits(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(invite_digits(code), expected);
    }
}
