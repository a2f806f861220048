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

//! Common components shared across the HTTP and WebSocket layers.

pub mod consts;
pub mod credential;
pub mod enums;

/// Returns the current wall-clock time as milliseconds since the UNIX epoch.
#[must_use]
pub fn epoch_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Extracts the Chromium major version embedded in a browser user agent string.
///
/// Used to keep the `sec-ch-ua` client-hint header consistent with the configured
/// user agent.
#[must_use]
pub fn chrome_major_version(user_agent: &str) -> Option<&str> {
    let (_, rest) = user_agent.split_once("Chrome/")?;
    let version = rest.split(['.', ' ']).next()?;
    if version.is_empty() || !version.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(version)
}

/// Builds the `sec-ch-ua` header value matching the given Chromium major version.
#[must_use]
pub fn sec_ch_ua(chrome_major: &str) -> String {
    format!(
        "\"Chromium\";v=\"{chrome_major}\", \"Android WebView\";v=\"{chrome_major}\", \"Not?A_Brand\";v=\"24\""
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Mozilla/5.0 (Linux; Android 12) Chrome/128.0.6613.40 Mobile", Some("128"))]
    #[case("Mozilla/5.0 (Linux; Android 12) Chrome/99 Mobile", Some("99"))]
    #[case("Mozilla/5.0 (Linux; Android 12) Gecko/20100101", None)]
    #[case("Chrome/", None)]
    fn test_chrome_major_version(#[case] ua: &str, #[case] expected: Option<&str>) {
        assert_eq!(chrome_major_version(ua), expected);
    }

    #[rstest]
    fn test_sec_ch_ua_embeds_version() {
        let value = sec_ch_ua("128");
        assert!(value.contains("\"Chromium\";v=\"128\""));
        assert!(value.contains("\"Android WebView\";v=\"128\""));
    }

    #[rstest]
    fn test_epoch_millis_is_monotonic_enough() {
        let a = epoch_millis();
        let b = epoch_millis();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000); // after 2020
    }
}
