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

//! Application credential handling and request signing.

use std::fmt::Debug;

use aws_lc_rs::hmac;
use ustr::Ustr;
use zeroize::ZeroizeOnDrop;

/// Application credential for signing Vanilla API requests.
///
/// Uses HMAC SHA256 over the request query string concatenated with the raw JSON body,
/// hexadecimal encoded. The signature is recomputed per request: the query string must
/// carry a fresh `timestamp` parameter, so two requests never share a signature even
/// for identical payloads.
#[derive(Clone, ZeroizeOnDrop)]
pub struct Credential {
    #[zeroize(skip)]
    pub app_id: Ustr,
    app_secret: Box<[u8]>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Credential))
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

impl Credential {
    /// Creates a new [`Credential`] instance.
    #[must_use]
    pub fn new(app_id: String, app_secret: String) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into_bytes().into_boxed_slice(),
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    /// Signs the query string and optional JSON body, returning a lowercase hex digest.
    ///
    /// The query string must already contain the `timestamp` parameter; signing without
    /// it is a caller error.
    #[must_use]
    pub fn sign(&self, query: &str, body: Option<&[u8]>) -> String {
        debug_assert!(
            query.contains("timestamp="),
            "query string must carry a timestamp parameter before signing"
        );
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.app_secret);
        let mut ctx = hmac::Context::with_key(&key);
        ctx.update(query.as_bytes());
        if let Some(body) = body {
            ctx.update(body);
        }
        hex::encode(ctx.sign().as_ref())
    }
}
