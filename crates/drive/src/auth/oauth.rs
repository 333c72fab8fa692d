// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth wire types and helpers shared by login and refresh.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const REDIRECT_URI: &str = "com.bmw.connected://oauth";
pub const NONCE: &str = "login_nonce";

/// Token endpoint response. Every field is optional on the wire; callers
/// decide which absences are fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// A token set accepted from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    pub gcid: Option<String>,
    /// Epoch seconds at which the token request was sent.
    pub issued_at: u64,
}

impl TokenResponse {
    /// Accept the response if it carries an access token and its lifetime.
    pub fn into_issued(self, issued_at: u64) -> Option<IssuedToken> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let expires_in = self.expires_in?;
        Some(IssuedToken {
            access_token,
            refresh_token: self.refresh_token,
            expires_in,
            gcid: self.gcid,
            issued_at,
        })
    }
}

/// Resolve `target` against `base` and read query parameter `key`.
///
/// `target` may be absolute (including custom schemes) or relative.
pub fn query_param(base: &str, target: &str, key: &str) -> Result<Option<String>> {
    let base = Url::parse(base).map_err(|e| Error::Configuration(format!("bad base url: {e}")))?;
    let url = base.join(target).map_err(|e| Error::api(format!("bad redirect {target}: {e}")))?;
    Ok(url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned()))
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
