// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential state held by an [`Authenticator`](crate::auth::Authenticator).

use serde::{Deserialize, Serialize};

use crate::auth::oauth::IssuedToken;

/// Tokens and identifiers for one authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as epoch seconds, already reduced by the safety margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcid: Option<String>,
}

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
    /// Token held but past its (margin-adjusted) expiry.
    Expired,
}

/// Tokens restored from a caller's own storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<u64>,
    pub gcid: Option<String>,
}

impl Credential {
    pub fn new() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_at: None,
            session_id: uuid::Uuid::new_v4().to_string(),
            gcid: None,
        }
    }

    pub fn restore(tokens: StoredTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_at: tokens.expires_at,
            gcid: tokens.gcid,
            ..Self::new()
        }
    }

    pub fn state_at(&self, now: u64) -> AuthState {
        match (&self.access_token, self.expires_at) {
            (None, _) => AuthState::Unauthenticated,
            (Some(_), Some(expires_at)) if now < expires_at => AuthState::Authenticated,
            (Some(_), _) => AuthState::Expired,
        }
    }

    pub fn is_valid_at(&self, now: u64) -> bool {
        self.state_at(now) == AuthState::Authenticated
    }

    /// Store a freshly issued token, pulling the expiry in by `margin_secs`.
    ///
    /// A refresh response that omits `refresh_token` or `gcid` keeps the
    /// previous value.
    pub fn apply(&mut self, token: IssuedToken, margin_secs: u64) {
        let expires_at = token.issued_at.saturating_add(token.expires_in);
        self.access_token = Some(token.access_token);
        self.expires_at = Some(expires_at.saturating_sub(margin_secs));
        if token.refresh_token.is_some() {
            self.refresh_token = token.refresh_token;
        }
        if token.gcid.is_some() {
            self.gcid = token.gcid;
        }
    }

    pub fn stored_tokens(&self) -> StoredTokens {
        StoredTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_at: self.expires_at,
            gcid: self.gcid.clone(),
        }
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::new()
    }
}

/// Return current epoch seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
