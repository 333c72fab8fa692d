// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication: bearer-token lifecycle and request decoration.
//!
//! Every API request goes through [`Authenticator::execute`], which makes
//! sure a valid token is attached, and logs in again once if the API answers
//! 401. Login and refresh run under a per-instance lock so concurrent
//! requests share a single exchange.

pub mod credential;
pub mod login;
pub mod oauth;
pub mod pkce;
pub mod refresh;

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::auth::credential::{epoch_secs, AuthState, Credential, StoredTokens};
use crate::error::{raise_for_status, Error, Result, Surface};
use crate::region::RegionConfig;

/// Default transport timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const SESSION_ID_HEADER: &str = "bmw-session-id";

/// Login parameters for one account.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    pub username: String,
    pub password: String,
    pub region: RegionConfig,
    pub timeout: Duration,
}

impl LoginConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>, region: RegionConfig) -> Self {
        Self { username: username.into(), password: password.into(), region, timeout: REQUEST_TIMEOUT }
    }

    /// Tokens are treated as expired this long before the server says so.
    pub fn expiry_margin(&self) -> Duration {
        self.timeout.saturating_mul(2)
    }
}

struct AuthInner {
    credential: Credential,
    /// Single-use; taken by the next full login.
    captcha_token: Option<String>,
}

/// Holds credentials for one account and signs requests with them.
pub struct Authenticator {
    config: LoginConfig,
    /// Client for the auth server. Does not follow redirects.
    http: reqwest::Client,
    inner: Mutex<AuthInner>,
}

impl Authenticator {
    pub fn new(config: LoginConfig) -> Result<Self> {
        Self::with_tokens(config, StoredTokens::default())
    }

    /// Start from tokens persisted by the caller.
    pub fn with_tokens(config: LoginConfig, tokens: StoredTokens) -> Result<Self> {
        crate::install_crypto_provider();
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            config,
            http,
            inner: Mutex::new(AuthInner {
                credential: Credential::restore(tokens),
                captcha_token: None,
            }),
        })
    }

    pub fn region(&self) -> &RegionConfig {
        &self.config.region
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Supply the CAPTCHA token for the next full login.
    pub async fn set_captcha_token(&self, token: impl Into<String>) {
        self.inner.lock().await.captcha_token = Some(token.into());
    }

    pub async fn has_captcha_token(&self) -> bool {
        self.inner.lock().await.captcha_token.is_some()
    }

    /// Snapshot of the current credential, for external persistence.
    pub async fn credential(&self) -> Credential {
        self.inner.lock().await.credential.clone()
    }

    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.credential.state_at(epoch_secs())
    }

    pub async fn gcid(&self) -> Option<String> {
        self.inner.lock().await.credential.gcid.clone()
    }

    /// Obtain a new token: refresh first if possible, full login otherwise.
    pub async fn login(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.login_locked(&mut inner).await
    }

    async fn login_locked(&self, inner: &mut AuthInner) -> Result<()> {
        let mut token = None;
        if let Some(refresh_token) = inner.credential.refresh_token.clone() {
            tracing::debug!("refreshing access token");
            token = refresh::do_refresh(&self.http, &self.config.region, &refresh_token).await;
        }

        let token = match token {
            Some(token) => token,
            None => {
                let captcha = inner.captcha_token.take().ok_or_else(|| {
                    Error::CaptchaRequired(
                        "missing hCaptcha token for login; obtain one and retry".to_owned(),
                    )
                })?;
                tracing::debug!(username = %self.config.username, "starting full login");
                login::do_login(
                    &self.http,
                    &self.config.region,
                    &self.config.username,
                    &self.config.password,
                    &captcha,
                )
                .await?
            }
        };

        inner.credential.apply(token, self.config.expiry_margin().as_secs());
        tracing::debug!(expires_at = ?inner.credential.expires_at, "access token updated");
        Ok(())
    }

    /// Return the current token and session id, logging in if needed.
    async fn ensure_token(&self) -> Result<(String, String)> {
        let mut inner = self.inner.lock().await;
        if !inner.credential.is_valid_at(epoch_secs()) {
            self.login_locked(&mut inner).await?;
        }
        bearer(&inner.credential)
    }

    async fn relogin(&self) -> Result<(String, String)> {
        let mut inner = self.inner.lock().await;
        self.login_locked(&mut inner).await?;
        bearer(&inner.credential)
    }

    /// Sign and send `request` with `client`.
    ///
    /// A 401 triggers one fresh login and one retry. Any other non-2xx, or a
    /// second 401, is returned as a classified error.
    pub async fn execute(
        &self,
        client: &reqwest::Client,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Response> {
        let retry = request.try_clone();

        let (token, session_id) = self.ensure_token().await?;
        decorate(&mut request, &token, &session_id)?;
        let resp = client.execute(request).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return raise_for_status(Surface::Api, resp).await;
        }

        let Some(mut retry) = retry else {
            // Streaming bodies cannot be replayed.
            return raise_for_status(Surface::Api, resp).await;
        };
        tracing::debug!(url = %retry.url(), "received unauthorized response, refreshing token");
        let (token, session_id) = self.relogin().await?;
        decorate(&mut retry, &token, &session_id)?;
        let resp = client.execute(retry).await?;
        raise_for_status(Surface::Api, resp).await
    }
}

fn bearer(credential: &Credential) -> Result<(String, String)> {
    let token = credential
        .access_token
        .clone()
        .ok_or_else(|| Error::api("login completed without an access token"))?;
    Ok((token, credential.session_id.clone()))
}

/// Attach the bearer token and session id.
pub fn decorate(request: &mut reqwest::Request, token: &str, session_id: &str) -> Result<()> {
    let auth = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| Error::api("access token is not a valid header value"))?;
    let session = HeaderValue::from_str(session_id)
        .map_err(|_| Error::api("session id is not a valid header value"))?;
    let headers = request.headers_mut();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(SESSION_ID_HEADER, session);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
