// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive login: authorization code + PKCE against the regional auth server.
//!
//! Three exchanges, in order:
//! 1. credentials + challenge + CAPTCHA token to `/oauth/authenticate`,
//!    answered with JSON `redirect_to` carrying an `authorization` value;
//! 2. that `authorization` back to `/oauth/authenticate`, answered with a
//!    `Location` redirect carrying `code`;
//! 3. `code` + verifier to `/oauth/token`.

use reqwest::header::{AUTHORIZATION, LOCATION};
use serde::Deserialize;

use crate::auth::credential::epoch_secs;
use crate::auth::oauth::{query_param, IssuedToken, TokenResponse, NONCE, REDIRECT_URI};
use crate::auth::pkce::{compute_code_challenge, generate_code_verifier};
use crate::error::{raise_for_status, Error, Result, Surface};
use crate::region::{RegionConfig, OAUTH_SCOPE};

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    #[serde(default)]
    redirect_to: Option<String>,
}

/// Run the full login. `captcha_token` has already been taken from the
/// authenticator and is spent whatever the outcome.
pub async fn do_login(
    client: &reqwest::Client,
    region: &RegionConfig,
    username: &str,
    password: &str,
    captcha_token: &str,
) -> Result<IssuedToken> {
    let code_verifier = generate_code_verifier();
    let code_challenge = compute_code_challenge(&code_verifier);
    let auth_url = region.authenticate_url();

    let base: [(&str, &str); 8] = [
        ("client_id", region.client_id.as_str()),
        ("response_type", "code"),
        ("scope", OAUTH_SCOPE),
        ("redirect_uri", REDIRECT_URI),
        ("state", region.oauth_state.as_str()),
        ("nonce", NONCE),
        ("code_challenge_method", "S256"),
        ("code_challenge", code_challenge.as_str()),
    ];

    // Step 1: credentials.
    let mut form = base.to_vec();
    form.extend([
        ("grant_type", "authorization_code"),
        ("username", username),
        ("password", password),
    ]);
    let resp = client
        .post(&auth_url)
        .header("hcaptchatoken", captcha_token)
        .form(&form)
        .send()
        .await?;
    let resp = raise_for_status(Surface::Auth, resp).await?;
    let body: AuthenticateResponse =
        resp.json().await.map_err(|e| Error::api(format!("authenticate response: {e}")))?;
    let redirect_to = body
        .redirect_to
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::api("authorization redirect missing in authenticate response"))?;
    let authorization = query_param(&region.auth_base_uri, &redirect_to, "authorization")?
        .ok_or_else(|| Error::api("authorization code missing in authenticate redirect"))?;
    tracing::debug!("login step 1 accepted");

    // Step 2: authorization -> code.
    let mut form = base.to_vec();
    form.push(("authorization", authorization.as_str()));
    let resp = client.post(&auth_url).form(&form).send().await?;
    let resp = raise_for_status(Surface::Auth, resp).await?;
    let location = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::api("authorization code redirect missing"))?
        .to_owned();
    let code = query_param(&region.auth_base_uri, &location, "code")?
        .ok_or_else(|| Error::api("authorization code not found in redirect"))?;
    tracing::debug!("login step 2 accepted");

    // Step 3: code -> tokens.
    let issued_at = epoch_secs();
    let resp = client
        .post(region.token_url())
        .header(AUTHORIZATION, &region.token_basic_auth_header)
        .form(&[
            ("code", code.as_str()),
            ("code_verifier", code_verifier.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;
    let resp = raise_for_status(Surface::Auth, resp).await?;
    let token: TokenResponse =
        resp.json().await.map_err(|e| Error::api(format!("token response: {e}")))?;
    token
        .into_issued(issued_at)
        .ok_or_else(|| Error::api("access token or expires_in missing in token response"))
}
