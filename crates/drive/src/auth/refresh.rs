// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Refresh-token exchange.

use crate::auth::credential::epoch_secs;
use crate::auth::oauth::{IssuedToken, TokenResponse, REDIRECT_URI};
use crate::error::{check_response, OnFailure, Surface};
use crate::region::RegionConfig;

/// Exchange a refresh token for a new token set.
///
/// Every failure yields `None`; the caller falls back to a full login.
pub async fn do_refresh(
    client: &reqwest::Client,
    region: &RegionConfig,
    refresh_token: &str,
) -> Option<IssuedToken> {
    let issued_at = epoch_secs();
    let resp = client
        .post(region.token_url())
        .header(reqwest::header::AUTHORIZATION, &region.token_basic_auth_header)
        .form(&[
            ("redirect_uri", REDIRECT_URI),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await;

    let resp = match resp {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!(err = %e, "refresh request failed");
            return None;
        }
    };

    let resp = check_response(Surface::Auth, resp, OnFailure::Swallow).await.ok().flatten()?;
    let token = match resp.json::<TokenResponse>().await {
        Ok(token) => token.into_issued(issued_at),
        Err(e) => {
            tracing::debug!(err = %e, "refresh response unreadable");
            return None;
        }
    };
    if token.is_none() {
        tracing::debug!("refresh response missing access token or expires_in");
    }
    token
}
