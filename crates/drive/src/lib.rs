// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connected-drive: client for the vehicle manufacturer's cloud API.
//!
//! Logs in with OAuth authorization code + PKCE (a CAPTCHA token is required
//! for a full login), keeps the bearer token fresh, reads vehicle state and
//! triggers remote services.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod region;
pub mod remote;
pub mod vehicle;

use std::sync::Arc;

pub use crate::auth::credential::{AuthState, Credential, StoredTokens};
pub use crate::auth::{Authenticator, LoginConfig};
pub use crate::error::{Error, Result};
pub use crate::region::{Region, RegionConfig};
pub use crate::remote::{ExecutionState, RemoteServiceStatus, Service};
pub use crate::vehicle::{Account, Vehicle};

use crate::config::DriveConfig;

/// Install the process-wide rustls crypto provider. Idempotent.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Build an account from CLI/env configuration.
pub async fn connect(config: &DriveConfig) -> Result<Account> {
    let tokens =
        StoredTokens { refresh_token: config.refresh_token.clone(), ..StoredTokens::default() };
    let auth = Arc::new(Authenticator::with_tokens(config.login_config()?, tokens)?);
    if let Some(ref token) = config.captcha_token {
        auth.set_captcha_token(token.clone()).await;
    }
    tracing::info!(region = %config.region, "connected-drive client ready");
    Account::new(auth)
}
