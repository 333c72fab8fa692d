// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::auth::LoginConfig;
use crate::error::Result;
use crate::region::{resolve, Region};

/// Account and transport settings for the connected-drive client.
#[derive(Debug, Clone, clap::Args)]
pub struct DriveConfig {
    /// Account username (email).
    #[arg(long, env = "CONNECTED_DRIVE_USERNAME")]
    pub username: String,

    /// Account password.
    #[arg(long, env = "CONNECTED_DRIVE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Region: `north-america` or `rest-of-world`.
    #[arg(long, default_value = "rest-of-world", env = "CONNECTED_DRIVE_REGION")]
    pub region: String,

    /// hCaptcha token for a full login. Single use.
    #[arg(long, env = "CONNECTED_DRIVE_CAPTCHA_TOKEN", hide_env_values = true)]
    pub captcha_token: Option<String>,

    /// Refresh token from a previous session; tried before a full login.
    #[arg(long, env = "CONNECTED_DRIVE_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Request timeout in seconds. Tokens expire twice this early.
    #[arg(long, default_value_t = 30, env = "CONNECTED_DRIVE_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Emit logs as JSON.
    #[arg(long, env = "CONNECTED_DRIVE_LOG_JSON")]
    pub log_json: bool,
}

impl DriveConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn region(&self) -> Result<Region> {
        self.region.parse()
    }

    pub fn login_config(&self) -> Result<LoginConfig> {
        let mut config =
            LoginConfig::new(&self.username, &self.password, resolve(self.region()?).clone());
        config.timeout = self.timeout();
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
