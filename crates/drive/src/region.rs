// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-region endpoint and OAuth client parameters.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// OAuth scope requested by the login flow.
pub const OAUTH_SCOPE: &str = "openid profile email offline_access smacc vehicle_data perseus \
                               dlm svds cesim vsapi remote_services fupo authenticate_user";

/// Android build string reported in `x-user-agent`.
pub const X_USER_AGENT_BUILD: &str = "SP1A.210812.016.C1";

/// Regions of the world with separate servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NorthAmerica,
    RestOfWorld,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::NorthAmerica, Region::RestOfWorld];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "north-america",
            Self::RestOfWorld => "rest-of-world",
        }
    }

    /// Short code used by the manufacturer (`na` / `row`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "na",
            Self::RestOfWorld => "row",
        }
    }

    pub fn config(&self) -> &'static RegionConfig {
        resolve(*self)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = Error;

    /// Case-insensitive; accepts the long name, the short code, or the
    /// underscore spelling (`rest_of_world`).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        Region::ALL.into_iter().find(|r| name == r.as_str() || name == r.code()).ok_or_else(|| {
            Error::Configuration(format!(
                "unknown region {s}. Valid regions are: {}",
                valid_regions().join(",")
            ))
        })
    }
}

/// Names accepted by [`Region::from_str`].
pub fn valid_regions() -> Vec<&'static str> {
    Region::ALL.iter().map(Region::as_str).collect()
}

/// Immutable connection parameters for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    /// Base of the OAuth endpoints (`/oauth/authenticate`, `/oauth/token`).
    pub auth_base_uri: String,
    /// Base of the vehicle API.
    pub api_base_uri: String,
    pub client_id: String,
    /// Fixed OAuth `state` value the auth server expects.
    pub oauth_state: String,
    /// `Authorization` header value for the token endpoint.
    pub token_basic_auth_header: String,
    /// Region tag embedded in `x-user-agent`.
    pub user_agent_region: String,
    pub user_agent: String,
    pub app_version: String,
}

impl RegionConfig {
    pub fn authenticate_url(&self) -> String {
        format!("{}/oauth/authenticate", self.auth_base_uri)
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_base_uri)
    }

    /// `x-user-agent` header value for `brand`.
    pub fn x_user_agent(&self, brand: &str) -> String {
        format!(
            "android({X_USER_AGENT_BUILD});{brand};{};{}",
            self.app_version, self.user_agent_region
        )
    }
}

static NORTH_AMERICA: LazyLock<RegionConfig> = LazyLock::new(|| RegionConfig {
    auth_base_uri: "https://login.bmwusa.com/gcdm".to_owned(),
    api_base_uri: "https://cocoapi.bmwgroup.us".to_owned(),
    client_id: "54394a4b-b6c1-45fe-b7b2-8fd3aa9253aa".to_owned(),
    oauth_state: "rgastJbZsMtup49-Lp0FMQ".to_owned(),
    token_basic_auth_header: "Basic NTQzOTRhNGItYjZjMS00NWZlLWI3YjItOGZkM2FhOTI1M2FhOmQ5MmYzMWMwLWY1NzktNDRmNS1hNzdkLTk2NmY4ZjAwZTM1MQ==".to_owned(),
    user_agent_region: "na".to_owned(),
    user_agent: "Dart/3.3 (dart:io)".to_owned(),
    app_version: "4.9.2(36892)".to_owned(),
});

static REST_OF_WORLD: LazyLock<RegionConfig> = LazyLock::new(|| RegionConfig {
    auth_base_uri: "https://customer.bmwgroup.com/gcdm".to_owned(),
    api_base_uri: "https://cocoapi.bmwgroup.com".to_owned(),
    client_id: "31c357a0-7a1d-4590-aa99-33b97244d048".to_owned(),
    oauth_state: "cEG9eLAIi6Nv-aaCAniziE_B6FPoobva3qr5gukilYw".to_owned(),
    token_basic_auth_header: "Basic MzFjMzU3YTAtN2ExZC00NTkwLWFhOTktMzNiOTcyNDRkMDQ4OmMwZTMzOTNkLTcwYTItNGY2Zi05ZDNjLTg1MzBhZjY0ZDU1Mg==".to_owned(),
    user_agent_region: "row".to_owned(),
    user_agent: "Dart/3.3 (dart:io)".to_owned(),
    app_version: "4.9.2(36892)".to_owned(),
});

/// Look up the configuration for a region.
pub fn resolve(region: Region) -> &'static RegionConfig {
    match region {
        Region::NorthAmerica => &NORTH_AMERICA,
        Region::RestOfWorld => &REST_OF_WORLD,
    }
}

/// Look up a region configuration by name.
pub fn resolve_name(name: &str) -> Result<&'static RegionConfig> {
    name.parse::<Region>().map(resolve)
}

#[cfg(test)]
#[path = "region_tests.rs"]
mod tests;
