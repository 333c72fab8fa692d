// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy and HTTP status classification.

use std::fmt;

use crate::remote::Service;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the connected-drive client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown region or otherwise invalid static configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Full login needs a CAPTCHA token that has not been supplied.
    #[error("captcha required: {0}")]
    CaptchaRequired(String),

    #[error("authentication failed ({status}): {body}")]
    AuthenticationFailed { status: u16, body: String },

    #[error("rate limited ({status}): {body}")]
    RateLimited { status: u16, body: String },

    /// Generic API failure. `status` is absent when the response was
    /// well-formed HTTP but missing an expected field.
    #[error("api error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Api { status: Option<u16>, message: String },

    /// Remote service not available in this operating mode.
    #[error("remote service '{0}' is not available")]
    UnsupportedService(Service),

    /// The vehicle does not report the capability for this remote service.
    #[error("vehicle does not support remote service '{0}'")]
    NotSupportedByVehicle(Service),

    #[error("vehicle not found: {0}")]
    VehicleNotFound(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl Error {
    pub(crate) fn api(message: impl Into<String>) -> Self {
        Self::Api { status: None, message: message.into() }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. } | Self::RateLimited { status, .. } => {
                Some(*status)
            }
            Self::Api { status, .. } => *status,
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Which side of the protocol produced a failed response.
///
/// Credential rejections only count as [`Error::AuthenticationFailed`] on the
/// auth server; on the API a 401 is a plain [`Error::Api`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Auth,
    Api,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "AUTH",
            Self::Api => "API",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a non-2xx status and its body to an [`Error`].
pub fn classify(surface: Surface, status: u16, body: &str) -> Error {
    let body = body.to_owned();
    if status == 429 {
        return Error::RateLimited { status, body };
    }
    if body.to_ascii_lowercase().contains("captcha") {
        return Error::CaptchaRequired(format!("{surface} rejected request ({status}): {body}"));
    }
    match (surface, status) {
        (Surface::Auth, 400 | 401 | 403) => Error::AuthenticationFailed { status, body },
        _ => Error::Api { status: Some(status), message: body },
    }
}

/// What to do with a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Raise,
    /// Log at warn and continue; the caller has a local fallback.
    Swallow,
}

/// Classify a failure and either return it or log and drop it.
pub fn handle_failure(surface: Surface, status: u16, body: &str, on: OnFailure) -> Result<()> {
    let err = classify(surface, status, body);
    match on {
        OnFailure::Raise => Err(err),
        OnFailure::Swallow => {
            tracing::warn!(surface = %surface, status, err = %err, "request failed, continuing");
            Ok(())
        }
    }
}

fn passes(surface: Surface, status: reqwest::StatusCode) -> bool {
    // The auth server answers with redirects that carry the next step.
    status.is_success() || (surface == Surface::Auth && status.is_redirection())
}

/// Pass a successful response through; classify a failed one.
///
/// Returns `Ok(None)` only when the failure was swallowed.
pub(crate) async fn check_response(
    surface: Surface,
    resp: reqwest::Response,
    on: OnFailure,
) -> Result<Option<reqwest::Response>> {
    if passes(surface, resp.status()) {
        return Ok(Some(resp));
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    handle_failure(surface, status, &body, on)?;
    Ok(None)
}

/// Pass a successful response through; return the classified error otherwise.
pub(crate) async fn raise_for_status(
    surface: Surface,
    resp: reqwest::Response,
) -> Result<reqwest::Response> {
    if passes(surface, resp.status()) {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(classify(surface, status, &body))
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
