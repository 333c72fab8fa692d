// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake manufacturer API for integration tests.
//!
//! Serves the OAuth and vehicle endpoints from an axum router on an
//! ephemeral port and counts hits per route.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use connected_drive::{Account, Authenticator, LoginConfig, Region, RegionConfig, StoredTokens};

pub const USERNAME: &str = "driver@example.com";
pub const PASSWORD: &str = "hunter2";
pub const VIN: &str = "WBA00000000000001";

/// Per-route hit counters.
#[derive(Debug, Default)]
pub struct Hits {
    pub authenticate: AtomicU32,
    pub authorize: AtomicU32,
    pub token_code: AtomicU32,
    pub token_refresh: AtomicU32,
    pub vehicles: AtomicU32,
    pub state: AtomicU32,
    pub remote: AtomicU32,
    pub charging: AtomicU32,
}

impl Hits {
    pub fn api_total(&self) -> u32 {
        self.vehicles.load(Ordering::SeqCst)
            + self.state.load(Ordering::SeqCst)
            + self.remote.load(Ordering::SeqCst)
            + self.charging.load(Ordering::SeqCst)
    }

    pub fn auth_total(&self) -> u32 {
        self.authenticate.load(Ordering::SeqCst)
            + self.authorize.load(Ordering::SeqCst)
            + self.token_code.load(Ordering::SeqCst)
            + self.token_refresh.load(Ordering::SeqCst)
    }
}

pub fn count(c: &AtomicU32) -> u32 {
    c.load(Ordering::SeqCst)
}

/// Behaviour knobs and recorded traffic.
pub struct FakeState {
    pub hits: Hits,
    pub refresh_ok: AtomicBool,
    pub authorize_fails: AtomicBool,
    pub token_fails: AtomicBool,
    /// Leave `expires_in` out of refresh-grant replies.
    pub refresh_omits_expiry: AtomicBool,
    /// Leave `expires_in` out of code-grant replies.
    pub code_omits_expiry: AtomicBool,
    /// Answer this many API requests with 401 regardless of the token.
    pub force_unauthorized: AtomicU32,
    /// When non-zero, answer API requests with this status.
    pub api_fail_status: AtomicU16,
    issued: AtomicU32,
    current_token: Mutex<Option<String>>,
    challenge: Mutex<Option<String>>,
    pub captcha_tokens: Mutex<Vec<String>>,
    pub session_ids: Mutex<Vec<String>>,
    pub user_agents: Mutex<Vec<String>>,
    pub remote_bodies: Mutex<Vec<serde_json::Value>>,
    pub vehicle_state: Mutex<serde_json::Value>,
    pub capabilities: Mutex<serde_json::Value>,
    pub vehicle_brand: Mutex<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            hits: Hits::default(),
            refresh_ok: AtomicBool::new(true),
            authorize_fails: AtomicBool::new(false),
            token_fails: AtomicBool::new(false),
            refresh_omits_expiry: AtomicBool::new(false),
            code_omits_expiry: AtomicBool::new(false),
            force_unauthorized: AtomicU32::new(0),
            api_fail_status: AtomicU16::new(0),
            issued: AtomicU32::new(0),
            current_token: Mutex::new(None),
            challenge: Mutex::new(None),
            captcha_tokens: Mutex::new(Vec::new()),
            session_ids: Mutex::new(Vec::new()),
            user_agents: Mutex::new(Vec::new()),
            remote_bodies: Mutex::new(Vec::new()),
            vehicle_state: Mutex::new(serde_json::json!({})),
            capabilities: Mutex::new(serde_json::json!({})),
            vehicle_brand: Mutex::new("BMW".to_owned()),
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl FakeState {
    pub fn set_vehicle(&self, state: serde_json::Value, capabilities: serde_json::Value) {
        *lock(&self.vehicle_state) = state;
        *lock(&self.capabilities) = capabilities;
    }

    pub fn captcha_tokens(&self) -> Vec<String> {
        lock(&self.captcha_tokens).clone()
    }

    pub fn session_ids(&self) -> Vec<String> {
        lock(&self.session_ids).clone()
    }

    pub fn user_agents(&self) -> Vec<String> {
        lock(&self.user_agents).clone()
    }

    pub fn remote_bodies(&self) -> Vec<serde_json::Value> {
        lock(&self.remote_bodies).clone()
    }

    pub fn set_brand(&self, brand: &str) {
        *lock(&self.vehicle_brand) = brand.to_owned();
    }

    fn issue_token(&self, omit_expiry: bool) -> serde_json::Value {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        *lock(&self.current_token) = Some(access.clone());
        if omit_expiry {
            return serde_json::json!({
                "access_token": access,
                "refresh_token": format!("refresh-{n}"),
            });
        }
        serde_json::json!({
            "access_token": access,
            "refresh_token": format!("refresh-{n}"),
            "expires_in": 3599,
            "gcid": "gcid-1",
            "token_type": "Bearer",
        })
    }
}

type Shared = Arc<FakeState>;

fn error(status: StatusCode, body: &str) -> Response {
    (status, body.to_owned()).into_response()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned)
}

async fn authenticate(
    State(s): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if let Some(authorization) = form.get("authorization") {
        s.hits.authorize.fetch_add(1, Ordering::SeqCst);
        if s.authorize_fails.load(Ordering::SeqCst) || authorization != "authz-1" {
            return error(StatusCode::INTERNAL_SERVER_ERROR, "authorize exploded");
        }
        return (
            StatusCode::FOUND,
            [(header::LOCATION, "com.bmw.connected://oauth?code=code-1&state=s")],
        )
            .into_response();
    }

    s.hits.authenticate.fetch_add(1, Ordering::SeqCst);
    let Some(captcha) = header_str(&headers, "hcaptchatoken") else {
        return error(StatusCode::BAD_REQUEST, r#"{"error":"hCaptcha token missing"}"#);
    };
    lock(&s.captcha_tokens).push(captcha);
    if form.get("username").map(String::as_str) != Some(USERNAME)
        || form.get("password").map(String::as_str) != Some(PASSWORD)
    {
        return error(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_credentials"}"#);
    }
    if form.get("code_challenge_method").map(String::as_str) != Some("S256") {
        return error(StatusCode::BAD_REQUEST, "unsupported challenge method");
    }
    *lock(&s.challenge) = form.get("code_challenge").cloned();
    Json(serde_json::json!({
        "redirect_to": "com.bmw.connected://oauth?authorization=authz-1&state=s"
    }))
    .into_response()
}

async fn token(
    State(s): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let basic = header_str(&headers, "authorization").unwrap_or_default();
    if !basic.starts_with("Basic ") {
        return error(StatusCode::UNAUTHORIZED, "client credentials missing");
    }
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => {
            s.hits.token_code.fetch_add(1, Ordering::SeqCst);
            if s.token_fails.load(Ordering::SeqCst) {
                return error(StatusCode::INTERNAL_SERVER_ERROR, "token exploded");
            }
            let verifier = form.get("code_verifier").cloned().unwrap_or_default();
            let expected = lock(&s.challenge).clone();
            let actual = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
            if form.get("code").map(String::as_str) != Some("code-1")
                || expected.as_deref() != Some(actual.as_str())
            {
                return error(StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#);
            }
            Json(s.issue_token(s.code_omits_expiry.load(Ordering::SeqCst))).into_response()
        }
        Some("refresh_token") => {
            s.hits.token_refresh.fetch_add(1, Ordering::SeqCst);
            if !s.refresh_ok.load(Ordering::SeqCst) {
                return error(StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#);
            }
            Json(s.issue_token(s.refresh_omits_expiry.load(Ordering::SeqCst))).into_response()
        }
        _ => error(StatusCode::BAD_REQUEST, "unsupported grant"),
    }
}

/// Check the API headers. Returns the rejection to send, if any.
fn authorize_api(s: &FakeState, headers: &HeaderMap) -> Option<Response> {
    if let Some(session) = header_str(headers, "bmw-session-id") {
        lock(&s.session_ids).push(session);
    }
    if let Some(ua) = header_str(headers, "x-user-agent") {
        lock(&s.user_agents).push(ua);
    }
    let forced = s
        .force_unauthorized
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    let expected = lock(&s.current_token).clone().map(|t| format!("Bearer {t}"));
    if forced || expected.is_none() || header_str(headers, "authorization") != expected {
        return Some(error(StatusCode::UNAUTHORIZED, r#"{"error":"token expired"}"#));
    }
    let status = s.api_fail_status.load(Ordering::SeqCst);
    if status != 0 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Some(error(code, "upstream failure"));
    }
    None
}

async fn vehicles(State(s): State<Shared>, headers: HeaderMap) -> Response {
    s.hits.vehicles.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = authorize_api(&s, &headers) {
        return rejection;
    }
    let brand = lock(&s.vehicle_brand).clone();
    Json(serde_json::json!([
        { "vin": VIN, "attributes": { "brand": brand, "model": "i4 eDrive40" } }
    ]))
    .into_response()
}

async fn vehicle_state(State(s): State<Shared>, headers: HeaderMap) -> Response {
    s.hits.state.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = authorize_api(&s, &headers) {
        return rejection;
    }
    if header_str(&headers, "bmw-vin").as_deref() != Some(VIN) {
        return error(StatusCode::NOT_FOUND, "unknown vin");
    }
    Json(serde_json::json!({
        "state": lock(&s.vehicle_state).clone(),
        "capabilities": lock(&s.capabilities).clone(),
    }))
    .into_response()
}

async fn remote_command(
    State(s): State<Shared>,
    Path((_vin, _service)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    s.hits.remote.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = authorize_api(&s, &headers) {
        return rejection;
    }
    lock(&s.remote_bodies).push(body);
    Json(serde_json::json!({ "eventId": "evt-1" })).into_response()
}

async fn charging_command(
    State(s): State<Shared>,
    Path((_vin, _service)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    s.hits.charging.fetch_add(1, Ordering::SeqCst);
    if let Some(rejection) = authorize_api(&s, &headers) {
        return rejection;
    }
    lock(&s.remote_bodies).push(body);
    StatusCode::OK.into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/gcdm/oauth/authenticate", post(authenticate))
        .route("/gcdm/oauth/token", post(token))
        .route("/eadrax-vcs/v4/vehicles", get(vehicles))
        .route("/eadrax-vcs/v4/vehicles/state", get(vehicle_state))
        .route("/eadrax-vrccs/v3/presentation/remote-commands/{vin}/{service}", post(remote_command))
        .route("/eadrax-crccs/v1/vehicles/{vin}/{service}", post(charging_command))
        .with_state(state)
}

/// A running fake server.
pub struct Fake {
    pub state: Arc<FakeState>,
    pub base_url: String,
}

impl Fake {
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(FakeState::default());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { state, base_url: format!("http://{addr}") })
    }

    pub fn region(&self) -> RegionConfig {
        let mut region = Region::RestOfWorld.config().clone();
        region.auth_base_uri = format!("{}/gcdm", self.base_url);
        region.api_base_uri = self.base_url.clone();
        region
    }

    pub fn login_config(&self) -> LoginConfig {
        LoginConfig::new(USERNAME, PASSWORD, self.region())
    }

    pub fn authenticator(&self) -> anyhow::Result<Arc<Authenticator>> {
        Ok(Arc::new(Authenticator::new(self.login_config())?))
    }

    pub fn authenticator_with_refresh(&self, refresh: &str) -> anyhow::Result<Arc<Authenticator>> {
        let tokens = StoredTokens { refresh_token: Some(refresh.to_owned()), ..Default::default() };
        Ok(Arc::new(Authenticator::with_tokens(self.login_config(), tokens)?))
    }

    /// Account whose authenticator already holds a CAPTCHA token.
    pub async fn account(&self) -> anyhow::Result<Account> {
        let auth = self.authenticator()?;
        auth.set_captcha_token("captcha-1").await;
        Ok(Account::new(auth)?)
    }
}
