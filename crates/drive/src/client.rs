// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the vehicle API of one region.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::auth::Authenticator;
use crate::error::{Error, Result};

/// Sends authenticated requests to the regional API base.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    auth: Arc<Authenticator>,
}

impl ApiClient {
    pub fn new(auth: Arc<Authenticator>, brand: &str) -> Result<Self> {
        let region = auth.region();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&region.user_agent)?);
        headers.insert("x-user-agent", header_value(&region.x_user_agent(brand))?);

        crate::install_crypto_provider();
        let client = reqwest::Client::builder()
            .timeout(auth.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self { base_url: region.api_base_uri.trim_end_matches('/').to_owned(), client, auth })
    }

    pub fn authenticator(&self) -> &Arc<Authenticator> {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: &[(&'static str, &str)],
    ) -> Result<T> {
        let mut req = self.client.get(self.url(path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let resp = self.auth.execute(&self.client, req.build()?).await?;
        Ok(resp.json().await?)
    }

    /// POST JSON to an API endpoint and return the response body.
    ///
    /// `brand` replaces the client-wide brand in `x-user-agent`.
    pub async fn post_json(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
        brand: &str,
    ) -> Result<serde_json::Value> {
        let x_user_agent = self.auth.region().x_user_agent(&brand.to_ascii_lowercase());
        let req = self
            .client
            .post(self.url(path))
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("x-user-agent", header_value(&x_user_agent)?)
            .json(body)
            .build()?;
        let resp = self.auth.execute(&self.client, req).await?;
        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| Error::api(format!("unreadable response: {e}")))
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::Configuration(format!("invalid header value {value:?}")))
}
