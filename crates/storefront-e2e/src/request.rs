// HTTP request helper
//
// Every API scenario goes through `make_request`: base URL + endpoint,
// caller headers, optional JSON body, 2xx required, JSON body returned.
// A non-2xx status fails the scenario immediately; nothing is retried.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Request headers as supplied by configuration or a scenario.
pub type Headers = BTreeMap<String, String>;

/// Issues a request against `base_url + endpoint` and returns the parsed JSON body.
///
/// # Errors
///
/// - [`Error::UnexpectedStatus`] when the response status is not 2xx
/// - [`Error::InvalidJson`] when the body does not parse as JSON
/// - [`Error::Timeout`] when the client's deadline is exceeded
pub async fn make_request(
    client: &reqwest::Client,
    base_url: &str,
    method: Method,
    endpoint: &str,
    headers: &Headers,
    body: Option<&Value>,
) -> Result<Value> {
    let url = format!("{}{}", base_url, endpoint);
    let response = send(client, method.clone(), &url, to_header_map(headers)?, body).await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(unexpected_status(&method, &url, status, text));
    }

    serde_json::from_str(&text).map_err(|source| Error::InvalidJson { url, source })
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<&Value>,
) -> Result<reqwest::Response> {
    tracing::debug!(%method, url, "sending request");

    let mut request = client.request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.json(body);
    }
    Ok(request.send().await?)
}

fn unexpected_status(method: &Method, url: &str, status: StatusCode, body: String) -> Error {
    Error::UnexpectedStatus {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        body,
    }
}

fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidArgument(format!("header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidArgument(format!("header '{}' value: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// HTTP client bound to the storefront API.
///
/// Holds the injected `reqwest::Client`, the base URL and the default
/// headers from [`ApiConfig`]. Cheap to clone; each scenario should own one.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    headers: Headers,
}

impl ApiClient {
    /// Creates a client with its own `reqwest::Client` and per-call timeout.
    pub fn from_config(config: &ApiConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let client = Self::new(http, config.base_url.clone(), config.headers.clone());
        Ok(match &config.token {
            Some(token) => client.with_bearer_token(token),
            None => client,
        })
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, headers: Headers) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            headers,
        }
    }

    /// Returns a copy that sends `Authorization: Bearer <token>` on every call.
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.headers
            .insert(AUTHORIZATION.as_str().to_string(), format!("Bearer {}", token));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default headers sent with every request
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// [`make_request`] with the client's default headers.
    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        self.make_request_with_headers(method, endpoint, &self.headers, body)
            .await
    }

    /// [`make_request`] with explicit headers instead of the defaults.
    pub async fn make_request_with_headers(
        &self,
        method: Method,
        endpoint: &str,
        headers: &Headers,
        body: Option<&Value>,
    ) -> Result<Value> {
        make_request(&self.http, &self.base_url, method, endpoint, headers, body).await
    }

    /// Sends a request and returns its status without asserting on it.
    pub async fn request_status(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<StatusCode> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = send(&self.http, method, &url, to_header_map(&self.headers)?, body).await?;
        Ok(response.status())
    }

    /// Sends a request and fails unless the status is exactly `expected`.
    pub async fn expect_status(
        &self,
        method: Method,
        endpoint: &str,
        expected: StatusCode,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = send(
            &self.http,
            method.clone(),
            &url,
            to_header_map(&self.headers)?,
            None,
        )
        .await?;

        let status = response.status();
        if status != expected {
            let body = response.text().await.unwrap_or_default();
            return Err(unexpected_status(&method, &url, status, body));
        }
        Ok(())
    }
}
