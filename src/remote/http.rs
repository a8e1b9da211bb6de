// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP/JSON implementation of [`RemoteClient`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

use crate::error::RemoteError;
use crate::remote::{DeviceInfo, OperationArg, RawStatus, RemoteClient};

// ============================================================================
// HttpRemoteConfig
// ============================================================================

/// Configuration for an [`HttpRemoteClient`].
///
/// # Examples
///
/// ```
/// use heatlink::remote::HttpRemoteConfig;
/// use std::time::Duration;
///
/// let config = HttpRemoteConfig::new("https://gateway.local/api")
///     .with_token("secret")
///     .with_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://gateway.local/api");
/// ```
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpRemoteConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the given base URL.
    ///
    /// A missing scheme defaults to `http://`. Trailing slashes are removed.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let base_url = if base_url.starts_with("http://") || base_url.starts_with("https://") {
            base_url
        } else {
            format!("http://{base_url}")
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bearer token, if set.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`HttpRemoteClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<HttpRemoteClient, RemoteError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(RemoteError::Http)?;

        Ok(HttpRemoteClient {
            client,
            base_url: self.base_url,
            token: self.token,
            timeout: self.timeout,
        })
    }
}

// ============================================================================
// HttpRemoteClient
// ============================================================================

/// Client for a REST gateway in front of the device-control service.
///
/// | call | request |
/// |---|---|
/// | `list_devices` | `GET {base}/devices` |
/// | `fetch_status` | `GET {base}/devices/{id}/status` |
/// | `invoke` | `POST {base}/devices/{id}/operations/{op}` with `{"args": [...]}` |
///
/// 404, 405 and 501 responses are reported as
/// [`RemoteError::Unsupported`], 401 and 403 as
/// [`RemoteError::AuthenticationFailed`].
///
/// # Examples
///
/// ```no_run
/// use heatlink::remote::{HttpRemoteConfig, RemoteClient};
///
/// # async fn example() -> Result<(), heatlink::RemoteError> {
/// let client = HttpRemoteConfig::new("192.168.1.20:8080").into_client()?;
/// let devices = client.list_devices().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpRemoteClient {
    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn device_url(&self, device_id: &str) -> String {
        format!("{}/devices/{}", self.base_url, urlencoding::encode(device_id))
    }

    fn operation_url(&self, device_id: &str, operation: &str) -> String {
        format!(
            "{}/operations/{}",
            self.device_url(device_id),
            urlencoding::encode(operation)
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, RemoteError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(response, what)
    }

    async fn read_json(&self, response: Response) -> Result<Value, RemoteError> {
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| RemoteError::InvalidPayload(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> RemoteError {
        if err.is_timeout() {
            RemoteError::timeout(self.timeout)
        } else if err.is_connect() {
            RemoteError::ConnectionFailed(err.to_string())
        } else {
            RemoteError::Http(err)
        }
    }
}

fn check_status(response: Response, what: &str) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            Err(RemoteError::Unsupported(what.to_string()))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::AuthenticationFailed),
        _ => Err(RemoteError::Rejected(format!(
            "{what}: HTTP {} - {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        ))),
    }
}

impl RemoteClient for HttpRemoteClient {
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>, RemoteError> {
        let url = format!("{}/devices", self.base_url);
        tracing::debug!(url = %url, "Listing devices");

        let response = self.send(self.client.get(&url), "list_devices").await?;
        let body = self.read_json(response).await?;
        serde_json::from_value(body).map_err(|e| RemoteError::InvalidPayload(e.to_string()))
    }

    async fn fetch_status(&self, device: &DeviceInfo) -> Result<RawStatus, RemoteError> {
        let url = format!("{}/status", self.device_url(&device.id));
        tracing::debug!(device_id = %device.id, url = %url, "Fetching status");

        let response = self.send(self.client.get(&url), "fetch_status").await?;
        Ok(RawStatus::Document(self.read_json(response).await?))
    }

    async fn invoke(
        &self,
        device: &DeviceInfo,
        operation: &str,
        args: &[OperationArg],
    ) -> Result<(), RemoteError> {
        let url = self.operation_url(&device.id, operation);
        tracing::debug!(device_id = %device.id, operation, url = %url, "Invoking operation");

        let request = self.client.post(&url).json(&json!({ "args": args }));
        self.send(request, operation).await?;
        Ok(())
    }
}
