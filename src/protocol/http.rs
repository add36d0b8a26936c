// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for remote climate devices.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, ProtocolError, WriteError};

/// HTTP client bound to one remote API base URL.
///
/// Resources are addressed by a path relative to the base URL. Reads decode
/// a JSON body; writes send a JSON body and only look at the status code.
///
/// Cloning is cheap and shares the underlying connection pool.
///
/// # Examples
///
/// ```no_run
/// use thermobridge::protocol::HttpClient;
/// use thermobridge::state::TargetState;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new("http://localhost:8000/api/v1")?;
/// let state: TargetState = client.get_json("state").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a new client for the given base URL with the default timeout.
    ///
    /// A missing scheme defaults to `http://`.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is empty or the HTTP client cannot be
    /// created.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProtocolError> {
        HttpClientBuilder::new().base_url(base_url).build()
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL of a resource path.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Reads a resource and decodes its JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails, the status is not a
    /// success, or the body does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url_for(path);

        tracing::debug!(url = %url, "Fetching remote state");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Request {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Request {
            url: url.clone(),
            message: e.to_string(),
        })?;

        tracing::trace!(url = %url, body = %body, "Received remote state");

        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// Sends a JSON body to a resource.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] if the body cannot be encoded, the request
    /// fails, or the status is not a success.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), WriteError> {
        let url = self.url_for(path);
        let payload = serde_json::to_vec(body)?;

        tracing::debug!(url = %url, "Posting remote update");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|source| WriteError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WriteError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// Percent-encodes a device identifier for use as a path segment.
#[must_use]
pub fn path_segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

/// Builder for creating an HTTP client with custom configuration.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is missing or empty, or client creation
    /// fails.
    pub fn build(self) -> Result<HttpClient, ProtocolError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ProtocolError::InvalidAddress("base URL is required".to_string()))?;

        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "base URL is empty".to_string(),
            ));
        }

        let base_url = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(HttpClient::DEFAULT_TIMEOUT))
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(HttpClient { base_url, client })
    }
}
