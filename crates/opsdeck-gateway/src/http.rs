//! reqwest-backed gateway implementation
//!
//! One client, one base URL, one timeout. Response interception lives
//! here: non-success statuses and decode failures become [`GatewayError`]
//! before any payload reaches the store.

use crate::error::GatewayError;
use crate::{ApiGateway, Method};
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::time::Duration;

/// Default request timeout, matching the backend's expectations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Production gateway over a shared [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway against `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a gateway with an explicit request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Connect(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn builder(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
        }
    }

    fn normalize(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if err.is_builder() || err.is_request() {
            GatewayError::InvalidUrl(err.to_string())
        } else {
            GatewayError::Connect(err.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let mut builder = self.builder(method, &url);
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(Self::normalize)?;
        let response = Self::check_status(response).await?;

        // Command acks and persists answer with an empty body; map that to
        // Null rather than failing the decode.
        let text = response.text().await.map_err(Self::normalize)?;
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn request_bytes(&self, method: Method, path: &str) -> Result<Bytes, GatewayError> {
        let url = self.url(path);
        tracing::debug!("{} {} (binary)", method, url);

        let response = self
            .builder(method, &url)
            .send()
            .await
            .map_err(Self::normalize)?;
        let response = Self::check_status(response).await?;
        response.bytes().await.map_err(Self::normalize)
    }
}
