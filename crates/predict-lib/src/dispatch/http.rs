//! reqwest-backed [`Transport`]

use super::{RawResponse, Transport};
use crate::error::{PredictError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Settings for [`HttpTransport`]
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Personal access token sent as `Authorization: Key <pat>`
    pub pat: String,
    /// Default whole-request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl HttpTransportConfig {
    pub fn new(pat: impl Into<String>) -> Self {
        Self {
            pat: pat.into(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("predict-lib/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// HTTP transport holding a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Key {}", config.pat)).map_err(|_| {
            PredictError::invalid_input("personal access token contains characters not allowed in a header")
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| PredictError::invalid_input(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let request = match timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(status = status, body_bytes = body.len(), "HTTP response received");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send(request, timeout).await
    }

    async fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<RawResponse> {
        self.send(self.client.get(url.clone()), timeout).await
    }
}
