//! Outbound calls to the prediction service
//!
//! The [`Transport`] trait is the only place network I/O happens. The
//! dispatcher makes exactly one attempt per call and classifies the
//! outcome; it never retries.

mod dispatcher;
mod http;

pub use dispatcher::PredictionDispatcher;
pub use http::{HttpTransport, HttpTransportConfig};

pub(crate) use dispatcher::classify;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Status line and body of an HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One request, one response
///
/// Implementations report failures below HTTP as
/// [`PredictError::Transport`](crate::PredictError::Transport) and return
/// every HTTP response, whatever its status, as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST an encoded JSON body. `timeout` overrides the transport default.
    async fn post_json(
        &self,
        url: &Url,
        body: Vec<u8>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse>;

    /// GET a resource. `timeout` overrides the transport default.
    async fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<RawResponse>;
}
