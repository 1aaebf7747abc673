use super::{RawResponse, Transport};
use crate::error::{PredictError, Result};
use crate::reference::Endpoint;
use crate::request::PredictRequest;
use crate::wire::{PostModelOutputsBody, StatusEnvelope};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sends a built request to a resolved endpoint
#[derive(Clone)]
pub struct PredictionDispatcher {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for PredictionDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionDispatcher").finish_non_exhaustive()
    }
}

impl PredictionDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Make one call and return the body of an accepted response
    ///
    /// `timeout` overrides the transport default for this call only.
    pub async fn dispatch(
        &self,
        endpoint: &Endpoint,
        request: &PredictRequest,
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(&PostModelOutputsBody::from(request)).map_err(|e| {
            PredictError::invalid_input(format!("request cannot be encoded: {}", e))
        })?;

        debug!(
            url = %endpoint.outputs_url(),
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "Dispatching prediction"
        );

        let raw = self
            .transport
            .post_json(endpoint.outputs_url(), body, timeout)
            .await?;
        classify(raw)
    }
}

/// Separate accepted responses from ones the service rejected
///
/// A non-2xx status is always a rejection. A 2xx body whose envelope
/// carries a non-success code is also a rejection. Anything else is handed
/// on unchanged, including bodies that are not JSON.
pub(crate) fn classify(raw: RawResponse) -> Result<Vec<u8>> {
    let envelope = serde_json::from_slice::<StatusEnvelope>(&raw.body).ok();
    let status = envelope.and_then(|e| e.status);

    if raw.is_success() {
        match status {
            Some(status) if !status.is_success() => Err(PredictError::RemoteRequest {
                http_status: raw.status,
                code: status.code,
                description: status
                    .description
                    .unwrap_or_else(|| "request rejected".to_string()),
                details: status.details,
            }),
            _ => Ok(raw.body),
        }
    } else {
        let status = status.unwrap_or_default();
        let description = status.description.unwrap_or_else(|| {
            let snippet = String::from_utf8_lossy(&raw.body);
            let snippet = snippet.trim();
            if snippet.is_empty() {
                format!("HTTP {}", raw.status)
            } else {
                snippet.chars().take(200).collect()
            }
        });
        Err(PredictError::RemoteRequest {
            http_status: raw.status,
            code: status.code,
            description,
            details: status.details,
        })
    }
}
