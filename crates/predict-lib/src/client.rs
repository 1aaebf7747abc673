//! Prediction client façade
//!
//! [`PredictionClient`] wires the endpoint resolver, the dispatcher and the
//! response decoder together. It holds only immutable configuration and a
//! pooled HTTP handle, so one client can serve concurrent calls.

use crate::catalog::{self, ModelFilter, ModelInfo};
use crate::config::ClientConfig;
use crate::dispatch::{
    classify, HttpTransport, HttpTransportConfig, PredictionDispatcher, Transport,
};
use crate::error::{PredictError, Result};
use crate::models::PredictionResult;
use crate::observability::{
    PredictionMetrics, StructuredLogger, CALL_CATALOG, CALL_PREDICT, OUTCOME_SUCCESS,
};
use crate::reference::{EndpointResolver, ModelReference, DEFAULT_API_BASE};
use crate::request::{InferenceParams, OutputConfig, PredictRequest, RequestBuilder};
use crate::response;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Builder for [`PredictionClient`]
pub struct PredictionClientBuilder {
    api_base: String,
    pat: Option<String>,
    request_timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for PredictionClientBuilder {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            pat: None,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
            transport: None,
        }
    }
}

impl PredictionClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a loaded [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            pat: config.pat.clone(),
            request_timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
            user_agent: Some(config.user_agent.clone()),
            transport: None,
        }
    }

    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Personal access token. Required unless a transport is supplied.
    pub fn pat(mut self, pat: impl Into<String>) -> Self {
        self.pat = Some(pat.into());
        self
    }

    /// Default timeout for every call made by the client
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the HTTP transport, e.g. with a test double
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PredictionClient> {
        let resolver = EndpointResolver::new(&self.api_base)?;

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(PredictError::invalid_input("timeouts must be greater than zero"));
        }

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let pat = self
                    .pat
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| PredictError::invalid_input("a personal access token is required"))?;
                let mut config = HttpTransportConfig::new(pat);
                config.request_timeout = self.request_timeout;
                config.connect_timeout = self.connect_timeout;
                if let Some(user_agent) = self.user_agent {
                    config.user_agent = user_agent;
                }
                Arc::new(HttpTransport::new(config)?)
            }
        };

        let logger = StructuredLogger::new(resolver.api_base().host_str().unwrap_or("unknown"));

        Ok(PredictionClient {
            resolver,
            dispatcher: PredictionDispatcher::new(transport),
            metrics: PredictionMetrics::new(),
            logger,
        })
    }
}

/// Entry point for predictions and catalog lookups
#[derive(Debug, Clone)]
pub struct PredictionClient {
    resolver: EndpointResolver,
    dispatcher: PredictionDispatcher,
    metrics: PredictionMetrics,
    logger: StructuredLogger,
}

impl PredictionClient {
    pub fn builder() -> PredictionClientBuilder {
        PredictionClientBuilder::new()
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Run one prediction with the client's default timeout
    pub async fn predict(
        &self,
        reference: &ModelReference,
        request: &PredictRequest,
    ) -> Result<PredictionResult> {
        self.predict_inner(reference, request, None).await
    }

    /// Run one prediction, overriding the default timeout for this call
    pub async fn predict_with_timeout(
        &self,
        reference: &ModelReference,
        request: &PredictRequest,
        timeout: Duration,
    ) -> Result<PredictionResult> {
        if timeout.is_zero() {
            return Err(PredictError::invalid_input("timeout must be greater than zero"));
        }
        self.predict_inner(reference, request, Some(timeout)).await
    }

    async fn predict_inner(
        &self,
        reference: &ModelReference,
        request: &PredictRequest,
        timeout: Option<Duration>,
    ) -> Result<PredictionResult> {
        let started = Instant::now();
        let model = reference.to_string();

        let outcome: Result<PredictionResult> = async {
            let endpoint = self.resolver.resolve(reference)?;
            self.logger.log_prediction_requested(
                &model,
                request.modality().as_str(),
                request.payload_origin().label(),
            );
            let body = self.dispatcher.dispatch(&endpoint, request, timeout).await?;
            response::decode(&body)
        }
        .await;

        let elapsed = started.elapsed();
        match &outcome {
            Ok(result) => {
                self.metrics.record(CALL_PREDICT, OUTCOME_SUCCESS, elapsed);
                self.logger
                    .log_prediction_completed(&model, result.kind().as_str(), elapsed);
            }
            Err(err) => {
                self.metrics.record(CALL_PREDICT, err.kind(), elapsed);
                self.logger.log_prediction_failed(
                    &model,
                    err.kind(),
                    &err.to_string(),
                    err.is_retryable(),
                );
            }
        }
        outcome
    }

    /// Handle bound to one model for repeated predictions
    pub fn model(&self, reference: ModelReference) -> ModelHandle<'_> {
        ModelHandle {
            client: self,
            reference,
            output_config: OutputConfig::default(),
            params: InferenceParams::default(),
            timeout: None,
        }
    }

    /// Search the model catalog
    pub async fn list_models(&self, filter: &ModelFilter) -> Result<Vec<ModelInfo>> {
        let started = Instant::now();
        let description = filter.describe();

        let outcome: Result<Vec<ModelInfo>> = async {
            filter.validate()?;
            let url = catalog::list_url(&self.resolver, filter)?;
            let raw = self.dispatcher.transport().get(&url, None).await?;
            catalog::decode_model_list(&classify(raw)?)
        }
        .await;

        self.record_catalog(&description, &outcome, started.elapsed());
        outcome
    }

    /// Fetch one model, pinned to a version when the reference carries one
    pub async fn get_model(&self, reference: &ModelReference) -> Result<ModelInfo> {
        let started = Instant::now();
        let description = reference.to_string();

        let outcome: Result<ModelInfo> = async {
            let endpoint = self.resolver.resolve(reference)?;
            let raw = self
                .dispatcher
                .transport()
                .get(endpoint.model_url(), None)
                .await?;
            catalog::decode_model(&classify(raw)?)
        }
        .await;

        self.record_catalog(&description, &outcome, started.elapsed());
        outcome
    }

    fn record_catalog<T: CatalogCount>(&self, query: &str, outcome: &Result<T>, elapsed: Duration) {
        match outcome {
            Ok(found) => {
                self.metrics.record(CALL_CATALOG, OUTCOME_SUCCESS, elapsed);
                self.logger.log_catalog_queried(query, found.count(), elapsed);
            }
            Err(err) => {
                self.metrics.record(CALL_CATALOG, err.kind(), elapsed);
                self.logger
                    .log_catalog_failed(query, err.kind(), &err.to_string(), err.is_retryable());
            }
        }
    }
}

trait CatalogCount {
    fn count(&self) -> usize;
}

impl CatalogCount for Vec<ModelInfo> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl CatalogCount for ModelInfo {
    fn count(&self) -> usize {
        1
    }
}

/// A model bound to a client, with output settings shared by every call
///
/// ```no_run
/// # async fn run(client: predict_lib::PredictionClient) -> predict_lib::Result<()> {
/// use predict_lib::{ModelReference, OutputConfig};
///
/// let model = client
///     .model(ModelReference::from_url(
///         "https://clarifai.com/clarifai/main/models/general-image-recognition",
///     ))
///     .with_output_config(OutputConfig::new().min_value(0.95));
/// let result = model
///     .predict_by_url("https://samples.clarifai.com/metro-north.jpg", "image")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ModelHandle<'a> {
    client: &'a PredictionClient,
    reference: ModelReference,
    output_config: OutputConfig,
    params: InferenceParams,
    timeout: Option<Duration>,
}

impl<'a> ModelHandle<'a> {
    pub fn reference(&self) -> &ModelReference {
        &self.reference
    }

    pub fn with_output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = config;
        self
    }

    pub fn with_params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Predict on a payload the service fetches itself
    pub async fn predict_by_url(&self, url: &str, input_type: &str) -> Result<PredictionResult> {
        let request = self.builder(input_type)?.url(url).build()?;
        self.predict(&request).await
    }

    /// Predict on in-memory bytes
    pub async fn predict_by_bytes(
        &self,
        bytes: impl Into<Vec<u8>>,
        input_type: &str,
    ) -> Result<PredictionResult> {
        let request = self.builder(input_type)?.bytes(bytes).build()?;
        self.predict(&request).await
    }

    /// Predict on the contents of a local file
    pub async fn predict_by_filepath(
        &self,
        path: impl Into<PathBuf>,
        input_type: &str,
    ) -> Result<PredictionResult> {
        let request = self.builder(input_type)?.file_path(path).build()?;
        self.predict(&request).await
    }

    /// Predict with a request built elsewhere
    ///
    /// The request's own output config and params are used as-is.
    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictionResult> {
        match self.timeout {
            Some(timeout) => {
                self.client
                    .predict_with_timeout(&self.reference, request, timeout)
                    .await
            }
            None => self.client.predict(&self.reference, request).await,
        }
    }

    fn builder(&self, input_type: &str) -> Result<RequestBuilder> {
        Ok(RequestBuilder::for_input_type(input_type)?
            .output_config(self.output_config.clone())
            .params(self.params.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pat_required_without_transport() {
        let result = PredictionClient::builder().build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));

        let result = PredictionClient::builder().pat("   ").build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_api_base() {
        let result = PredictionClient::builder()
            .api_base("not a url")
            .pat("pat")
            .build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_from_config() {
        let config = ClientConfig {
            api_base: "http://localhost:9000/api".to_string(),
            pat: Some("secret".to_string()),
            ..ClientConfig::default()
        };
        let client = PredictionClientBuilder::from_config(&config).build().unwrap();
        assert_eq!(client.resolver().api_base().as_str(), "http://localhost:9000/api");
    }

    #[test]
    fn test_client_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PredictionClient>();
    }

    #[tokio::test]
    async fn test_handle_rejects_unknown_input_type() {
        let client = PredictionClient::builder().pat("pat").build().unwrap();
        let result = client
            .model(ModelReference::from_ids("clarifai", "main", "general"))
            .predict_by_url("https://samples.clarifai.com/dog.jpg", "hologram")
            .await;
        assert!(matches!(result, Err(PredictError::UnsupportedModality(_))));
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let client = PredictionClient::builder().pat("pat").build().unwrap();
        let request = RequestBuilder::new(crate::request::Modality::Text)
            .bytes("hello")
            .build()
            .unwrap();
        let result = client
            .predict_with_timeout(
                &ModelReference::from_ids("clarifai", "main", "general"),
                &request,
                Duration::ZERO,
            )
            .await;
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }
}
