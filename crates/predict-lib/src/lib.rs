//! Typed client for a hosted multi-modal model prediction API
//!
//! This crate provides:
//! - Request building for text, image, video, audio and multimodal payloads
//! - Model reference parsing and endpoint resolution
//! - Single-attempt dispatch with classified failures
//! - Decoding of concepts, regions, frames and generated media
//! - Model catalog queries
//! - Prometheus metrics and structured logging of every call

pub mod catalog;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod observability;
pub mod reference;
pub mod request;
pub mod response;
mod wire;

pub use catalog::{ModelFilter, ModelInfo, ModelVersionInfo};
pub use client::{ModelHandle, PredictionClient, PredictionClientBuilder};
pub use config::ClientConfig;
pub use dispatch::{HttpTransport, HttpTransportConfig, RawResponse, Transport};
pub use error::{PredictError, Result, TransportFailure};
pub use models::*;
pub use observability::{
    PredictionMetrics, StructuredLogger, CALL_CATALOG, CALL_PREDICT, OUTCOME_SUCCESS,
};
pub use reference::{Endpoint, EndpointResolver, ModelIds, ModelReference, VersionPin};
pub use request::{
    ConceptSelector, InferenceParams, Modality, OutputConfig, ParamValue, PayloadOrigin,
    PredictRequest, PredictionInput, RequestBuilder,
};
pub use wire::STATUS_SUCCESS;
