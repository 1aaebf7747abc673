//! Request building
//!
//! This module provides:
//! - Modality tags and payload sources (bytes, file path, URL)
//! - Output configuration with validated fields
//! - Open-ended inference hyperparameters
//! - A builder that turns all of the above into one [`PredictRequest`]

mod builder;
mod input;
mod output_config;

#[cfg(test)]
mod tests;

pub use builder::{PredictRequest, RequestBuilder};
pub use input::{Modality, Payload, PayloadContent, PayloadOrigin, PredictionInput};
pub use output_config::{
    ConceptSelector, InferenceParams, OutputConfig, ParamValue, DEFAULT_MAX_CONCEPTS,
};
