//! Normalizes caller payloads into a single request shape

use super::{
    InferenceParams, Modality, OutputConfig, Payload, PayloadOrigin, PredictionInput,
};
use crate::error::{PredictError, Result};
use std::path::{Path, PathBuf};
use url::Url;

/// A validated, fully-specified prediction request
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    input: PredictionInput,
    output_config: OutputConfig,
    params: InferenceParams,
}

impl PredictRequest {
    pub fn builder(modality: Modality) -> RequestBuilder {
        RequestBuilder::new(modality)
    }

    pub fn input(&self) -> &PredictionInput {
        &self.input
    }

    pub fn modality(&self) -> Modality {
        self.input.modality()
    }

    pub fn payload_origin(&self) -> &PayloadOrigin {
        self.input.payload().origin()
    }

    pub fn output_config(&self) -> &OutputConfig {
        &self.output_config
    }

    pub fn params(&self) -> &InferenceParams {
        &self.params
    }
}

/// Builder for [`PredictRequest`]
///
/// Exactly one of [`bytes`](Self::bytes), [`file_path`](Self::file_path) or
/// [`url`](Self::url) must be set. Files are read in full by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    modality: Modality,
    bytes: Option<Vec<u8>>,
    file_path: Option<PathBuf>,
    url: Option<String>,
    prompt: Option<String>,
    output_config: OutputConfig,
    params: InferenceParams,
}

impl RequestBuilder {
    pub fn new(modality: Modality) -> Self {
        Self {
            modality,
            bytes: None,
            file_path: None,
            url: None,
            prompt: None,
            output_config: OutputConfig::default(),
            params: InferenceParams::default(),
        }
    }

    /// Start from a textual input type such as `"image"`
    pub fn for_input_type(input_type: &str) -> Result<Self> {
        Ok(Self::new(input_type.parse()?))
    }

    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.bytes = Some(bytes.into());
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Text accompanying the image of a multimodal input
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn output_config(mut self, config: OutputConfig) -> Self {
        self.output_config = config;
        self
    }

    pub fn params(mut self, params: InferenceParams) -> Self {
        self.params = params;
        self
    }

    pub fn build(self) -> Result<PredictRequest> {
        self.output_config.validate(self.modality)?;

        let payload = match (self.bytes, self.file_path, self.url) {
            (Some(bytes), None, None) => Payload::inline(PayloadOrigin::Bytes, bytes),
            (None, Some(path), None) => {
                let bytes = read_payload_file(&path)?;
                Payload::inline(PayloadOrigin::FilePath(path), bytes)
            }
            (None, None, Some(raw)) => Payload::remote(parse_payload_url(&raw)?),
            (None, None, None) => {
                return Err(PredictError::invalid_input(
                    "no payload source given; set one of bytes, file path or URL",
                ))
            }
            _ => {
                return Err(PredictError::invalid_input(
                    "more than one payload source given; set exactly one of bytes, file path or URL",
                ))
            }
        };

        let input = match (self.modality, self.prompt) {
            (Modality::Multimodal, Some(prompt)) => {
                if prompt.trim().is_empty() {
                    return Err(PredictError::invalid_input(
                        "multimodal prompt must not be empty",
                    ));
                }
                PredictionInput::Multimodal {
                    image: payload,
                    prompt,
                }
            }
            (Modality::Multimodal, None) => {
                return Err(PredictError::invalid_input(
                    "multimodal input requires a text prompt",
                ))
            }
            (modality, Some(_)) => {
                return Err(PredictError::invalid_input(format!(
                    "a prompt only applies to multimodal input, not {}",
                    modality
                )))
            }
            (Modality::Text, None) => {
                ensure_text(&payload)?;
                PredictionInput::Text(payload)
            }
            (Modality::Image, None) => PredictionInput::Image(payload),
            (Modality::Video, None) => PredictionInput::Video(payload),
            (Modality::Audio, None) => PredictionInput::Audio(payload),
        };

        Ok(PredictRequest {
            input,
            output_config: self.output_config,
            params: self.params,
        })
    }
}

fn read_payload_file(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(PredictError::invalid_input(format!(
            "payload file {} does not exist or is not a regular file",
            path.display()
        )));
    }
    std::fs::read(path).map_err(|e| {
        PredictError::invalid_input(format!(
            "failed to read payload file {}: {}",
            path.display(),
            e
        ))
    })
}

fn parse_payload_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| PredictError::invalid_input(format!("invalid payload URL '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PredictError::invalid_input(format!(
            "payload URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    Ok(url)
}

/// Inline text payloads are sent as raw strings and must be UTF-8
fn ensure_text(payload: &Payload) -> Result<()> {
    if let super::PayloadContent::Inline(bytes) = payload.content() {
        std::str::from_utf8(bytes)
            .map_err(|e| PredictError::invalid_input(format!("text payload is not UTF-8: {}", e)))?;
    }
    Ok(())
}
