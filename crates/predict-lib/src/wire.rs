//! JSON shapes exchanged with the prediction API
//!
//! Request types only serialize and response types only deserialize.
//! The service omits zero-valued scalars and empty collections, so
//! response fields default rather than fail when absent.

use crate::request::{
    ConceptSelector, InferenceParams, OutputConfig, PayloadContent, PredictRequest,
    PredictionInput,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Status code the service uses for a fully successful call
pub const STATUS_SUCCESS: u32 = 10000;

// Request side

#[derive(Debug, Serialize)]
pub(crate) struct PostModelOutputsBody<'a> {
    pub inputs: Vec<WireInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<WireModelOverride<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireInput {
    pub data: WireInputData,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct WireInputData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<WireText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<WireMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<WireMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<WireMedia>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct WireText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct WireMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireModelOverride<'a> {
    pub model_version: WireModelVersionOverride<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireModelVersionOverride<'a> {
    pub output_info: WireOutputInfo<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireOutputInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_config: Option<WireOutputConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a InferenceParams>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireOutputConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_ms: Option<u32>,
    #[serde(skip_serializing_if = "no_selectors")]
    pub select_concepts: &'a [ConceptSelector],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concepts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f32>,
}

fn no_selectors(selectors: &&[ConceptSelector]) -> bool {
    selectors.is_empty()
}

impl<'a> From<&'a OutputConfig> for WireOutputConfig<'a> {
    fn from(config: &'a OutputConfig) -> Self {
        Self {
            sample_ms: config.sample_ms,
            select_concepts: &config.select_concepts,
            max_concepts: config.max_concepts,
            min_value: config.min_value,
        }
    }
}

fn media(content: &PayloadContent) -> WireMedia {
    match content {
        PayloadContent::Inline(bytes) => WireMedia {
            base64: Some(STANDARD.encode(bytes)),
            url: None,
        },
        PayloadContent::Remote(url) => WireMedia {
            base64: None,
            url: Some(url.to_string()),
        },
    }
}

fn text(content: &PayloadContent) -> WireText {
    match content {
        PayloadContent::Inline(bytes) => WireText {
            // UTF-8 is checked when the request is built
            raw: Some(String::from_utf8_lossy(bytes).into_owned()),
            url: None,
        },
        PayloadContent::Remote(url) => WireText {
            raw: None,
            url: Some(url.to_string()),
        },
    }
}

impl<'a> From<&'a PredictRequest> for PostModelOutputsBody<'a> {
    fn from(request: &'a PredictRequest) -> Self {
        let mut data = WireInputData::default();
        match request.input() {
            PredictionInput::Text(p) => data.text = Some(text(p.content())),
            PredictionInput::Image(p) => data.image = Some(media(p.content())),
            PredictionInput::Video(p) => data.video = Some(media(p.content())),
            PredictionInput::Audio(p) => data.audio = Some(media(p.content())),
            PredictionInput::Multimodal { image, prompt } => {
                data.image = Some(media(image.content()));
                data.text = Some(WireText {
                    raw: Some(prompt.clone()),
                    url: None,
                });
            }
        }

        let output_config = (!request.output_config().is_empty())
            .then(|| WireOutputConfig::from(request.output_config()));
        let params = (!request.params().is_empty()).then(|| request.params());

        let model = (output_config.is_some() || params.is_some()).then(|| WireModelOverride {
            model_version: WireModelVersionOverride {
                output_info: WireOutputInfo {
                    output_config,
                    params,
                },
            },
        });

        Self {
            inputs: vec![WireInput { data }],
            model,
        }
    }
}

// Response side

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireStatus {
    pub code: Option<u32>,
    pub description: Option<String>,
    pub details: Option<String>,
}

impl WireStatus {
    pub fn is_success(&self) -> bool {
        self.code.map(|c| c == STATUS_SUCCESS).unwrap_or(true)
    }
}

/// Only the status of a response, read before the body is decoded
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusEnvelope {
    pub status: Option<WireStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MultiOutputResponse {
    pub status: Option<WireStatus>,
    pub outputs: Option<Vec<WireOutput>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireOutput {
    pub status: Option<WireStatus>,
    pub data: Option<WireOutputData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireOutputData {
    pub concepts: Option<Vec<WireConcept>>,
    pub regions: Option<Vec<WireRegion>>,
    pub frames: Option<Vec<WireFrame>>,
    pub text: Option<WireTextOut>,
    pub image: Option<WireImageOut>,
    pub audio: Option<WireImageOut>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireConcept {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub value: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRegion {
    pub id: Option<String>,
    pub region_info: Option<WireRegionInfo>,
    pub data: Option<WireConceptData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRegionInfo {
    pub bounding_box: Option<WireBoundingBox>,
    pub mask: Option<WireMask>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireBoundingBox {
    pub top_row: f32,
    pub left_col: f32,
    pub bottom_row: f32,
    pub right_col: f32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMask {
    pub image: Option<WireImageOut>,
}

/// `data` object nested in regions and frames
#[derive(Debug, Deserialize)]
pub(crate) struct WireConceptData {
    pub concepts: Option<Vec<WireConcept>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFrame {
    pub frame_info: Option<WireFrameInfo>,
    pub data: Option<WireConceptData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WireFrameInfo {
    pub index: u32,
    /// Milliseconds from the start of the video
    pub time: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireTextOut {
    pub raw: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireImageOut {
    pub base64: Option<String>,
    pub url: Option<String>,
}

// Catalog

#[derive(Debug, Deserialize)]
pub(crate) struct MultiModelResponse {
    pub status: Option<WireStatus>,
    #[serde(default)]
    pub models: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SingleModelResponse {
    pub status: Option<WireStatus>,
    pub model: Option<WireModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub app_id: Option<String>,
    pub model_type_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub model_version: Option<WireModelVersion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireModelVersion {
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub output_info: Option<WireModelOutputInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireModelOutputInfo {
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}
