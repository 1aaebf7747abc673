//! Core data models for prediction results

use serde::{Serialize, Serializer};

/// A named label with its confidence score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Concept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Confidence in [0, 1]
    pub value: f32,
}

impl Concept {
    pub fn new(name: impl Into<String>, value: f32) -> Self {
        Self {
            id: None,
            name: name.into(),
            value,
        }
    }

    /// Copy of this concept with the confidence rounded to `places` decimals
    pub fn rounded(&self, places: u32) -> Self {
        Self {
            value: round_to(self.value, places),
            ..self.clone()
        }
    }
}

/// Normalized bounding box, each coordinate in [0, 1] relative to the image
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BoundingBox {
    pub top_row: f32,
    pub left_col: f32,
    pub bottom_row: f32,
    pub right_col: f32,
}

/// Bounding box scaled to pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl BoundingBox {
    pub fn new(top_row: f32, left_col: f32, bottom_row: f32, right_col: f32) -> Self {
        Self {
            top_row,
            left_col,
            bottom_row,
            right_col,
        }
    }

    pub fn rounded(&self, places: u32) -> Self {
        Self {
            top_row: round_to(self.top_row, places),
            left_col: round_to(self.left_col, places),
            bottom_row: round_to(self.bottom_row, places),
            right_col: round_to(self.right_col, places),
        }
    }

    /// Scale to an image of `width` x `height` pixels
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelRect {
        let scale = |v: f32, extent: u32| (v.clamp(0.0, 1.0) * extent as f32) as u32;
        PixelRect {
            top: scale(self.top_row, height),
            left: scale(self.left_col, width),
            bottom: scale(self.bottom_row, height),
            right: scale(self.right_col, width),
        }
    }
}

/// A detected or segmented sub-area of an image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Encoded mask image, present only for segmentation output
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_bytes"
    )]
    pub mask: Option<Vec<u8>>,
    pub concepts: Vec<Concept>,
}

impl Region {
    pub fn has_mask(&self) -> bool {
        self.mask.as_ref().map(|m| !m.is_empty()).unwrap_or(false)
    }

    /// Highest-ranked concept, as ordered by the service
    pub fn top_concept(&self) -> Option<&Concept> {
        self.concepts.first()
    }
}

/// Concepts predicted for one sampled video frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: u32,
    /// Offset from the start of the video in milliseconds
    pub time_ms: u64,
    pub concepts: Vec<Concept>,
}

/// Discriminant of a [`PredictionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Concepts,
    Regions,
    Frames,
    GeneratedText,
    GeneratedImage,
    GeneratedAudio,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Concepts => "concepts",
            ResultKind::Regions => "regions",
            ResultKind::Frames => "frames",
            ResultKind::GeneratedText => "text",
            ResultKind::GeneratedImage => "image",
            ResultKind::GeneratedAudio => "audio",
        }
    }
}

/// Decoded output of a single prediction call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PredictionResult {
    Concepts(Vec<Concept>),
    Regions(Vec<Region>),
    Frames(Vec<Frame>),
    GeneratedText(String),
    GeneratedImage(#[serde(serialize_with = "serialize_bytes")] Vec<u8>),
    GeneratedAudio(#[serde(serialize_with = "serialize_bytes")] Vec<u8>),
}

impl PredictionResult {
    pub fn kind(&self) -> ResultKind {
        match self {
            PredictionResult::Concepts(_) => ResultKind::Concepts,
            PredictionResult::Regions(_) => ResultKind::Regions,
            PredictionResult::Frames(_) => ResultKind::Frames,
            PredictionResult::GeneratedText(_) => ResultKind::GeneratedText,
            PredictionResult::GeneratedImage(_) => ResultKind::GeneratedImage,
            PredictionResult::GeneratedAudio(_) => ResultKind::GeneratedAudio,
        }
    }

    /// All concepts in the result, flattened in source order
    pub fn concepts(&self) -> Vec<&Concept> {
        match self {
            PredictionResult::Concepts(concepts) => concepts.iter().collect(),
            PredictionResult::Regions(regions) => {
                regions.iter().flat_map(|r| r.concepts.iter()).collect()
            }
            PredictionResult::Frames(frames) => {
                frames.iter().flat_map(|f| f.concepts.iter()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Regions whose top concept scores strictly above `threshold`
    pub fn regions_above(&self, threshold: f32) -> Vec<&Region> {
        match self {
            PredictionResult::Regions(regions) => regions
                .iter()
                .filter(|r| r.top_concept().map(|c| c.value > threshold).unwrap_or(false))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PredictionResult::GeneratedText(text) => Some(text),
            _ => None,
        }
    }

    /// Raw bytes of generated image or audio output
    pub fn media_bytes(&self) -> Option<&[u8]> {
        match self {
            PredictionResult::GeneratedImage(bytes) | PredictionResult::GeneratedAudio(bytes) => {
                Some(bytes)
            }
            _ => None,
        }
    }
}

fn round_to(value: f32, places: u32) -> f32 {
    let factor = 10f64.powi(places as i32);
    ((value as f64 * factor).round() / factor) as f32
}

fn serialize_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
}

fn serialize_optional_bytes<S: Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serialize_bytes(bytes, serializer),
        None => serializer.serialize_none(),
    }
}
