//! Modalities and payloads

use crate::error::PredictError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Semantic type of an input payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Text,
    Image,
    Video,
    Audio,
    Multimodal,
}

impl Modality {
    pub const ALL: [Modality; 5] = [
        Modality::Text,
        Modality::Image,
        Modality::Video,
        Modality::Audio,
        Modality::Multimodal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Audio => "audio",
            Modality::Multimodal => "multimodal",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Modality::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| {
                PredictError::UnsupportedModality(format!(
                    "'{}' (expected one of text, image, video, audio, multimodal)",
                    s
                ))
            })
    }
}

/// Where the caller said the payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadOrigin {
    Bytes,
    FilePath(PathBuf),
    Url(Url),
}

impl PayloadOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            PayloadOrigin::Bytes => "bytes",
            PayloadOrigin::FilePath(_) => "file",
            PayloadOrigin::Url(_) => "url",
        }
    }
}

/// What is actually sent to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadContent {
    /// Bytes read from memory or a file, sent inline
    Inline(Vec<u8>),
    /// Fetched by the service itself
    Remote(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    origin: PayloadOrigin,
    content: PayloadContent,
}

impl Payload {
    pub(crate) fn inline(origin: PayloadOrigin, bytes: Vec<u8>) -> Self {
        Self {
            origin,
            content: PayloadContent::Inline(bytes),
        }
    }

    pub(crate) fn remote(url: Url) -> Self {
        Self {
            origin: PayloadOrigin::Url(url.clone()),
            content: PayloadContent::Remote(url),
        }
    }

    pub fn origin(&self) -> &PayloadOrigin {
        &self.origin
    }

    pub fn content(&self) -> &PayloadContent {
        &self.content
    }
}

/// A single prediction input, tagged by modality
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionInput {
    Text(Payload),
    Image(Payload),
    Video(Payload),
    Audio(Payload),
    /// An image together with a text prompt about it
    Multimodal { image: Payload, prompt: String },
}

impl PredictionInput {
    pub fn modality(&self) -> Modality {
        match self {
            PredictionInput::Text(_) => Modality::Text,
            PredictionInput::Image(_) => Modality::Image,
            PredictionInput::Video(_) => Modality::Video,
            PredictionInput::Audio(_) => Modality::Audio,
            PredictionInput::Multimodal { .. } => Modality::Multimodal,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            PredictionInput::Text(p)
            | PredictionInput::Image(p)
            | PredictionInput::Video(p)
            | PredictionInput::Audio(p) => p,
            PredictionInput::Multimodal { image, .. } => image,
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        match self {
            PredictionInput::Multimodal { prompt, .. } => Some(prompt),
            _ => None,
        }
    }
}
