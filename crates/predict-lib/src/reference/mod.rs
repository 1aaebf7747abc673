//! Model references and endpoint resolution
//!
//! A model is named either by its community URL
//! (`https://clarifai.com/<owner>/<app>/models/<model>[/model_version/<version>]`)
//! or by the identifier triple, optionally pinned to a version.
//! Resolution is an in-memory transformation; nothing here touches the network.

mod resolver;

pub use resolver::{Endpoint, EndpointResolver, VersionPin, DEFAULT_API_BASE};

use crate::error::{PredictError, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Path segments accepted between the model id and the version id
const VERSION_SEGMENTS: &[&str] = &["model_version", "versions"];

/// Fully-specified model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelIds {
    pub owner: String,
    pub app: String,
    pub model_id: String,
    pub version_id: Option<String>,
}

impl ModelIds {
    fn validate(&self) -> Result<()> {
        validate_component("owner", &self.owner)?;
        validate_component("app", &self.app)?;
        validate_component("model_id", &self.model_id)?;
        if let Some(version) = &self.version_id {
            validate_component("version_id", version)?;
        }
        Ok(())
    }
}

impl fmt::Display for ModelIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.app, self.model_id)?;
        if let Some(version) = &self.version_id {
            write!(f, "@{}", version)?;
        }
        Ok(())
    }
}

/// Identifies a remote model
///
/// Immutable once constructed. Use [`ModelReference::is_equivalent`] rather
/// than `==` to compare a URL form against an id form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReference {
    Url(String),
    Ids(ModelIds),
}

impl ModelReference {
    pub fn from_url(url: impl Into<String>) -> Self {
        ModelReference::Url(url.into())
    }

    pub fn from_ids(
        owner: impl Into<String>,
        app: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        ModelReference::Ids(ModelIds {
            owner: owner.into(),
            app: app.into(),
            model_id: model_id.into(),
            version_id: None,
        })
    }

    /// Pin the reference to a model version
    ///
    /// For the URL form the pin replaces any version already in the URL.
    pub fn with_version(self, version_id: impl Into<String>) -> Self {
        let version_id = Some(version_id.into());
        match self {
            ModelReference::Ids(ids) => ModelReference::Ids(ModelIds { version_id, ..ids }),
            ModelReference::Url(url) => match parse_model_url(&url) {
                Ok(ids) => ModelReference::Ids(ModelIds { version_id, ..ids }),
                // Left unparsed so resolution reports the original problem
                Err(_) => ModelReference::Url(url),
            },
        }
    }

    /// Validated identifiers this reference points at
    pub fn ids(&self) -> Result<ModelIds> {
        let ids = match self {
            ModelReference::Url(url) => parse_model_url(url)?,
            ModelReference::Ids(ids) => ids.clone(),
        };
        ids.validate()?;
        Ok(ids)
    }

    /// True when both references resolve to the same model and version
    pub fn is_equivalent(&self, other: &ModelReference) -> bool {
        match (self.ids(), other.ids()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl FromStr for ModelReference {
    type Err = PredictError;

    /// Accepts a model URL or `owner/app/model[@version]`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains("://") {
            let reference = ModelReference::Url(s.to_string());
            reference.ids()?;
            return Ok(reference);
        }

        let (path, version_id) = match s.split_once('@') {
            Some((path, version)) => (path, Some(version.to_string())),
            None => (s, None),
        };
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() != 3 {
            return Err(PredictError::malformed_reference(format!(
                "expected owner/app/model[@version], got '{}'",
                s
            )));
        }

        let ids = ModelIds {
            owner: parts[0].to_string(),
            app: parts[1].to_string(),
            model_id: parts[2].to_string(),
            version_id,
        };
        ids.validate()?;
        Ok(ModelReference::Ids(ids))
    }
}

impl fmt::Display for ModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelReference::Url(url) => f.write_str(url),
            ModelReference::Ids(ids) => write!(f, "{}", ids),
        }
    }
}

fn validate_component(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PredictError::malformed_reference(format!(
            "{} must not be empty",
            name
        )));
    }
    if value.contains('/') {
        return Err(PredictError::malformed_reference(format!(
            "{} must not contain '/': '{}'",
            name, value
        )));
    }
    Ok(())
}

/// Split `<owner>/<app>/models/<model>[/model_version/<version>]` out of a URL path
fn parse_model_url(raw: &str) -> Result<ModelIds> {
    let url = Url::parse(raw)
        .map_err(|e| PredictError::malformed_reference(format!("invalid URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(PredictError::malformed_reference(format!(
            "unsupported URL scheme '{}'",
            url.scheme()
        )));
    }

    // Path segments come back percent-encoded; ids are stored decoded
    let mut segments: Vec<String> = url
        .path_segments()
        .into_iter()
        .flatten()
        .map(|segment| {
            percent_decode_str(segment)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|e| {
                    PredictError::malformed_reference(format!(
                        "path segment '{}' is not valid UTF-8: {}",
                        segment, e
                    ))
                })
        })
        .collect::<Result<_>>()?;
    // A single trailing slash yields one empty final segment
    if segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    let shape_error = || {
        PredictError::malformed_reference(format!(
            "expected <owner>/<app>/models/<model_id>[/model_version/<version_id>] in '{}'",
            raw
        ))
    };

    let version_id = match segments.len() {
        4 => None,
        6 if VERSION_SEGMENTS.contains(&segments[4].as_str()) => Some(segments[5].clone()),
        _ => return Err(shape_error()),
    };
    if segments[2] != "models" {
        return Err(shape_error());
    }

    let ids = ModelIds {
        owner: segments[0].clone(),
        app: segments[1].clone(),
        model_id: segments[3].clone(),
        version_id,
    };
    ids.validate()?;
    Ok(ids)
}
