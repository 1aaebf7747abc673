//! Turns model references into concrete API addresses

use super::{ModelIds, ModelReference};
use crate::error::{PredictError, Result};
use url::Url;

/// Default public API base
pub const DEFAULT_API_BASE: &str = "https://api.clarifai.com";

/// Which version of a model an endpoint targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionPin {
    /// Whatever version the service currently serves
    Latest,
    Pinned(String),
}

/// Resolved, callable address of a model (and optionally a version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    ids: ModelIds,
    model_url: Url,
    outputs_url: Url,
}

impl Endpoint {
    pub fn ids(&self) -> &ModelIds {
        &self.ids
    }

    pub fn version(&self) -> VersionPin {
        match &self.ids.version_id {
            Some(version) => VersionPin::Pinned(version.clone()),
            None => VersionPin::Latest,
        }
    }

    /// Model metadata address
    pub fn model_url(&self) -> &Url {
        &self.model_url
    }

    /// Prediction address
    pub fn outputs_url(&self) -> &Url {
        &self.outputs_url
    }
}

/// Resolves [`ModelReference`]s against an API base URL
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    api_base: Url,
}

impl EndpointResolver {
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| {
            PredictError::invalid_input(format!("invalid API base URL '{}': {}", api_base, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(PredictError::invalid_input(format!(
                "API base URL '{}' cannot carry a path",
                api_base
            )));
        }
        Ok(Self { api_base })
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn resolve(&self, reference: &ModelReference) -> Result<Endpoint> {
        let ids = reference.ids()?;

        let mut model_path = vec![
            "v2",
            "users",
            ids.owner.as_str(),
            "apps",
            ids.app.as_str(),
            "models",
            ids.model_id.as_str(),
        ];
        if let Some(version) = &ids.version_id {
            model_path.extend(["versions", version.as_str()]);
        }

        let model_url = self.join(&model_path)?;
        model_path.push("outputs");
        let outputs_url = self.join(&model_path)?;

        Ok(Endpoint {
            ids,
            model_url,
            outputs_url,
        })
    }

    /// Append percent-encoded segments to the API base
    pub(crate) fn join(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| PredictError::invalid_input("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
        }
    }
}
