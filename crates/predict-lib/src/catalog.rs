//! Model catalog queries
//!
//! Read-only lookups of the models a personal access token can see:
//! a paged search and a single-model fetch. Both share the dispatcher's
//! error classification.

use crate::error::{PredictError, Result};
use crate::reference::EndpointResolver;
use crate::wire::{MultiModelResponse, SingleModelResponse, WireModel, WireStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

/// Search filter for [`list_models`](crate::PredictionClient::list_models)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFilter {
    /// Free-text match on model name and description
    pub query: Option<String>,
    /// e.g. `visual-classifier`, `text-to-text`, `visual-detector`
    pub model_type_id: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ModelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn model_type(mut self, model_type_id: impl Into<String>) -> Self {
        self.model_type_id = Some(model_type_id.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(PredictError::invalid_input("page numbers start at 1"));
        }
        if self.per_page == Some(0) {
            return Err(PredictError::invalid_input("per_page must be a positive integer"));
        }
        Ok(())
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(query) = &self.query {
            parts.push(format!("query={}", query));
        }
        if let Some(model_type) = &self.model_type_id {
            parts.push(format!("model_type={}", model_type));
        }
        if let Some(page) = self.page {
            parts.push(format!("page={}", page));
        }
        if let Some(per_page) = self.per_page {
            parts.push(format!("per_page={}", per_page));
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// A model version and the inference parameters it declares
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelVersionInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Declared hyperparameters with their default values
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Catalog entry for one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub owner: Option<String>,
    pub app: Option<String>,
    pub model_type_id: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub version: Option<ModelVersionInfo>,
}

impl ModelInfo {
    /// `owner/app/model` when owner and app are known
    pub fn qualified_id(&self) -> String {
        match (&self.owner, &self.app) {
            (Some(owner), Some(app)) => format!("{}/{}/{}", owner, app, self.id),
            _ => self.id.clone(),
        }
    }
}

/// Address of the catalog search with the filter applied as query parameters
pub(crate) fn list_url(resolver: &EndpointResolver, filter: &ModelFilter) -> Result<Url> {
    let mut url = resolver.join(&["v2", "models"])?;
    {
        let mut pairs = url.query_pairs_mut();
        if let Some(query) = &filter.query {
            pairs.append_pair("query", query);
        }
        if let Some(model_type) = &filter.model_type_id {
            pairs.append_pair("model_type_id", model_type);
        }
        if let Some(page) = filter.page {
            pairs.append_pair("page", &page.to_string());
        }
        if let Some(per_page) = filter.per_page {
            pairs.append_pair("per_page", &per_page.to_string());
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}

pub(crate) fn decode_model_list(body: &[u8]) -> Result<Vec<ModelInfo>> {
    let response: MultiModelResponse = serde_json::from_slice(body).map_err(|e| {
        PredictError::malformed_response(format!("model list is not valid JSON: {}", e))
    })?;
    check_status(response.status)?;
    response.models.into_iter().map(model_info).collect()
}

pub(crate) fn decode_model(body: &[u8]) -> Result<ModelInfo> {
    let response: SingleModelResponse = serde_json::from_slice(body).map_err(|e| {
        PredictError::malformed_response(format!("model is not valid JSON: {}", e))
    })?;
    check_status(response.status)?;
    let model = response
        .model
        .ok_or_else(|| PredictError::malformed_response("response carries no model"))?;
    model_info(model)
}

fn check_status(status: Option<WireStatus>) -> Result<()> {
    match status {
        Some(status) if !status.is_success() => Err(PredictError::RemoteRequest {
            http_status: 200,
            code: status.code,
            description: status
                .description
                .unwrap_or_else(|| "catalog request failed".to_string()),
            details: status.details,
        }),
        _ => Ok(()),
    }
}

fn model_info(model: WireModel) -> Result<ModelInfo> {
    let id = model
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| PredictError::malformed_response("model entry has no id"))?;

    let version = match model.model_version {
        Some(version) => Some(ModelVersionInfo {
            id: version.id.unwrap_or_default(),
            created_at: parse_timestamp(version.created_at.as_deref())?,
            params: version
                .output_info
                .and_then(|info| info.params)
                .unwrap_or_default(),
        }),
        None => None,
    };

    Ok(ModelInfo {
        name: model.name.filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone()),
        id,
        owner: model.user_id,
        app: model.app_id,
        model_type_id: model.model_type_id,
        description: model.description.filter(|d| !d.is_empty()),
        created_at: parse_timestamp(model.created_at.as_deref())?,
        version,
    })
}

fn parse_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| {
                PredictError::malformed_response(format!("bad timestamp '{}': {}", raw, e))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_url_carries_filter() {
        let resolver = EndpointResolver::default();
        let url = list_url(
            &resolver,
            &ModelFilter::new()
                .query("llama")
                .model_type("text-to-text")
                .page(2)
                .per_page(5),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.clarifai.com/v2/models?query=llama&model_type_id=text-to-text&page=2&per_page=5"
        );

        let url = list_url(&resolver, &ModelFilter::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.clarifai.com/v2/models");
    }

    #[test]
    fn test_filter_validation() {
        assert!(ModelFilter::new().page(0).validate().is_err());
        assert!(ModelFilter::new().per_page(0).validate().is_err());
        assert!(ModelFilter::new().page(1).per_page(20).validate().is_ok());
        assert_eq!(ModelFilter::new().describe(), "all");
    }

    #[test]
    fn test_decode_model() {
        let body = json!({
            "status": {"code": 10000},
            "model": {
                "id": "llama2-7b-chat",
                "name": "Llama2-7b-chat",
                "user_id": "meta",
                "app_id": "Llama-2",
                "model_type_id": "text-to-text",
                "created_at": "2023-07-18T13:01:34.123456Z",
                "model_version": {
                    "id": "e52af5d6bc22445aa7a6761f327f7129",
                    "output_info": {"params": {"temperature": 0.7, "max_tokens": 512}}
                }
            }
        });
        let info = decode_model(&serde_json::to_vec(&body).unwrap()).unwrap();

        assert_eq!(info.qualified_id(), "meta/Llama-2/llama2-7b-chat");
        assert_eq!(info.model_type_id.as_deref(), Some("text-to-text"));
        assert!(info.created_at.is_some());
        let version = info.version.unwrap();
        assert_eq!(version.params.get("max_tokens"), Some(&json!(512)));
    }

    #[test]
    fn test_decode_model_list_defaults() {
        let body = br#"{"status":{"code":10000},"models":[{"id":"general-image-recognition"}]}"#;
        let models = decode_model_list(body).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "general-image-recognition");
        assert!(models[0].version.is_none());

        assert!(decode_model_list(br#"{"status":{"code":10000}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_decode_malformed_catalog() {
        assert!(matches!(
            decode_model_list(br#"{"models":[{"name":"no id"}]}"#),
            Err(PredictError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_model(br#"{"status":{"code":10000}}"#),
            Err(PredictError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_model(br#"{"model":{"id":"m","created_at":"yesterday"}}"#),
            Err(PredictError::MalformedResponse(_))
        ));
    }
}
