//! Request-time output modifiers and inference hyperparameters

use super::Modality;
use crate::error::{PredictError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of concepts the service returns when `max_concepts` is unset
pub const DEFAULT_MAX_CONCEPTS: u32 = 20;

/// Restricts output to one concept, named by id and/or name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConceptSelector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConceptSelector {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }
}

/// Optional modifiers honored by the service when producing output
///
/// Filtering happens remotely; the client only validates the values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputConfig {
    /// Video only: run prediction on one frame every `sample_ms` milliseconds
    pub sample_ms: Option<u32>,
    /// Only return these concepts
    pub select_concepts: Vec<ConceptSelector>,
    /// Upper bound on returned concepts (service default: 20)
    pub max_concepts: Option<u32>,
    /// Drop concepts scoring below this value
    pub min_value: Option<f32>,
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_ms(mut self, interval_ms: u32) -> Self {
        self.sample_ms = Some(interval_ms);
        self
    }

    pub fn select_concept(mut self, selector: ConceptSelector) -> Self {
        self.select_concepts.push(selector);
        self
    }

    pub fn max_concepts(mut self, max: u32) -> Self {
        self.max_concepts = Some(max);
        self
    }

    pub fn min_value(mut self, min: f32) -> Self {
        self.min_value = Some(min);
        self
    }

    /// Concept limit the service will apply
    pub fn effective_max_concepts(&self) -> u32 {
        self.max_concepts.unwrap_or(DEFAULT_MAX_CONCEPTS)
    }

    pub fn is_empty(&self) -> bool {
        self == &OutputConfig::default()
    }

    pub fn validate(&self, modality: Modality) -> Result<()> {
        if let Some(sample_ms) = self.sample_ms {
            if modality != Modality::Video {
                return Err(PredictError::invalid_input(format!(
                    "sample_ms only applies to video input, not {}",
                    modality
                )));
            }
            if sample_ms == 0 {
                return Err(PredictError::invalid_input("sample_ms must be greater than 0"));
            }
        }

        if self.max_concepts == Some(0) {
            return Err(PredictError::invalid_input("max_concepts must be a positive integer"));
        }

        if let Some(min_value) = self.min_value {
            if !(0.0..=1.0).contains(&min_value) {
                return Err(PredictError::invalid_input(format!(
                    "min_value must be within [0, 1], got {}",
                    min_value
                )));
            }
        }

        for selector in &self.select_concepts {
            let named = selector.name.as_deref().map(|n| !n.is_empty()).unwrap_or(false);
            let identified = selector.id.as_deref().map(|i| !i.is_empty()).unwrap_or(false);
            if !named && !identified {
                return Err(PredictError::invalid_input(
                    "concept selector needs a name or an id",
                ));
            }
        }

        Ok(())
    }
}

/// Primitive value of a model-defined hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Interpret a command-line literal: bool, then integer, then float, else text
    pub fn parse_literal(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            ParamValue::Bool(b)
        } else if let Ok(i) = raw.parse::<i64>() {
            ParamValue::Int(i)
        } else if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                ParamValue::Float(f)
            } else {
                ParamValue::Text(raw.to_string())
            }
        } else {
            ParamValue::Text(raw.to_string())
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Model-defined hyperparameters, e.g. temperature, max_tokens, task
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct InferenceParams(BTreeMap<String, ParamValue>);

impl InferenceParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Parse `key=value` into an entry
    pub fn parse_pair(raw: &str) -> Result<(String, ParamValue)> {
        let (key, value) = raw.split_once('=').ok_or_else(|| {
            PredictError::invalid_input(format!("expected key=value, got '{}'", raw))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(PredictError::invalid_input(format!(
                "parameter name missing in '{}'",
                raw
            )));
        }
        Ok((key.to_string(), ParamValue::parse_literal(value.trim())))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for InferenceParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_max_concepts() {
        let config = OutputConfig::default();
        assert_eq!(config.effective_max_concepts(), DEFAULT_MAX_CONCEPTS);
        assert_eq!(config.max_concepts(3).effective_max_concepts(), 3);
    }

    #[test]
    fn test_sample_ms_only_for_video() {
        let config = OutputConfig::new().sample_ms(2000);
        assert!(config.validate(Modality::Video).is_ok());
        assert!(matches!(
            config.validate(Modality::Image),
            Err(PredictError::InvalidInput(_))
        ));
        assert!(OutputConfig::new()
            .sample_ms(0)
            .validate(Modality::Video)
            .is_err());
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(OutputConfig::new().max_concepts(0).validate(Modality::Image).is_err());
        assert!(OutputConfig::new().min_value(1.5).validate(Modality::Image).is_err());
        assert!(OutputConfig::new().min_value(-0.1).validate(Modality::Image).is_err());
        assert!(OutputConfig::new()
            .min_value(f32::NAN)
            .validate(Modality::Image)
            .is_err());
        assert!(OutputConfig::new().min_value(0.95).validate(Modality::Image).is_ok());
    }

    #[test]
    fn test_concept_selector_needs_identity() {
        let config = OutputConfig::new().select_concept(ConceptSelector::default());
        assert!(config.validate(Modality::Image).is_err());

        let config = OutputConfig::new()
            .select_concept(ConceptSelector::by_name("dog"))
            .select_concept(ConceptSelector::by_id("ai_8S2Vq3cR"));
        assert!(config.validate(Modality::Image).is_ok());
    }

    #[test]
    fn test_param_literals() {
        assert_eq!(ParamValue::parse_literal("true"), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse_literal("100"), ParamValue::Int(100));
        assert_eq!(ParamValue::parse_literal("0.2"), ParamValue::Float(0.2));
        assert_eq!(
            ParamValue::parse_literal("translate"),
            ParamValue::Text("translate".to_string())
        );
        assert_eq!(
            ParamValue::parse_literal("inf"),
            ParamValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_parse_pair() {
        let (key, value) = InferenceParams::parse_pair("max_tokens = 100").unwrap();
        assert_eq!(key, "max_tokens");
        assert_eq!(value, ParamValue::Int(100));

        assert!(InferenceParams::parse_pair("temperature").is_err());
        assert!(InferenceParams::parse_pair("=1").is_err());
    }

    #[test]
    fn test_params_serialize_as_flat_map() {
        let params = InferenceParams::new()
            .set("temperature", 0.2)
            .set("max_tokens", 100)
            .set("task", "translate");

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"max_tokens": 100, "task": "translate", "temperature": 0.2})
        );
    }
}
