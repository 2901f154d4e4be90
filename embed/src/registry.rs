//! Versioned registry of sentence encoders.
//!
//! The retrieval cascade needs two models — one trained on category
//! documents, one on article pairs. Both are registered here by id and
//! version and resolved to handles at wiring time.

use crate::encoder::SentenceEncoder;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("version not found for model {model_id}: {version}")]
    VersionNotFound { model_id: String, version: String },
    #[error("model version already exists for model {model_id}: {version}")]
    VersionAlreadyExists { model_id: String, version: String },
}

#[derive(Clone)]
pub struct ResolvedEncoder {
    pub model_id: String,
    pub version: String,
    pub encoder: Arc<dyn SentenceEncoder>,
}

impl std::fmt::Debug for ResolvedEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedEncoder")
            .field("model_id", &self.model_id)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct ModelFamily {
    versions: BTreeMap<String, Arc<dyn SentenceEncoder>>,
    active_version: Option<String>,
}

#[derive(Default)]
pub struct EncoderRegistry {
    families: HashMap<String, ModelFamily>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        model_id: impl Into<String>,
        version: impl Into<String>,
        encoder: Arc<dyn SentenceEncoder>,
    ) -> Result<(), RegistryError> {
        let model_id = model_id.into();
        let version = version.into();
        let family = self.families.entry(model_id.clone()).or_default();

        if family.versions.contains_key(&version) {
            return Err(RegistryError::VersionAlreadyExists { model_id, version });
        }

        family.versions.insert(version.clone(), encoder);

        // First registered version becomes active by default.
        if family.active_version.is_none() {
            family.active_version = Some(version);
        }

        Ok(())
    }

    pub fn activate(
        &mut self,
        model_id: &str,
        version: &str,
    ) -> Result<ResolvedEncoder, RegistryError> {
        let family = self
            .families
            .get_mut(model_id)
            .ok_or_else(|| RegistryError::ModelNotFound(model_id.to_string()))?;

        let encoder = family.versions.get(version).cloned().ok_or_else(|| {
            RegistryError::VersionNotFound {
                model_id: model_id.to_string(),
                version: version.to_string(),
            }
        })?;

        family.active_version = Some(version.to_string());

        Ok(ResolvedEncoder {
            model_id: model_id.to_string(),
            version: version.to_string(),
            encoder,
        })
    }

    /// Resolve `"id"` to the active version, or `"id@version"` to that
    /// exact version.
    pub fn resolve(&self, model_ref: &str) -> Result<ResolvedEncoder, RegistryError> {
        let (model_id, pinned_version) = parse_model_ref(model_ref);
        let family = self
            .families
            .get(model_id)
            .ok_or_else(|| RegistryError::ModelNotFound(model_id.to_string()))?;

        let version = match pinned_version {
            Some(v) => v.to_string(),
            None => family
                .active_version
                .clone()
                .ok_or_else(|| RegistryError::ModelNotFound(model_id.to_string()))?,
        };

        let encoder = family.versions.get(&version).cloned().ok_or_else(|| {
            RegistryError::VersionNotFound {
                model_id: model_id.to_string(),
                version: version.clone(),
            }
        })?;

        Ok(ResolvedEncoder {
            model_id: model_id.to_string(),
            version,
            encoder,
        })
    }
}

fn parse_model_ref(model_ref: &str) -> (&str, Option<&str>) {
    match model_ref.split_once('@') {
        Some((model_id, version)) if !model_id.is_empty() && !version.is_empty() => {
            (model_id, Some(version))
        }
        _ => (model_ref, None),
    }
}
