//! Model registry: deployment name → vendor, vendor model id, and parameter capabilities.
//!
//! The registry is populated once from a YAML catalog and is read-only afterwards, so a
//! single instance can be shared across concurrent callers behind an `Arc` without locking.
//! Capabilities are declared per entry rather than discovered at call time: the gateway rejects a
//! parameter the entry does not list instead of letting a vendor silently ignore it.

pub mod catalog;
pub mod deployment;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use crate::types::Parameter;
use crate::{Error, Result};

pub use catalog::{Catalog, CatalogEntry, BUILTIN_CATALOG};
pub use deployment::DeploymentId;

/// Supported vendor families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vendor {
    /// OpenAI chat completions (`/v1/chat/completions`).
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic Messages API (`/v1/messages`).
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Google Gemini `generateContent`.
    #[serde(rename = "gemini")]
    Gemini,
}

impl Vendor {
    pub const ALL: [Vendor; 3] = [Vendor::OpenAi, Vendor::Anthropic, Vendor::Gemini];

    pub fn id(&self) -> &'static str {
        match self {
            Vendor::OpenAi => "openai",
            Vendor::Anthropic => "anthropic",
            Vendor::Gemini => "gemini",
        }
    }

    /// Limits documented by the vendor for its chat endpoint.
    pub fn default_limits(&self) -> ParameterLimits {
        match self {
            Vendor::OpenAi => ParameterLimits {
                temperature_max: 2.0,
                max_stop_sequences: Some(4),
                max_n: Some(128),
            },
            Vendor::Anthropic => ParameterLimits {
                temperature_max: 1.0,
                max_stop_sequences: None,
                max_n: Some(1),
            },
            Vendor::Gemini => ParameterLimits {
                temperature_max: 2.0,
                max_stop_sequences: Some(5),
                max_n: Some(8),
            },
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Per-model limits that are tighter than the neutral parameter ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterLimits {
    pub temperature_max: f64,
    pub max_stop_sequences: Option<usize>,
    pub max_n: Option<u32>,
}

/// One registry row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEntry {
    pub deployment_name: String,
    pub id: DeploymentId,
    pub vendor: Vendor,
    pub vendor_model_id: String,
    pub supported_parameters: BTreeSet<Parameter>,
    pub limits: ParameterLimits,
}

impl ModelEntry {
    /// Build an entry with the vendor's default limits.
    pub fn new(
        deployment_name: impl Into<String>,
        vendor: Vendor,
        vendor_model_id: impl Into<String>,
        supported_parameters: impl IntoIterator<Item = Parameter>,
    ) -> Result<Self> {
        let deployment_name = deployment_name.into();
        let id = DeploymentId::parse(vendor, &deployment_name)?;
        Ok(Self {
            deployment_name,
            id,
            vendor,
            vendor_model_id: vendor_model_id.into(),
            supported_parameters: supported_parameters.into_iter().collect(),
            limits: vendor.default_limits(),
        })
    }

    pub fn with_limits(mut self, limits: ParameterLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn supports(&self, parameter: Parameter) -> bool {
        self.supported_parameters.contains(&parameter)
    }

    fn from_catalog(entry: CatalogEntry) -> Result<Self> {
        let vendor_model_id = entry
            .vendor_model_id
            .unwrap_or_else(|| entry.deployment_name.clone());
        let limits = entry.limits.apply(entry.vendor.default_limits());
        Ok(Self::new(
            entry.deployment_name,
            entry.vendor,
            vendor_model_id,
            entry.supported_parameters,
        )?
        .with_limits(limits))
    }
}

/// Immutable lookup table of model entries.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: HashMap<String, ModelEntry>,
    order: Vec<String>,
}

impl ModelRegistry {
    /// Registry populated from the catalog compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG).map_err(|e| e.at("builtin catalog"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(yaml)
            .map_err(|e| Error::configuration(format!("invalid model catalog: {}", e)))?;
        Self::from_entries(
            catalog
                .models
                .into_iter()
                .map(ModelEntry::from_catalog)
                .collect::<Result<Vec<_>>>()?,
        )
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!("cannot read model catalog: {}", e))
                .at(path.display().to_string())
        })?;
        Self::from_yaml_str(&yaml).map_err(|e| e.at(path.display().to_string()))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = ModelEntry>) -> Result<Self> {
        let mut registry = Self::default();
        for entry in entries {
            if registry.entries.contains_key(&entry.deployment_name) {
                return Err(Error::configuration(format!(
                    "duplicate deployment '{}'",
                    entry.deployment_name
                )));
            }
            registry.order.push(entry.deployment_name.clone());
            registry.entries.insert(entry.deployment_name.clone(), entry);
        }
        Ok(registry)
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, deployment_name: &str) -> Result<&ModelEntry> {
        self.entries
            .get(deployment_name)
            .ok_or_else(|| Error::unknown_model(deployment_name))
    }

    /// Registered names in catalog order.
    pub fn deployment_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
