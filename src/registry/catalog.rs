//! YAML model catalog.
//!
//! ```yaml
//! models:
//!   - deployment_name: gpt-4o
//!     vendor: openai
//!     supported_parameters: [n, temperature, seed, max_tokens, stop]
//!     limits:
//!       max_stop_sequences: 4
//! ```
//!
//! `vendor_model_id` defaults to the deployment name; every `limits` key falls back to the
//! vendor's defaults.

use serde::Deserialize;
use std::collections::BTreeSet;

use super::{ParameterLimits, Vendor};
use crate::types::Parameter;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    pub models: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    pub deployment_name: String,
    pub vendor: Vendor,
    #[serde(default)]
    pub vendor_model_id: Option<String>,
    pub supported_parameters: BTreeSet<Parameter>,
    #[serde(default)]
    pub limits: LimitOverrides,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitOverrides {
    pub temperature_max: Option<f64>,
    pub max_stop_sequences: Option<usize>,
    pub max_n: Option<u32>,
}

impl LimitOverrides {
    pub fn apply(&self, mut base: ParameterLimits) -> ParameterLimits {
        if let Some(t) = self.temperature_max {
            base.temperature_max = t;
        }
        if let Some(s) = self.max_stop_sequences {
            base.max_stop_sequences = Some(s);
        }
        if let Some(n) = self.max_n {
            base.max_n = Some(n);
        }
        base
    }
}

/// Catalog compiled into the crate.
pub const BUILTIN_CATALOG: &str = include_str!("../../catalog/models.yaml");
