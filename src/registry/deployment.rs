//! Structured deployment identifiers.
//!
//! Deployment names follow a loose convention: a base model name with an optional dated
//! version, written either Vertex-style (`claude-3-7-sonnet@20250219`) or as a suffix
//! (`gpt-4o-2024-08-06`, `claude-3-5-haiku-20241022`). The name is parsed once when the
//! registry is populated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use super::Vendor;
use crate::{Error, Result};

static DEPLOYMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[A-Za-z0-9][A-Za-z0-9._:/-]*?)(?:[@-](?P<version>\d{4}-\d{2}-\d{2}|\d{8}))?$")
        .expect("deployment name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeploymentId {
    pub vendor: Vendor,
    pub base_model: String,
    pub version: Option<String>,
}

impl DeploymentId {
    pub fn parse(vendor: Vendor, deployment_name: &str) -> Result<Self> {
        let caps = DEPLOYMENT_RE.captures(deployment_name).ok_or_else(|| {
            Error::configuration(format!(
                "deployment name '{}' is not a valid model identifier",
                deployment_name
            ))
        })?;
        Ok(Self {
            vendor,
            base_model: caps["base"].to_string(),
            version: caps.name("version").map(|m| m.as_str().to_string()),
        })
    }
}

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}@{}", self.vendor, self.base_model, v),
            None => write!(f, "{}:{}", self.vendor, self.base_model),
        }
    }
}
