use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::Gateway;
use crate::adapters::{create_adapter, VendorAdapter};
use crate::config::GatewayConfig;
use crate::registry::{ModelRegistry, Vendor};
use crate::transport::HttpTransport;
use crate::Result;

/// Builder for creating gateways with custom configuration.
///
/// Anything not set explicitly comes from the [`GatewayConfig`] (or its defaults): the
/// registry from `catalog_path` or the builtin catalog, and one HTTP adapter per vendor that
/// was not injected with [`GatewayBuilder::adapter`].
#[derive(Default)]
pub struct GatewayBuilder {
    config: Option<GatewayConfig>,
    registry: Option<Arc<ModelRegistry>>,
    adapters: HashMap<Vendor, Arc<dyn VendorAdapter>>,
    default_timeout: Option<Duration>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn registry(mut self, registry: impl Into<Arc<ModelRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Use `adapter` for its vendor instead of the HTTP one.
    pub fn adapter(mut self, adapter: Arc<dyn VendorAdapter>) -> Self {
        self.adapters.insert(adapter.vendor(), adapter);
        self
    }

    /// Deadline applied to calls whose options carry none.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Gateway> {
        let config = self.config.unwrap_or_default();

        let registry = match self.registry {
            Some(r) => r,
            None => Arc::new(match &config.catalog_path {
                Some(path) => ModelRegistry::from_path(path)?,
                None => ModelRegistry::builtin()?,
            }),
        };

        let mut adapters = self.adapters;
        let missing: Vec<Vendor> = Vendor::ALL
            .into_iter()
            .filter(|v| !adapters.contains_key(v))
            .collect();
        if !missing.is_empty() {
            let transport = Arc::new(HttpTransport::new(&config.http)?);
            for vendor in missing {
                adapters.insert(
                    vendor,
                    create_adapter(vendor, config.endpoint(vendor).clone(), transport.clone()),
                );
            }
        }

        Ok(Gateway {
            registry,
            adapters,
            default_timeout: self.default_timeout,
        })
    }
}
