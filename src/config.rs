//! Gateway configuration: vendor endpoints, credentials, HTTP knobs and the catalog source.
//!
//! The library never reads the environment on its own. Binaries call
//! [`GatewayConfig::from_env`]; library users build the struct directly.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `OPENAI_API_KEY` | OpenAI bearer token | unset |
//! | `ANTHROPIC_API_KEY` | Anthropic `x-api-key` | unset |
//! | `GEMINI_API_KEY` / `GOOGLE_API_KEY` | Gemini `x-goog-api-key` | unset |
//! | `OPENAI_BASE_URL` | | `https://api.openai.com` |
//! | `ANTHROPIC_BASE_URL` | | `https://api.anthropic.com` |
//! | `GEMINI_BASE_URL` | | `https://generativelanguage.googleapis.com` |
//! | `GATEWAY_HTTP_TIMEOUT_SECS` | whole-request timeout | `60` |
//! | `GATEWAY_PROXY_URL` | proxy for all vendors | unset |
//! | `GATEWAY_CATALOG` | YAML catalog replacing the builtin one | unset |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::registry::Vendor;
use crate::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Where and how to reach one vendor.
#[derive(Clone)]
pub struct VendorEndpoint {
    pub base_url: Url,
    pub api_key: Option<String>,
}

impl VendorEndpoint {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            Error::configuration(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        Ok(Self {
            base_url,
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Public endpoint of the vendor, without credentials.
    pub fn default_for(vendor: Vendor) -> Self {
        let raw = match vendor {
            Vendor::OpenAi => "https://api.openai.com",
            Vendor::Anthropic => "https://api.anthropic.com",
            Vendor::Gemini => "https://generativelanguage.googleapis.com",
        };
        Self {
            base_url: Url::parse(raw).expect("builtin vendor URL is valid"),
            api_key: None,
        }
    }

    /// `base_url` joined with `path`, tolerating a trailing slash on the base.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for VendorEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorEndpoint")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP client settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Default request timeout. A per-call `RunOptions::timeout` replaces it, longer or shorter.
    pub timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            proxy_url: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub openai: VendorEndpoint,
    pub anthropic: VendorEndpoint,
    pub gemini: VendorEndpoint,
    pub http: HttpSettings,
    pub catalog_path: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai: VendorEndpoint::default_for(Vendor::OpenAi),
            anthropic: VendorEndpoint::default_for(Vendor::Anthropic),
            gemini: VendorEndpoint::default_for(Vendor::Gemini),
            http: HttpSettings::default(),
            catalog_path: None,
        }
    }
}

impl GatewayConfig {
    pub fn endpoint(&self, vendor: Vendor) -> &VendorEndpoint {
        match vendor {
            Vendor::OpenAi => &self.openai,
            Vendor::Anthropic => &self.anthropic,
            Vendor::Gemini => &self.gemini,
        }
    }

    pub fn endpoint_mut(&mut self, vendor: Vendor) -> &mut VendorEndpoint {
        match vendor {
            Vendor::OpenAi => &mut self.openai,
            Vendor::Anthropic => &mut self.anthropic,
            Vendor::Gemini => &mut self.gemini,
        }
    }

    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();
        for vendor in Vendor::ALL {
            let (key_vars, url_var): (&[&str], &str) = match vendor {
                Vendor::OpenAi => (&["OPENAI_API_KEY"][..], "OPENAI_BASE_URL"),
                Vendor::Anthropic => (&["ANTHROPIC_API_KEY"][..], "ANTHROPIC_BASE_URL"),
                Vendor::Gemini => (&["GEMINI_API_KEY", "GOOGLE_API_KEY"][..], "GEMINI_BASE_URL"),
            };
            if let Some(url) = get(url_var) {
                *cfg.endpoint_mut(vendor) = VendorEndpoint::new(&url).map_err(|e| e.at(url_var))?;
            }
            cfg.endpoint_mut(vendor).api_key = key_vars.iter().find_map(|k| get(*k));
        }

        if let Some(secs) = get("GATEWAY_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                Error::configuration(format!("expected whole seconds, got '{}'", secs))
                    .at("GATEWAY_HTTP_TIMEOUT_SECS")
            })?;
            cfg.http.timeout = Duration::from_secs(secs.max(1));
        }
        cfg.http.proxy_url = get("GATEWAY_PROXY_URL");
        cfg.catalog_path = get("GATEWAY_CATALOG").map(PathBuf::from);
        Ok(cfg)
    }
}
