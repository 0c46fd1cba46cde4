//! The gateway: one entry point that validates a neutral request, dispatches it to the right
//! vendor adapter and hands back a normalized result.

mod builder;
pub(crate) mod validation;

pub use builder::GatewayBuilder;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::adapters::VendorAdapter;
use crate::config::GatewayConfig;
use crate::registry::{ModelEntry, ModelRegistry, Vendor};
use crate::render;
use crate::transport::CallControl;
use crate::types::{ChatRequest, CompletionResult, NormalizedResponse};
use crate::{Error, Result};

/// Per-call options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Include the vendor-native request body in printed output.
    pub print_request: bool,
    /// Print only each choice's text, one per line.
    pub print_only_content: bool,
    /// Write the result to stdout at all.
    pub render: bool,
    /// Keep the vendor's raw reply on the result.
    pub keep_raw_response: bool,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            print_request: false,
            print_only_content: false,
            render: true,
            keep_raw_response: false,
            timeout: None,
            cancel: None,
        }
    }
}

impl RunOptions {
    /// Options that never write to stdout.
    pub fn silent() -> Self {
        Self {
            render: false,
            ..Self::default()
        }
    }

    pub fn only_content(mut self) -> Self {
        self.print_only_content = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Multi-vendor chat completion gateway.
///
/// Immutable after construction and safe to share across tasks; concurrent `run` calls share
/// no mutable state.
#[derive(Debug)]
pub struct Gateway {
    registry: Arc<ModelRegistry>,
    adapters: HashMap<Vendor, Arc<dyn VendorAdapter>>,
    default_timeout: Option<Duration>,
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Gateway with HTTP adapters for every vendor, configured from `config`.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        GatewayBuilder::new().config(config).build()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Execute one chat completion.
    ///
    /// Unknown models, unsupported parameters and out-of-range values are rejected before the
    /// adapter is touched. The vendor is called exactly once; failures are not retried.
    pub async fn run(&self, request: &ChatRequest, options: &RunOptions) -> Result<CompletionResult> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "chat_gateway.run",
            deployment = request.deployment_name.as_str(),
            request_id = request_id.as_str(),
        );
        let result = self.execute(request, options, request_id).instrument(span).await?;

        if options.render {
            render::render(&result, options.print_request, options.print_only_content);
        }
        Ok(result)
    }

    async fn execute(
        &self,
        request: &ChatRequest,
        options: &RunOptions,
        request_id: String,
    ) -> Result<CompletionResult> {
        let entry = self.registry.resolve(&request.deployment_name)?;
        validation::check_supported(request, entry)?;
        validation::check_ranges(request, entry)?;

        let adapter = self.adapters.get(&entry.vendor).ok_or_else(|| {
            Error::configuration(format!("no adapter registered for vendor '{}'", entry.vendor))
        })?;
        let payload = adapter.translate_request(request, entry)?;
        debug!(url = payload.url.as_str(), body = %payload.body, "vendor request");

        let control = CallControl {
            request_id: Some(request_id),
            timeout: options.timeout.or(self.default_timeout),
            cancel: options.cancel.clone(),
        };
        let start = Instant::now();
        let outcome = adapter.invoke(&payload, &control).await;
        let duration_ms = start.elapsed().as_millis();

        let body = match outcome {
            Ok(body) => body,
            Err(e) => {
                info!(
                    vendor = entry.vendor.id(),
                    duration_ms,
                    error = %e,
                    "vendor call failed"
                );
                return Err(e);
            }
        };
        debug!(body = %body, "vendor response");

        let normalized = adapter.normalize_response(&body)?;
        let normalized = check_choice_count(entry, request, normalized)?;
        info!(
            vendor = entry.vendor.id(),
            choices = normalized.choices.len(),
            duration_ms,
            "chat completion finished"
        );

        Ok(CompletionResult {
            deployment_name: entry.deployment_name.clone(),
            choices: normalized.choices,
            usage: normalized.usage,
            raw_request: payload.body,
            raw_response: options.keep_raw_response.then_some(body),
        })
    }
}

fn check_choice_count(
    entry: &ModelEntry,
    request: &ChatRequest,
    normalized: NormalizedResponse,
) -> Result<NormalizedResponse> {
    let requested = request.params.choice_count() as usize;
    let returned = normalized.choices.len();
    if returned > requested {
        return Err(Error::malformed(
            entry.vendor,
            format!("requested {} choice(s), received {}", requested, returned),
        ));
    }
    if returned < requested {
        warn!(
            vendor = entry.vendor.id(),
            requested,
            returned,
            "vendor returned fewer choices than requested"
        );
    }
    Ok(normalized)
}
