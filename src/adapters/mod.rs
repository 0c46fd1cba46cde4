//! Vendor adapters: translate the neutral request into a vendor call and the vendor reply back
//! into a normalized result.
//!
//! Each vendor family has one concrete adapter behind the object-safe [`VendorAdapter`] trait,
//! so the gateway dispatches through `Arc<dyn VendorAdapter>` and tests can substitute their
//! own implementation.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::VendorEndpoint;
use crate::registry::{ModelEntry, Vendor};
use crate::transport::{CallControl, HttpTransport};
use crate::types::{ChatRequest, Choice, NormalizedResponse, Parameter, StopSequences};
use crate::{Error, Result};

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

/// The vendor-native call an adapter produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorPayload {
    pub vendor: Vendor,
    /// Absolute endpoint URL.
    pub url: String,
    /// Protocol headers (credentials are added at invoke time and never stored here).
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

#[async_trait]
pub trait VendorAdapter: Send + Sync + fmt::Debug {
    fn vendor(&self) -> Vendor;

    /// Build the vendor request. Fails before any I/O when the request cannot be expressed
    /// faithfully (for example too many stop sequences).
    fn translate_request(&self, request: &ChatRequest, entry: &ModelEntry)
        -> Result<VendorPayload>;

    /// Perform the remote call exactly once.
    async fn invoke(&self, payload: &VendorPayload, control: &CallControl) -> Result<Value>;

    /// Map the vendor reply onto the shared choice shape.
    fn normalize_response(&self, body: &Value) -> Result<NormalizedResponse>;
}

/// Create the HTTP adapter for a vendor family.
pub fn create_adapter(
    vendor: Vendor,
    endpoint: VendorEndpoint,
    transport: Arc<HttpTransport>,
) -> Arc<dyn VendorAdapter> {
    match vendor {
        Vendor::OpenAi => Arc::new(OpenAiAdapter::new(endpoint, transport)),
        Vendor::Anthropic => Arc::new(AnthropicAdapter::new(endpoint, transport)),
        Vendor::Gemini => Arc::new(GeminiAdapter::new(endpoint, transport)),
    }
}

/// Stop lists longer than the model accepts are refused, never truncated.
pub(crate) fn checked_stop<'a>(
    stop: &'a StopSequences,
    entry: &ModelEntry,
) -> Result<&'a [String]> {
    let seqs = stop.as_slice();
    if let Some(max) = entry.limits.max_stop_sequences {
        if seqs.len() > max {
            return Err(Error::invalid(
                Parameter::Stop.as_str(),
                format!(
                    "'{}' accepts at most {} stop sequence(s), got {}; refusing to drop the rest",
                    entry.deployment_name,
                    max,
                    seqs.len()
                ),
            ));
        }
    }
    Ok(seqs)
}

/// Reject parameters the vendor protocol has no field for, even if a catalog claims support.
pub(crate) fn reject_inexpressible(
    request: &ChatRequest,
    entry: &ModelEntry,
    inexpressible: &[Parameter],
) -> Result<()> {
    match request
        .params
        .supplied()
        .into_iter()
        .find(|p| inexpressible.contains(p))
    {
        Some(p) => Err(Error::unsupported(p.as_str(), &entry.deployment_name)),
        None => Ok(()),
    }
}

/// Send the payload with the vendor's auth header attached.
pub(crate) async fn send(
    transport: &HttpTransport,
    payload: &VendorPayload,
    auth: (String, String),
    control: &CallControl,
) -> Result<Value> {
    let mut headers = payload.headers.clone();
    headers.push(auth);
    transport
        .post_json(&payload.url, &headers, &payload.body, control)
        .await
        .map_err(|e| Error::vendor_call(payload.vendor, e))
}

pub(crate) fn require_key(vendor: Vendor, endpoint: &VendorEndpoint) -> Result<&str> {
    endpoint.api_key.as_deref().ok_or_else(|| {
        Error::vendor_call(
            vendor,
            crate::transport::TransportError::Unauthenticated(format!(
                "no API key configured for {}",
                vendor
            )),
        )
    })
}

pub(crate) fn u64_at(v: &Value, key: &str) -> u64 {
    v.get(key).and_then(Value::as_u64).unwrap_or(0)
}

/// Order choices by the vendor's index, then number them by position.
///
/// Vendors may skip indices (Gemini drops blocked candidates) or repeat them, so the
/// vendor value only decides order. The sort is stable, so repeats keep reply order.
pub(crate) fn renumber(choices: &mut [Choice]) {
    choices.sort_by_key(|c| c.index);
    for (i, c) in choices.iter_mut().enumerate() {
        c.index = i as u32;
    }
}
