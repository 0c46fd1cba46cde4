//! Anthropic Messages API adapter. Differences from OpenAI:
//! - System messages are a top-level `system` parameter, not part of `messages`.
//! - `max_tokens` is required; the API has no "model default", so 4096 is sent when unset.
//! - Stop sequences are always a list, `stop_sequences`.
//! - One completion per call: `n > 1`, `seed` and the penalties have no counterpart.
//! - Response uses `content[].text` and `stop_reason` instead of `choices`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{
    checked_stop, reject_inexpressible, require_key, send, u64_at, VendorAdapter, VendorPayload,
};
use crate::config::VendorEndpoint;
use crate::registry::{ModelEntry, Vendor};
use crate::transport::{CallControl, HttpTransport};
use crate::types::message::split_system;
use crate::types::{ChatRequest, Choice, FinishReason, NormalizedResponse, Parameter, Usage};
use crate::{Error, Result};

const MESSAGES_PATH: &str = "v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug)]
pub struct AnthropicAdapter {
    endpoint: VendorEndpoint,
    transport: Arc<HttpTransport>,
}

impl AnthropicAdapter {
    pub fn new(endpoint: VendorEndpoint, transport: Arc<HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

fn finish_reason(code: &str) -> FinishReason {
    match code {
        "end_turn" | "stop_sequence" => FinishReason::Stop,
        "max_tokens" => FinishReason::Length,
        "refusal" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

#[async_trait]
impl VendorAdapter for AnthropicAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    fn translate_request(
        &self,
        request: &ChatRequest,
        entry: &ModelEntry,
    ) -> Result<VendorPayload> {
        reject_inexpressible(
            request,
            entry,
            &[
                Parameter::Seed,
                Parameter::FrequencyPenalty,
                Parameter::PresencePenalty,
            ],
        )?;
        if request.params.choice_count() > 1 {
            return Err(Error::unsupported(Parameter::N.as_str(), &entry.deployment_name));
        }

        let (system, turns) = split_system(&request.messages);
        let messages: Vec<Value> = turns
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let p = &request.params;
        let mut body = json!({
            "model": entry.vendor_model_id,
            "messages": messages,
            "max_tokens": p.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });
        if let Some(sys) = system {
            body["system"] = Value::String(sys);
        }
        if let Some(t) = p.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(stop) = &p.stop {
            body["stop_sequences"] = json!(checked_stop(stop, entry)?);
        }

        Ok(VendorPayload {
            vendor: Vendor::Anthropic,
            url: self.endpoint.url(MESSAGES_PATH),
            headers: vec![("anthropic-version".to_string(), API_VERSION.to_string())],
            body,
        })
    }

    async fn invoke(&self, payload: &VendorPayload, control: &CallControl) -> Result<Value> {
        let key = require_key(Vendor::Anthropic, &self.endpoint)?;
        send(
            &self.transport,
            payload,
            ("x-api-key".to_string(), key.to_string()),
            control,
        )
        .await
    }

    fn normalize_response(&self, body: &Value) -> Result<NormalizedResponse> {
        let blocks = body
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::malformed(Vendor::Anthropic, "missing 'content' array"))?;

        let content: String = blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect();

        let finish_reason = body
            .get("stop_reason")
            .and_then(Value::as_str)
            .map(finish_reason)
            .unwrap_or(FinishReason::Other);

        let usage = body.get("usage").map(|u| {
            let prompt = u64_at(u, "input_tokens");
            let completion = u64_at(u, "output_tokens");
            Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }
        });

        Ok(NormalizedResponse {
            choices: vec![Choice {
                index: 0,
                content,
                finish_reason,
            }],
            usage,
        })
    }
}
