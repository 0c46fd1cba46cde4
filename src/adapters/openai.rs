//! OpenAI chat completions adapter.
//!
//! The neutral parameter names are OpenAI's own, so translation is mostly a copy: `n`,
//! `temperature`, `seed`, `max_tokens`, `frequency_penalty`, `presence_penalty` and `stop`
//! (a string or a list of at most four).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{checked_stop, renumber, require_key, send, u64_at, VendorAdapter, VendorPayload};
use crate::config::VendorEndpoint;
use crate::registry::{ModelEntry, Vendor};
use crate::transport::{CallControl, HttpTransport};
use crate::types::{ChatRequest, Choice, FinishReason, NormalizedResponse, StopSequences, Usage};
use crate::{Error, Result};

const CHAT_PATH: &str = "v1/chat/completions";

#[derive(Debug)]
pub struct OpenAiAdapter {
    endpoint: VendorEndpoint,
    transport: Arc<HttpTransport>,
}

impl OpenAiAdapter {
    pub fn new(endpoint: VendorEndpoint, transport: Arc<HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

fn finish_reason(code: &str) -> FinishReason {
    match code {
        "stop" => FinishReason::Stop,
        "length" => FinishReason::Length,
        "content_filter" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

#[async_trait]
impl VendorAdapter for OpenAiAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::OpenAi
    }

    fn translate_request(
        &self,
        request: &ChatRequest,
        entry: &ModelEntry,
    ) -> Result<VendorPayload> {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": entry.vendor_model_id,
            "messages": messages,
        });

        let p = &request.params;
        if let Some(n) = p.n {
            body["n"] = json!(n);
        }
        if let Some(t) = p.temperature {
            body["temperature"] = json!(t);
        }
        if let Some(seed) = p.seed {
            body["seed"] = json!(seed);
        }
        if let Some(mt) = p.max_tokens {
            body["max_tokens"] = json!(mt);
        }
        if let Some(fp) = p.frequency_penalty {
            body["frequency_penalty"] = json!(fp);
        }
        if let Some(pp) = p.presence_penalty {
            body["presence_penalty"] = json!(pp);
        }
        if let Some(stop) = &p.stop {
            let seqs = checked_stop(stop, entry)?;
            body["stop"] = match stop {
                StopSequences::Single(s) => json!(s),
                StopSequences::Many(_) => json!(seqs),
            };
        }

        Ok(VendorPayload {
            vendor: Vendor::OpenAi,
            url: self.endpoint.url(CHAT_PATH),
            headers: Vec::new(),
            body,
        })
    }

    async fn invoke(&self, payload: &VendorPayload, control: &CallControl) -> Result<Value> {
        let key = require_key(Vendor::OpenAi, &self.endpoint)?;
        let auth = ("authorization".to_string(), format!("Bearer {}", key));
        send(&self.transport, payload, auth, control).await
    }

    fn normalize_response(&self, body: &Value) -> Result<NormalizedResponse> {
        let raw_choices = body
            .get("choices")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::malformed(Vendor::OpenAi, "missing 'choices' array"))?;
        if raw_choices.is_empty() {
            return Err(Error::malformed(Vendor::OpenAi, "'choices' array is empty"));
        }

        let mut choices = Vec::with_capacity(raw_choices.len());
        for (pos, c) in raw_choices.iter().enumerate() {
            let message = c.get("message").ok_or_else(|| {
                Error::malformed(Vendor::OpenAi, format!("choice {} has no 'message'", pos))
            })?;
            // `content` is null for refusals and tool calls.
            let content = message
                .get("content")
                .and_then(Value::as_str)
                .or_else(|| message.get("refusal").and_then(Value::as_str))
                .unwrap_or_default()
                .to_string();
            let index = c
                .get("index")
                .and_then(Value::as_u64)
                .map(|i| i as u32)
                .unwrap_or(pos as u32);
            let finish_reason = c
                .get("finish_reason")
                .and_then(Value::as_str)
                .map(finish_reason)
                .unwrap_or(FinishReason::Other);
            choices.push(Choice {
                index,
                content,
                finish_reason,
            });
        }
        renumber(&mut choices);

        let usage = body.get("usage").map(|u| Usage {
            prompt_tokens: u64_at(u, "prompt_tokens"),
            completion_tokens: u64_at(u, "completion_tokens"),
            total_tokens: u64_at(u, "total_tokens"),
        });

        Ok(NormalizedResponse { choices, usage })
    }
}
