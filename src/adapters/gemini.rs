//! Google Gemini `generateContent` adapter. Key differences:
//! - Uses `contents` instead of `messages`, with `parts` instead of `content`.
//! - Roles: `user` and `model` (not `assistant`). System text goes to `systemInstruction`.
//! - `generationConfig` wraps the sampling parameters: `candidateCount` (n),
//!   `maxOutputTokens`, `stopSequences` (up to five), `seed`, and the two penalties.
//! - Response: `candidates[].content.parts[].text` with an upper-case `finishReason`.
//! - The API key travels in the `x-goog-api-key` header.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{checked_stop, renumber, require_key, send, u64_at, VendorAdapter, VendorPayload};
use crate::config::VendorEndpoint;
use crate::registry::{ModelEntry, Vendor};
use crate::transport::{CallControl, HttpTransport};
use crate::types::message::split_system;
use crate::types::{ChatRequest, Choice, FinishReason, MessageRole, NormalizedResponse, Usage};
use crate::{Error, Result};

#[derive(Debug)]
pub struct GeminiAdapter {
    endpoint: VendorEndpoint,
    transport: Arc<HttpTransport>,
}

impl GeminiAdapter {
    pub fn new(endpoint: VendorEndpoint, transport: Arc<HttpTransport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }
}

fn finish_reason(code: &str) -> FinishReason {
    match code {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII"
        | "IMAGE_SAFETY" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

#[async_trait]
impl VendorAdapter for GeminiAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Gemini
    }

    fn translate_request(
        &self,
        request: &ChatRequest,
        entry: &ModelEntry,
    ) -> Result<VendorPayload> {
        let (system, turns) = split_system(&request.messages);
        let contents: Vec<Value> = turns
            .iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut body = json!({ "contents": contents });
        if let Some(sys) = system {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }

        let p = &request.params;
        let mut gen_config = Map::new();
        if let Some(n) = p.n {
            gen_config.insert("candidateCount".into(), json!(n));
        }
        if let Some(t) = p.temperature {
            gen_config.insert("temperature".into(), json!(t));
        }
        if let Some(seed) = p.seed {
            gen_config.insert("seed".into(), json!(seed));
        }
        if let Some(mt) = p.max_tokens {
            gen_config.insert("maxOutputTokens".into(), json!(mt));
        }
        if let Some(fp) = p.frequency_penalty {
            gen_config.insert("frequencyPenalty".into(), json!(fp));
        }
        if let Some(pp) = p.presence_penalty {
            gen_config.insert("presencePenalty".into(), json!(pp));
        }
        if let Some(stop) = &p.stop {
            gen_config.insert("stopSequences".into(), json!(checked_stop(stop, entry)?));
        }
        if !gen_config.is_empty() {
            body["generationConfig"] = Value::Object(gen_config);
        }

        Ok(VendorPayload {
            vendor: Vendor::Gemini,
            url: self.endpoint.url(&format!(
                "v1beta/models/{}:generateContent",
                entry.vendor_model_id
            )),
            headers: Vec::new(),
            body,
        })
    }

    async fn invoke(&self, payload: &VendorPayload, control: &CallControl) -> Result<Value> {
        let key = require_key(Vendor::Gemini, &self.endpoint)?;
        send(
            &self.transport,
            payload,
            ("x-goog-api-key".to_string(), key.to_string()),
            control,
        )
        .await
    }

    fn normalize_response(&self, body: &Value) -> Result<NormalizedResponse> {
        let candidates = match body.get("candidates").and_then(Value::as_array) {
            Some(c) if !c.is_empty() => c,
            _ => {
                let reason = match body
                    .pointer("/promptFeedback/blockReason")
                    .and_then(Value::as_str)
                {
                    Some(block) => format!("prompt blocked ({}), no candidates returned", block),
                    None => "missing 'candidates' array".to_string(),
                };
                return Err(Error::malformed(Vendor::Gemini, reason));
            }
        };

        let mut choices = Vec::with_capacity(candidates.len());
        for (pos, cand) in candidates.iter().enumerate() {
            // Safety-stopped candidates carry no `content`.
            let content: String = cand
                .pointer("/content/parts")
                .and_then(Value::as_array)
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|p| p.get("text").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            let index = cand
                .get("index")
                .and_then(Value::as_u64)
                .map(|i| i as u32)
                .unwrap_or(pos as u32);
            let finish_reason = cand
                .get("finishReason")
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

        let usage = body.get("usageMetadata").map(|u| Usage {
            prompt_tokens: u64_at(u, "promptTokenCount"),
            completion_tokens: u64_at(u, "candidatesTokenCount"),
            total_tokens: u64_at(u, "totalTokenCount"),
        });

        Ok(NormalizedResponse { choices, usage })
    }
}
