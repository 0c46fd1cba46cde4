//! Gateway behavior with an in-process adapter standing in for a vendor

use async_trait::async_trait;
use chat_gateway::adapters::{VendorAdapter, VendorPayload};
use chat_gateway::transport::CallControl;
use chat_gateway::types::NormalizedResponse;
use chat_gateway::{
    ChatRequest, Choice, Error, FinishReason, Gateway, Message, ModelEntry, ModelRegistry,
    Parameter, RunOptions, Vendor,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Echoes the requested choice count back with a fixed finish code
#[derive(Debug)]
struct ScriptedAdapter {
    vendor: Vendor,
    finish_code: &'static str,
    extra_choices: u32,
    invocations: AtomicUsize,
}

impl ScriptedAdapter {
    fn new(vendor: Vendor, finish_code: &'static str) -> Arc<Self> {
        Arc::new(Self {
            vendor,
            finish_code,
            extra_choices: 0,
            invocations: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VendorAdapter for ScriptedAdapter {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn translate_request(
        &self,
        request: &ChatRequest,
        entry: &ModelEntry,
    ) -> chat_gateway::Result<VendorPayload> {
        Ok(VendorPayload {
            vendor: self.vendor,
            url: format!("mock://{}", entry.vendor_model_id),
            headers: Vec::new(),
            body: json!({
                "model": entry.vendor_model_id,
                "n": request.params.choice_count(),
                "prompt": request.messages.last().map(|m| m.content.clone()),
            }),
        })
    }

    async fn invoke(
        &self,
        payload: &VendorPayload,
        _control: &CallControl,
    ) -> chat_gateway::Result<Value> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        let n = payload.body["n"].as_u64().unwrap_or(1) as u32 + self.extra_choices;
        let prompt = payload.body["prompt"].as_str().unwrap_or_default().to_string();
        Ok(json!({
            "items": (0..n).map(|i| format!("{}#{}", prompt, i)).collect::<Vec<_>>(),
            "finish": self.finish_code,
        }))
    }

    fn normalize_response(&self, body: &Value) -> chat_gateway::Result<NormalizedResponse> {
        let items = body["items"]
            .as_array()
            .ok_or_else(|| Error::malformed(self.vendor, "no items"))?;
        let finish_reason = match body["finish"].as_str() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            _ => FinishReason::Other,
        };
        Ok(NormalizedResponse {
            choices: items
                .iter()
                .enumerate()
                .map(|(i, v)| Choice {
                    index: i as u32,
                    content: v.as_str().unwrap_or_default().to_string(),
                    finish_reason,
                })
                .collect(),
            usage: None,
        })
    }
}

fn registry() -> ModelRegistry {
    ModelRegistry::from_entries([
        ModelEntry::new("gpt-4o", Vendor::OpenAi, "gpt-4o", Parameter::ALL).unwrap(),
        ModelEntry::new(
            "claude-3-7-sonnet@20250219",
            Vendor::Anthropic,
            "claude-3-7-sonnet-20250219",
            [Parameter::Temperature, Parameter::MaxTokens, Parameter::Stop],
        )
        .unwrap(),
        ModelEntry::new(
            "gemini-2.5-pro",
            Vendor::Gemini,
            "gemini-2.5-pro",
            [Parameter::N, Parameter::Temperature, Parameter::Stop],
        )
        .unwrap(),
    ])
    .unwrap()
}

struct Harness {
    gateway: Gateway,
    openai: Arc<ScriptedAdapter>,
    anthropic: Arc<ScriptedAdapter>,
    gemini: Arc<ScriptedAdapter>,
}

fn harness_with(openai: Arc<ScriptedAdapter>) -> Harness {
    let anthropic = ScriptedAdapter::new(Vendor::Anthropic, "length");
    let gemini = ScriptedAdapter::new(Vendor::Gemini, "SOMETHING_NEW");
    let gateway = Gateway::builder()
        .registry(registry())
        .adapter(openai.clone())
        .adapter(anthropic.clone())
        .adapter(gemini.clone())
        .build()
        .unwrap();
    Harness {
        gateway,
        openai,
        anthropic,
        gemini,
    }
}

fn harness() -> Harness {
    harness_with(ScriptedAdapter::new(Vendor::OpenAi, "stop"))
}

#[tokio::test]
async fn test_registered_names_reach_their_vendor() {
    let h = harness();
    for name in ["gpt-4o", "claude-3-7-sonnet@20250219", "gemini-2.5-pro"] {
        let result = h
            .gateway
            .run(&ChatRequest::prompt(name, "hi"), &RunOptions::silent())
            .await
            .unwrap();
        assert_eq!(result.deployment_name, name);
    }
    assert_eq!(h.openai.calls(), 1);
    assert_eq!(h.anthropic.calls(), 1);
    assert_eq!(h.gemini.calls(), 1);
}

#[tokio::test]
async fn test_unknown_model_is_rejected_before_any_call() {
    let h = harness();
    let err = h
        .gateway
        .run(&ChatRequest::prompt("gpt-5-turbo", "hi"), &RunOptions::silent())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownModel { ref deployment_name } if deployment_name == "gpt-5-turbo"));
    assert_eq!(h.openai.calls(), 0);
}

#[tokio::test]
async fn test_choice_count_matches_n() {
    let h = harness();
    for (name, n) in [("gpt-4o", 5), ("gemini-2.5-pro", 3)] {
        let req = ChatRequest::prompt(name, "Why is the snow white?").n(n);
        let result = h.gateway.run(&req, &RunOptions::silent()).await.unwrap();
        assert_eq!(result.choices.len(), n as usize);
    }
}

#[tokio::test]
async fn test_n_on_single_choice_vendor_is_unsupported() {
    let h = harness();
    let req = ChatRequest::prompt("claude-3-7-sonnet@20250219", "hi").n(3);
    match h.gateway.run(&req, &RunOptions::silent()).await {
        Err(Error::UnsupportedParameter {
            parameter,
            deployment_name,
        }) => {
            assert_eq!(parameter, "n");
            assert_eq!(deployment_name, "claude-3-7-sonnet@20250219");
        }
        other => panic!("expected UnsupportedParameter, got {:?}", other),
    }
    assert_eq!(h.anthropic.calls(), 0);

    let req = ChatRequest::prompt("claude-3-7-sonnet@20250219", "hi").n(1);
    assert!(h.gateway.run(&req, &RunOptions::silent()).await.is_ok());
}

#[tokio::test]
async fn test_out_of_range_temperature_never_invokes() {
    let h = harness();
    for t in [-0.1, 2.5] {
        let req = ChatRequest::prompt("gpt-4o", "hi").temperature(t);
        let err = h.gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
        assert!(err.is_preflight());
        assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "temperature"));
    }
    assert_eq!(h.openai.calls(), 0);
}

#[tokio::test]
async fn test_unsupported_seed_names_parameter() {
    let h = harness();
    let req = ChatRequest::prompt("gemini-2.5-pro", "hi").seed(42);
    let err = h.gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedParameter { ref parameter, .. } if parameter == "seed"));
    assert_eq!(h.gemini.calls(), 0);
}

#[tokio::test]
async fn test_length_and_unknown_finish_codes() {
    let h = harness();
    let req = ChatRequest::prompt("claude-3-7-sonnet@20250219", "hi").max_tokens(10);
    let result = h.gateway.run(&req, &RunOptions::silent()).await.unwrap();
    assert_eq!(result.choices[0].finish_reason, FinishReason::Length);

    let req = ChatRequest::prompt("gemini-2.5-pro", "hi");
    let result = h.gateway.run(&req, &RunOptions::silent()).await.unwrap();
    assert_eq!(result.choices[0].finish_reason, FinishReason::Other);
}

#[tokio::test]
async fn test_extra_choices_are_malformed() {
    let openai = Arc::new(ScriptedAdapter {
        vendor: Vendor::OpenAi,
        finish_code: "stop",
        extra_choices: 1,
        invocations: AtomicUsize::new(0),
    });
    let h = harness_with(openai);
    let req = ChatRequest::prompt("gpt-4o", "hi").n(2);
    let err = h.gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedVendorResponse {
            vendor: Vendor::OpenAi,
            ..
        }
    ));
}

#[tokio::test]
async fn test_concurrent_runs_do_not_interfere() {
    let h = harness();
    let a = ChatRequest::prompt("gpt-4o", "alpha").n(2);
    let b = ChatRequest::prompt("gemini-2.5-pro", "beta").n(3);
    let opts = RunOptions::silent();
    let (ra, rb) = tokio::join!(h.gateway.run(&a, &opts), h.gateway.run(&b, &opts));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert_eq!(ra.choices.len(), 2);
    assert!(ra.choices.iter().all(|c| c.content.starts_with("alpha#")));
    assert_eq!(rb.choices.len(), 3);
    assert!(rb.choices.iter().all(|c| c.content.starts_with("beta#")));
}

#[tokio::test]
async fn test_empty_messages_are_invalid() {
    let h = harness();
    let req = ChatRequest::new("gpt-4o", Vec::new());
    let err = h.gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "messages"));
}

#[tokio::test]
async fn test_system_only_conversation_never_reaches_vendor() {
    let h = harness();
    let req = ChatRequest::new(
        "claude-3-7-sonnet@20250219",
        vec![Message::system("be brief")],
    );
    let err = h.gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "messages"));
    assert_eq!(h.anthropic.calls(), 0);
}
