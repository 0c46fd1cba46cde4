//! End-to-end calls through the HTTP adapters against a mock vendor server

use crate::mock_server::*;
use chat_gateway::{ChatRequest, Error, FinishReason, RunOptions, Vendor};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const OPENAI_TWO_CHOICES: &str = r#"{
  "id": "chatcmpl-1",
  "object": "chat.completion",
  "choices": [
    {"index": 0, "message": {"role": "assistant", "content": "Snow scatters all visible light."}, "finish_reason": "stop"},
    {"index": 1, "message": {"role": "assistant", "content": "Ice crystals reflect light."}, "finish_reason": "stop"}
  ],
  "usage": {"prompt_tokens": 12, "completion_tokens": 11, "total_tokens": 23}
}"#;

#[tokio::test]
async fn test_openai_choices_match_n() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            OPENAI_PATH,
            ("authorization", "Bearer test-key"),
            200,
            OPENAI_TWO_CHOICES,
        )
        .await;

    let req = ChatRequest::prompt("gpt-4o", "Why is the snow white?").n(2);
    let result = fixture
        .gateway()
        .run(&req, &RunOptions::silent())
        .await
        .expect("run");

    mock.assert_async().await;
    assert_eq!(result.deployment_name, "gpt-4o");
    assert_eq!(result.choices.len(), 2);
    assert_eq!(result.choices[1].content, "Ice crystals reflect light.");
    assert_eq!(result.usage.expect("usage").total_tokens, 23);
    assert_eq!(result.raw_request["n"], 2);
    assert!(result.raw_response.is_none());
}

#[tokio::test]
async fn test_openai_request_body_carries_parameters() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_matching(
            OPENAI_PATH,
            json!({"model": "gpt-4o", "seed": 42, "frequency_penalty": 1.2, "stop": ["\n\n", "**Training**"]}),
            r#"{"choices": [{"index": 0, "message": {"content": "ok"}, "finish_reason": "stop"}]}"#,
        )
        .await;

    let req = ChatRequest::prompt("gpt-4o", "hi")
        .seed(42)
        .frequency_penalty(1.2)
        .stop(vec!["\n\n", "**Training**"]);
    let options = RunOptions {
        keep_raw_response: true,
        ..RunOptions::silent()
    };
    let result = fixture.gateway().run(&req, &options).await.expect("run");

    mock.assert_async().await;
    assert_eq!(result.content(), Some("ok"));
    assert!(result.raw_response.is_some());
}

#[tokio::test]
async fn test_anthropic_max_tokens_maps_to_length() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            ANTHROPIC_PATH,
            ("x-api-key", TEST_KEY),
            200,
            r#"{
              "id": "msg_1", "type": "message", "role": "assistant",
              "content": [{"type": "text", "text": "A transformer is a"}],
              "stop_reason": "max_tokens",
              "usage": {"input_tokens": 14, "output_tokens": 10}
            }"#,
        )
        .await;

    let req = ChatRequest::prompt("claude-3-5-haiku@20241022", "What is a transformer?")
        .max_tokens(10);
    let result = fixture
        .gateway()
        .run(&req, &RunOptions::silent())
        .await
        .expect("run");

    mock.assert_async().await;
    assert_eq!(result.choices.len(), 1);
    assert_eq!(result.choices[0].finish_reason, FinishReason::Length);
    assert_eq!(result.raw_request["model"], "claude-3-5-haiku-20241022");
    assert_eq!(result.raw_request["max_tokens"], 10);
}

#[tokio::test]
async fn test_gemini_candidates_and_unknown_finish_code() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            &gemini_path("gemini-2.5-pro"),
            ("x-goog-api-key", TEST_KEY),
            200,
            r#"{
              "candidates": [
                {"index": 0, "content": {"parts": [{"text": "Koala"}], "role": "model"}, "finishReason": "STOP"},
                {"index": 1, "content": {"parts": [{"text": "Lynx"}], "role": "model"}, "finishReason": "SOMETHING_NEW"}
              ],
              "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
            }"#,
        )
        .await;

    let req = ChatRequest::prompt("gemini-2.5-pro", "Name a random animal").n(2);
    let result = fixture
        .gateway()
        .run(&req, &RunOptions::silent())
        .await
        .expect("run");

    mock.assert_async().await;
    assert_eq!(result.choices.len(), 2);
    assert_eq!(result.choices[0].finish_reason, FinishReason::Stop);
    assert_eq!(result.choices[1].finish_reason, FinishReason::Other);
    assert_eq!(result.raw_request["generationConfig"]["candidateCount"], 2);
}

#[tokio::test]
async fn test_status_errors_are_vendor_failures() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            OPENAI_PATH,
            ("authorization", "Bearer test-key"),
            429,
            r#"{"error": {"message": "Rate limit reached", "type": "rate_limit_error"}}"#,
        )
        .await;

    let req = ChatRequest::prompt("gpt-4o", "hi");
    let err = fixture
        .gateway()
        .run(&req, &RunOptions::silent())
        .await
        .unwrap_err();
    match err {
        Error::VendorCallFailed { vendor, cause } => {
            assert_eq!(vendor, Vendor::OpenAi);
            assert_eq!(cause.class(), "rate_limited");
            assert!(cause.to_string().contains("Rate limit reached"));
        }
        other => panic!("expected VendorCallFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unparseable_shape_is_malformed() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(
            &gemini_path("gemini-2.5-flash"),
            ("x-goog-api-key", TEST_KEY),
            200,
            r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#,
        )
        .await;

    let req = ChatRequest::prompt("gemini-2.5-flash", "hi");
    let err = fixture
        .gateway()
        .run(&req, &RunOptions::silent())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedVendorResponse {
            vendor: Vendor::Gemini,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cancelled_call_never_reaches_vendor() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable(OPENAI_PATH).await;

    let token = CancellationToken::new();
    token.cancel();
    let req = ChatRequest::prompt("gpt-4o", "hi");
    let err = fixture
        .gateway()
        .run(&req, &RunOptions::silent().with_cancel(token))
        .await
        .unwrap_err();

    mock.assert_async().await;
    match err {
        Error::VendorCallFailed { cause, .. } => assert_eq!(cause.class(), "cancelled"),
        other => panic!("expected VendorCallFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_temperature_makes_no_request() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable(OPENAI_PATH).await;

    let gateway = fixture.gateway();
    for t in [-0.1, 2.5] {
        let req = ChatRequest::prompt("gpt-4o", "hi").temperature(t);
        let err = gateway.run(&req, &RunOptions::silent()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { ref field, .. } if field == "temperature"));
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stop_list_over_limit_fails_before_sending() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable(OPENAI_PATH).await;

    let registry = chat_gateway::ModelRegistry::from_yaml_str(
        r#"
models:
  - deployment_name: gpt-4o-one-stop
    vendor: openai
    vendor_model_id: gpt-4o
    supported_parameters: [stop]
    limits:
      max_stop_sequences: 1
"#,
    )
    .expect("catalog");
    let gateway = chat_gateway::Gateway::builder()
        .config(fixture.config())
        .registry(registry)
        .build()
        .expect("gateway");

    let req = ChatRequest::prompt("gpt-4o-one-stop", "Explain transformers")
        .stop(vec!["\n\n", "**Embedding Layer**"]);
    match gateway.run(&req, &RunOptions::silent()).await {
        Err(Error::InvalidParameter { field, constraint }) => {
            assert_eq!(field, "stop");
            assert!(constraint.contains("at most 1"));
        }
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
    mock.assert_async().await;
}
