//! Mock HTTP server setup for integration tests

use chat_gateway::config::VendorEndpoint;
use chat_gateway::{Gateway, GatewayConfig, Vendor};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TEST_KEY: &str = "test-key";

/// Test fixture that manages a mock server standing in for every vendor
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Config whose three vendor endpoints all point at the mock server
    pub fn config(&self) -> GatewayConfig {
        let mut cfg = GatewayConfig::default();
        for vendor in Vendor::ALL {
            *cfg.endpoint_mut(vendor) = VendorEndpoint::new(&self.base_url)
                .expect("mock url")
                .with_api_key(TEST_KEY);
        }
        cfg
    }

    /// Gateway with the builtin catalog and HTTP adapters aimed at the mock server
    pub fn gateway(&self) -> Gateway {
        Gateway::from_config(self.config()).expect("gateway")
    }

    /// Create a mock for a JSON response, requiring the given header
    pub async fn mock_json_response(
        &self,
        path: &str,
        header: (&str, &str),
        status: u16,
        body: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_header(header.0, header.1)
            .match_header("x-request-id", Matcher::Any)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock that must receive a body containing `partial`
    pub async fn mock_json_matching(
        &self,
        path: &str,
        partial: serde_json::Value,
        body: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_body(Matcher::PartialJson(partial))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Create a mock that must never be hit
    pub async fn mock_unreachable(&self, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await
    }
}

pub const OPENAI_PATH: &str = "/v1/chat/completions";
pub const ANTHROPIC_PATH: &str = "/v1/messages";

pub fn gemini_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}
