use reqwest::Proxy;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{CallControl, TransportError};
use crate::config::HttpSettings;
use crate::{Error, Result};

/// Thin JSON-over-HTTP client. One instance is shared by every adapter of a gateway.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(settings.timeout)
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &settings.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration(format!("invalid proxy URL: {}", e)).at("GATEWAY_PROXY_URL")
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// POST `body` as JSON and decode a JSON reply.
    ///
    /// Non-2xx replies become [`TransportError::Status`] with the vendor's error body kept
    /// verbatim for diagnosis.
    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        control: &CallControl,
    ) -> std::result::Result<Value, TransportError> {
        let req = self.request(url, headers, body, control);

        control
            .run(async move {
                let resp = req.send().await?;
                let status = resp.status();
                debug!(%status, url, "vendor replied");
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(TransportError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                let bytes = resp.bytes().await?;
                serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
            })
            .await
    }

    /// A per-call deadline replaces the client-wide `HttpSettings::timeout` for this request,
    /// so it may be longer or shorter than the shared default.
    fn request(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        control: &CallControl,
    ) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url).json(body);
        for (k, v) in headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(id) = &control.request_id {
            req = req.header("x-request-id", id.as_str());
        }
        if let Some(limit) = control.timeout {
            req = req.timeout(limit);
        }
        req
    }
}
