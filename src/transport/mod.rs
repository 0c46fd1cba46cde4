//! HTTP transport shared by the vendor adapters.

pub mod http;

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use http::HttpTransport;

/// Failure below the vendor protocol: connection, status, deadline, cancellation, decoding.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} ({}): {body}", status_class(*.status))]
    Status { status: u16, body: String },

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("call cancelled")]
    Cancelled,

    #[error("missing credentials: {0}")]
    Unauthenticated(String),

    #[error("response body is not JSON: {0}")]
    Decode(String),
}

impl TransportError {
    /// Standard error class, following the vendor-neutral status vocabulary.
    pub fn class(&self) -> &'static str {
        match self {
            TransportError::Status { status, .. } => status_class(*status),
            TransportError::Timeout(_) => "timeout",
            TransportError::Cancelled => "cancelled",
            TransportError::Unauthenticated(_) => "authentication",
            TransportError::Http(e) if e.is_timeout() => "timeout",
            TransportError::Http(_) | TransportError::Decode(_) => "other",
        }
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        400 | 422 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        503 | 529 => "overloaded",
        500..=599 => "server_error",
        _ => "other",
    }
}

/// Per-call controls: correlation id, deadline, and cancellation.
#[derive(Debug, Clone, Default)]
pub struct CallControl {
    pub request_id: Option<String>,
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl CallControl {
    /// Drive `fut` under this call's deadline and cancellation token.
    ///
    /// Cancellation is checked first, so an already-cancelled token never lets the call start.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, TransportError>
    where
        F: Future<Output = Result<T, TransportError>>,
    {
        let timed = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(r) => r,
                    Err(_) => Err(TransportError::Timeout(limit)),
                },
                None => fut.await,
            }
        };

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(TransportError::Cancelled),
                    r = timed => r,
                }
            }
            None => timed.await,
        }
    }
}
