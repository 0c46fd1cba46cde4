//! # chat-gateway
//!
//! A multi-vendor chat completion gateway: one neutral request shape, one call, three vendor
//! families (OpenAI, Anthropic, Google Gemini).
//!
//! ## Overview
//!
//! Callers name a deployment (`gpt-4o`, `claude-3-5-haiku@20241022`, `gemini-2.5-pro`, ...)
//! and pass messages plus optional generation parameters. The gateway resolves the deployment
//! in its [`registry`], rejects parameters the model does not support or values out of range
//! before any network traffic, translates the request for the vendor, calls it exactly once,
//! and maps the reply onto a shared choice shape.
//!
//! - **Capability-declared**: each registry entry lists the parameters it accepts; anything
//!   else is an [`Error::UnsupportedParameter`], never silently dropped
//! - **Vendor-neutral results**: choices, finish reasons and usage share one vocabulary
//! - **Explicit limits**: stop lists longer than a vendor allows fail instead of being cut
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat_gateway::{ChatRequest, Gateway, GatewayConfig, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> chat_gateway::Result<()> {
//!     let gateway = Gateway::from_config(GatewayConfig::from_env()?)?;
//!
//!     let request = ChatRequest::prompt("gpt-4o", "Name a random animal")
//!         .n(3)
//!         .temperature(0.3);
//!     let result = gateway.run(&request, &RunOptions::silent()).await?;
//!     for choice in &result.choices {
//!         println!("{}: {}", choice.index, choice.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | `Gateway::run`, the builder and run options |
//! | [`registry`] | Deployment catalog and parameter capabilities |
//! | [`adapters`] | Per-vendor request translation and response normalization |
//! | [`transport`] | Shared HTTP client, deadlines and cancellation |
//! | [`types`] | Messages, the neutral request and the normalized result |
//! | [`render`] | Console output of results |
//! | [`harness`] | Smoke-test runner used by `gateway-smoke` |

pub mod adapters;
pub mod config;
pub mod gateway;
pub mod harness;
pub mod registry;
pub mod render;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::GatewayConfig;
pub use gateway::{Gateway, GatewayBuilder, RunOptions};
pub use registry::{ModelEntry, ModelRegistry, Vendor};
pub use types::{
    message::{Message, MessageRole},
    request::{ChatRequest, GenerationParams, Parameter, StopSequences},
    response::{Choice, CompletionResult, FinishReason, Usage},
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
