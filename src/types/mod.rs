//! Core data types: messages, the neutral request, and the normalized result.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`ChatRequest`] | Deployment name, messages and optional generation parameters |
//! | [`GenerationParams`] | The shared parameter surface (`n`, `temperature`, `seed`, ...) |
//! | [`CompletionResult`] | Normalized choices plus the raw vendor payloads |
//!
//! ```rust
//! use chat_gateway::types::{ChatRequest, Parameter};
//!
//! let req = ChatRequest::prompt("gpt-4o", "Name a random animal")
//!     .seed(42)
//!     .n(5);
//! assert_eq!(req.params.supplied(), vec![Parameter::N, Parameter::Seed]);
//! ```

pub mod message;
pub mod request;
pub mod response;

pub use message::{Message, MessageRole};
pub use request::{ChatRequest, GenerationParams, Parameter, StopSequences};
pub use response::{Choice, CompletionResult, FinishReason, NormalizedResponse, Usage};
