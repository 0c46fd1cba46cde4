//! Vendor-neutral chat-completion request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::message::Message;

/// Generation parameters shared across vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    N,
    Temperature,
    Seed,
    MaxTokens,
    FrequencyPenalty,
    PresencePenalty,
    Stop,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::N,
        Parameter::Temperature,
        Parameter::Seed,
        Parameter::MaxTokens,
        Parameter::FrequencyPenalty,
        Parameter::PresencePenalty,
        Parameter::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::N => "n",
            Parameter::Temperature => "temperature",
            Parameter::Seed => "seed",
            Parameter::MaxTokens => "max_tokens",
            Parameter::FrequencyPenalty => "frequency_penalty",
            Parameter::PresencePenalty => "presence_penalty",
            Parameter::Stop => "stop",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("unknown generation parameter '{}'", s))
    }
}

/// `stop` accepts either one string or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    Single(String),
    Many(Vec<String>),
}

impl StopSequences {
    pub fn as_slice(&self) -> &[String] {
        match self {
            StopSequences::Single(s) => std::slice::from_ref(s),
            StopSequences::Many(v) => v,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for StopSequences {
    fn from(s: &str) -> Self {
        StopSequences::Single(s.to_string())
    }
}

impl From<String> for StopSequences {
    fn from(s: String) -> Self {
        StopSequences::Single(s)
    }
}

impl From<Vec<String>> for StopSequences {
    fn from(v: Vec<String>) -> Self {
        StopSequences::Many(v)
    }
}

impl From<Vec<&str>> for StopSequences {
    fn from(v: Vec<&str>) -> Self {
        StopSequences::Many(v.into_iter().map(String::from).collect())
    }
}

/// Optional generation parameters. `None` means "not supplied by the caller" and is never
/// forwarded to a vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
}

impl GenerationParams {
    /// Parameters the caller actually set, in declaration order.
    pub fn supplied(&self) -> Vec<Parameter> {
        let mut out = Vec::new();
        if self.n.is_some() {
            out.push(Parameter::N);
        }
        if self.temperature.is_some() {
            out.push(Parameter::Temperature);
        }
        if self.seed.is_some() {
            out.push(Parameter::Seed);
        }
        if self.max_tokens.is_some() {
            out.push(Parameter::MaxTokens);
        }
        if self.frequency_penalty.is_some() {
            out.push(Parameter::FrequencyPenalty);
        }
        if self.presence_penalty.is_some() {
            out.push(Parameter::PresencePenalty);
        }
        if self.stop.is_some() {
            out.push(Parameter::Stop);
        }
        out
    }

    /// Number of choices the caller expects back.
    pub fn choice_count(&self) -> u32 {
        self.n.unwrap_or(1)
    }
}

/// One chat-completion call, before it is bound to a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub deployment_name: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub params: GenerationParams,
}

impl ChatRequest {
    pub fn new(deployment_name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            deployment_name: deployment_name.into(),
            messages,
            params: GenerationParams::default(),
        }
    }

    /// Single user message, the shape interactive demos use.
    pub fn prompt(deployment_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(deployment_name, vec![Message::user(text)])
    }

    pub fn n(mut self, n: u32) -> Self {
        self.params.n = Some(n);
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.params.temperature = Some(t);
        self
    }

    pub fn seed(mut self, seed: i64) -> Self {
        self.params.seed = Some(seed);
        self
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.params.max_tokens = Some(max);
        self
    }

    pub fn frequency_penalty(mut self, p: f64) -> Self {
        self.params.frequency_penalty = Some(p);
        self
    }

    pub fn presence_penalty(mut self, p: f64) -> Self {
        self.params.presence_penalty = Some(p);
        self
    }

    pub fn stop(mut self, stop: impl Into<StopSequences>) -> Self {
        self.params.stop = Some(stop.into());
        self
    }
}
