//! Smoke-test harness: run one prompt through a list of deployments and report which ones
//! work end to end.

use std::fmt::Write as _;
use std::io;

use tracing::error;

use crate::gateway::{Gateway, RunOptions};
use crate::types::ChatRequest;

/// Deployments exercised when neither arguments nor `TASK_MODELS` name any.
pub const DEFAULT_MODELS: [&str; 3] = ["gpt-4o", "claude-3-5-haiku@20241022", "gemini-2.5-pro"];

/// Environment variable holding a comma-separated model list.
pub const MODELS_ENV: &str = "TASK_MODELS";

/// Split a comma-separated list, dropping blank entries.
pub fn parse_model_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

/// Arguments win, then the env value, then [`DEFAULT_MODELS`].
pub fn select_models(args: &[String], env_value: Option<&str>) -> Vec<String> {
    if !args.is_empty() {
        return args.to_vec();
    }
    let from_env = env_value.map(parse_model_list).unwrap_or_default();
    if from_env.is_empty() {
        DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
    } else {
        from_env
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutcome {
    pub deployment_name: String,
    pub ok: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SmokeReport {
    pub outcomes: Vec<ModelOutcome>,
    /// The batch stopped early because the cancellation token fired.
    pub interrupted: bool,
}

impl SmokeReport {
    pub fn all_ok(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.ok)
    }

    /// One `name  ->  OK|FAILED` line per model, names padded to a common width.
    pub fn summary_table(&self) -> String {
        let width = self
            .outcomes
            .iter()
            .map(|o| o.deployment_name.len())
            .max()
            .unwrap_or(0);
        let mut table = String::new();
        for o in &self.outcomes {
            let status = if o.ok { "OK" } else { "FAILED" };
            let _ = writeln!(
                table,
                "{:<width$}  ->  {}",
                o.deployment_name,
                status,
                width = width
            );
        }
        table
    }
}

/// Run `prompt` against each model in turn, with model headers on stdout.
///
/// Failures are logged with their full cause chain and never stop the batch. A fired
/// cancellation token does: the current model is recorded as failed and the rest are skipped.
pub async fn run_smoke(
    gateway: &Gateway,
    models: &[String],
    prompt: &str,
    options: &RunOptions,
) -> SmokeReport {
    run_smoke_to(&mut io::stdout(), gateway, models, prompt, options).await
}

/// [`run_smoke`] writing the per-model headers to `out`.
///
/// Headers are written only when `options.render` is set.
pub async fn run_smoke_to<W: io::Write>(
    out: &mut W,
    gateway: &Gateway,
    models: &[String],
    prompt: &str,
    options: &RunOptions,
) -> SmokeReport {
    let mut report = SmokeReport::default();
    let cancelled = || options.cancel.as_ref().is_some_and(|t| t.is_cancelled());

    for model in models {
        if cancelled() {
            report.interrupted = true;
            break;
        }
        if options.render {
            let _ = writeln!(out, "\n===== MODEL: {} =====", model);
            let _ = out.flush();
        }
        let request = ChatRequest::prompt(model.as_str(), prompt);
        let ok = match gateway.run(&request, options).await {
            Ok(_) => true,
            Err(e) => {
                error!(
                    deployment = model.as_str(),
                    error = %error_chain(&e),
                    "model failed"
                );
                false
            }
        };
        report.outcomes.push(ModelOutcome {
            deployment_name: model.clone(),
            ok,
        });
        if cancelled() {
            report.interrupted = true;
            break;
        }
    }
    report
}

/// `err: cause: cause...`, skipping causes the outer message already spells out.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        if !text.ends_with(&msg) {
            let _ = write!(text, ": {}", msg);
        }
        source = cause.source();
    }
    text
}
