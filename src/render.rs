//! Console rendering of completion results.

use std::io::{self, Write};

use serde_json::Value;
use tracing::warn;

use crate::types::CompletionResult;

/// Render `result` to stdout. I/O failures are logged, never raised.
pub fn render(result: &CompletionResult, print_request: bool, print_only_content: bool) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = render_to(&mut out, result, print_request, print_only_content) {
        warn!(error = %e, "failed to render completion result");
    }
}

/// Render into any writer.
///
/// Content-only mode writes each choice's text in index order, one per line, and nothing
/// else. Otherwise the whole result is written as pretty JSON; `raw_request` is included only
/// when `print_request` is set.
pub fn render_to<W: Write>(
    out: &mut W,
    result: &CompletionResult,
    print_request: bool,
    print_only_content: bool,
) -> io::Result<()> {
    if print_only_content {
        let mut choices: Vec<_> = result.choices.iter().collect();
        choices.sort_by_key(|c| c.index);
        for choice in choices {
            writeln!(out, "{}", choice.content)?;
        }
        return out.flush();
    }

    let mut doc = serde_json::to_value(result).map_err(io::Error::from)?;
    if !print_request {
        if let Value::Object(map) = &mut doc {
            map.remove("raw_request");
        }
    }
    serde_json::to_writer_pretty(&mut *out, &doc).map_err(io::Error::from)?;
    writeln!(out)?;
    out.flush()
}
