//! Pre-flight request checks. Everything here runs before any network traffic.

use crate::registry::ModelEntry;
use crate::types::{ChatRequest, MessageRole, Parameter, StopSequences};
use crate::{Error, Result};

const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
const PENALTY_RANGE: (f64, f64) = (-2.0, 2.0);

/// Every supplied parameter must be declared by the resolved entry.
///
/// `n = 1` is the universal default and passes for every model.
pub(crate) fn check_supported(request: &ChatRequest, entry: &ModelEntry) -> Result<()> {
    for p in request.params.supplied() {
        if p == Parameter::N && request.params.n == Some(1) {
            continue;
        }
        if !entry.supports(p) {
            return Err(Error::unsupported(p.as_str(), &entry.deployment_name));
        }
    }
    Ok(())
}

/// Range and type checks: neutral ranges first, then the entry's tighter limits.
pub(crate) fn check_ranges(request: &ChatRequest, entry: &ModelEntry) -> Result<()> {
    if request.messages.is_empty() {
        return Err(Error::invalid("messages", "at least one message is required"));
    }
    if request.messages.iter().all(|m| m.role == MessageRole::System) {
        return Err(Error::invalid(
            "messages",
            "at least one user or assistant message is required",
        ));
    }

    let p = &request.params;
    if let Some(n) = p.n {
        if n < 1 {
            return Err(Error::invalid("n", "must be >= 1, got 0"));
        }
        if let Some(max) = entry.limits.max_n {
            if n > max {
                return Err(Error::invalid(
                    "n",
                    format!("'{}' allows at most {}, got {}", entry.deployment_name, max, n),
                ));
            }
        }
    }
    if let Some(t) = p.temperature {
        in_range(Parameter::Temperature, t, TEMPERATURE_RANGE)?;
        if t > entry.limits.temperature_max {
            return Err(Error::invalid(
                "temperature",
                format!(
                    "'{}' allows at most {}, got {}",
                    entry.deployment_name, entry.limits.temperature_max, t
                ),
            ));
        }
    }
    if let Some(0) = p.max_tokens {
        return Err(Error::invalid("max_tokens", "must be >= 1, got 0"));
    }
    if let Some(v) = p.frequency_penalty {
        in_range(Parameter::FrequencyPenalty, v, PENALTY_RANGE)?;
    }
    if let Some(v) = p.presence_penalty {
        in_range(Parameter::PresencePenalty, v, PENALTY_RANGE)?;
    }
    if let Some(stop) = &p.stop {
        check_stop(stop)?;
    }
    Ok(())
}

fn in_range(p: Parameter, value: f64, (lo, hi): (f64, f64)) -> Result<()> {
    // NaN fails `contains` as well.
    if (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid(
            p.as_str(),
            format!("must be within [{:.1}, {:.1}], got {}", lo, hi, value),
        ))
    }
}

fn check_stop(stop: &StopSequences) -> Result<()> {
    if stop.is_empty() {
        return Err(Error::invalid("stop", "sequence list must not be empty"));
    }
    if let Some(pos) = stop.as_slice().iter().position(String::is_empty) {
        return Err(Error::invalid(
            "stop",
            format!("entry {} is an empty string", pos),
        ));
    }
    Ok(())
}
