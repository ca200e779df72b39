//! Human-readable error descriptions and structured JSON error formatting.

use weighid_core::error::{BuildError, DetectorError};
use weighid_hardware::HwError;

fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid detector settings ({msg}).\nLikely causes: Out-of-range values in [detector].\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(de) = err.downcast_ref::<DetectorError>() {
        return match de {
            DetectorError::Timeout => "What happened: No reading arrived in time.\nLikely causes: Sensor stalled or sampling.sensor_timeout_ms too low.\nHow to fix: Check the input source and consider raising sampling.sensor_timeout_ms.".to_string(),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return format!(
            "What happened: The calibration store could not be opened ({hw}).\nLikely causes: store.path points at a directory or an unreadable file.\nHow to fix: Check store.path and its permissions."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = chain_text(err);
    let lower = msg.to_ascii_lowercase();

    if lower.contains("objects csv must have headers") {
        return "Invalid headers in objects CSV. Expected 'slot,weight,tolerance'.".to_string();
    }

    if lower.starts_with("reading config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path or missing permissions.\nHow to fix: Pass --config <FILE> pointing at a readable TOML file. ({msg})"
        );
    }

    if lower.starts_with("invalid configuration") || lower.starts_with("parsing config") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [store] section or out-of-range values.\nHow to fix: Edit the TOML config and try again. ({msg})"
        );
    }

    if lower.starts_with("invalid object") {
        return format!(
            "What happened: Rejected object calibration.\nLikely causes: Slot outside 0..=3, or a non-finite or negative tolerance.\nHow to fix: Check the --slot/--weight/--tolerance values. ({msg})"
        );
    }

    // Generic fallback
    format!(
        "Something went wrong: {msg}\nHow to fix: Re-run with --log-level=debug for details."
    )
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "InvalidConfig";
    }
    if let Some(de) = err.downcast_ref::<DetectorError>() {
        return match de {
            DetectorError::Hardware(_) => "Hardware",
            DetectorError::HardwareFault(_) => "HardwareFault",
            DetectorError::Timeout => "Timeout",
            DetectorError::EndOfStream => "EndOfStream",
        };
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Store";
    }
    "Error"
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
