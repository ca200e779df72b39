//! Replay recorded readings through the detector.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use serde_json::json;
use weighid_config::Config;
use weighid_core::runner::{self, Event, MonitorSummary, RunParams, SamplingMode};
use weighid_core::{Outcome, SamplingCfg};
use weighid_hardware::SimulatedScale;

use crate::calibrate::open_detector;

#[derive(Debug)]
pub struct ClassifyArgs {
    pub input: Option<PathBuf>,
    pub all: bool,
    pub paced: bool,
    pub max_samples: Option<u64>,
}

/// One reading per line; blank lines and `#` comments are skipped.
fn parse_readings(reader: impl BufRead) -> eyre::Result<Vec<f32>> {
    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.wrap_err("reading input")?;
        let text = line.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let v: f32 = text
            .parse()
            .wrap_err_with(|| format!("line {}: invalid reading {text:?}", idx + 1))?;
        out.push(v);
    }
    Ok(out)
}

fn read_input(input: Option<&PathBuf>) -> eyre::Result<Vec<f32>> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            let file = std::fs::File::open(path)
                .wrap_err_with(|| format!("opening readings {}", path.display()))?;
            parse_readings(BufReader::new(file))
        }
        _ => parse_readings(std::io::stdin().lock()),
    }
}

fn print_event(e: &Event, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "sample": e.sample,
                "value": e.value,
                "outcome": e.outcome.name(),
                "code": e.outcome.code(),
                "slot": e.outcome.slot(),
            })
        );
    } else {
        println!("#{:<5} {:>10.3} -> {}", e.sample, e.value, e.outcome);
    }
}

fn print_summary(s: &MonitorSummary, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "summary": {
                    "samples": s.samples,
                    "confirmations": s.confirmations,
                    "no_object": s.no_object,
                    "no_match": s.no_match,
                }
            })
        );
    } else {
        println!(
            "samples={} confirmations={:?} no_object={} no_match={}",
            s.samples, s.confirmations, s.no_object, s.no_match
        );
    }
}

pub fn classify(cfg: &Config, args: &ClassifyArgs, json: bool) -> eyre::Result<()> {
    let readings = read_input(args.input.as_ref())?;
    let mut det = open_detector(cfg)?;

    let sampling = SamplingCfg::from(&cfg.sampling);
    let mode = if args.paced {
        SamplingMode::Paced(sampling.sample_rate_hz)
    } else {
        SamplingMode::from(&cfg.sampling)
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    let params = RunParams {
        mode,
        sensor_timeout: sampling.sensor_timeout(),
        max_samples: args.max_samples,
        shutdown: Some(shutdown),
    };
    let summary = runner::run(&mut det, SimulatedScale::new(readings), &params, |e| {
        if args.all || e.outcome != Outcome::NoChange {
            print_event(e, json);
        }
    })?;
    print_summary(&summary, json);
    Ok(())
}
