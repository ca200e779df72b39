//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "weighid", version, about = "Smart-scale object calibration and replay")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/weighid.toml")]
    pub config: PathBuf,

    /// Print results and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); falls back to [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the calibration record stored at the configured address
    Show,
    /// Calibrate one object slot and save the record
    SetObject {
        /// Slot index (0..=3)
        #[arg(long)]
        slot: usize,
        /// Reference weight of the object
        #[arg(long, allow_negative_numbers = true)]
        weight: f32,
        /// Accepted distance from the reference weight (exclusive)
        #[arg(long)]
        tolerance: f32,
    },
    /// Set the stored offset and save the record
    SetOffset {
        #[arg(long, allow_negative_numbers = true)]
        offset: f32,
    },
    /// Apply [[objects]] and offset from the config, or rows from a CSV, then save
    Import {
        /// Objects CSV with header `slot,weight,tolerance`
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Replay readings (one per line) through the detector
    Classify {
        /// Readings file; `-` or absent reads stdin
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Also print readings that produced no change
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
        /// Feed readings through the paced sampler at [sampling].sample_rate_hz
        #[arg(long, action = ArgAction::SetTrue)]
        paced: bool,
        /// Stop after this many readings
        #[arg(long, value_name = "N")]
        max_samples: Option<u64>,
    },
    /// Health check for operational monitoring
    Health,
}
