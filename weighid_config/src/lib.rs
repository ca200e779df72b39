#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and object-calibration parsing for the weighid detector.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - The objects CSV loader enforces exact headers and applies the same slot
//!   rules as the `[[objects]]` table.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Number of object slots in a calibration record.
pub const OBJECT_SLOTS: usize = 4;

/// Size in bytes of the persisted calibration record.
pub const RECORD_LEN: usize = 8 + 4 * OBJECT_SLOTS * 2 + 4;

/// One calibrated object.
///
/// Expected CSV headers:
/// slot,weight,tolerance
///
/// Example:
/// slot,weight,tolerance
/// 1,100.0,5.0
/// 2,250.0,5.0
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ObjectRow {
    pub slot: usize,
    pub weight: f32,
    pub tolerance: f32,
}

#[derive(Debug, Deserialize)]
pub struct StoreCfg {
    /// Path of the EEPROM image on the host.
    pub path: PathBuf,
    /// Byte address of the calibration record inside the image.
    #[serde(default)]
    pub address: usize,
    /// Size of the EEPROM image in bytes.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    512
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DetectorCfg {
    /// Readings closer than this to the previous one count as unchanged.
    pub change_threshold: f32,
    /// Readings closer than this to zero mean the scale is empty.
    pub no_object_threshold: f32,
    /// Stable readings needed before a candidate is reported.
    pub match_samples: u32,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            change_threshold: 0.04,
            no_object_threshold: 0.04,
            match_samples: 4,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Read the scale inside the classification loop.
    #[default]
    Direct,
    /// Sample on a background thread at `sample_rate_hz`.
    Paced,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SamplingCfg {
    pub mode: SamplingMode,
    pub sample_rate_hz: u32,
    /// Max sensor wait per read (ms). Also accepts alias "sensor_ms".
    #[serde(alias = "sensor_ms")]
    pub sensor_timeout_ms: u64,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Direct,
            sample_rate_hz: 10,
            sensor_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub store: StoreCfg,
    #[serde(default)]
    pub detector: DetectorCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub logging: Logging,
    /// Optional offset applied by `import`.
    #[serde(default)]
    pub offset: Option<f32>,
    /// Optional seed calibration applied by `import`.
    #[serde(default)]
    pub objects: Vec<ObjectRow>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Check slot bounds, uniqueness and numeric sanity of object rows.
pub fn validate_objects(rows: &[ObjectRow]) -> eyre::Result<()> {
    let mut seen = [false; OBJECT_SLOTS];
    for (i, row) in rows.iter().enumerate() {
        if row.slot >= OBJECT_SLOTS {
            eyre::bail!(
                "object {i}: slot {} out of range (0..{OBJECT_SLOTS})",
                row.slot
            );
        }
        if seen[row.slot] {
            eyre::bail!("object {i}: duplicate slot {}", row.slot);
        }
        seen[row.slot] = true;
        if !row.weight.is_finite() {
            eyre::bail!("object {i}: weight must be finite");
        }
        if !row.tolerance.is_finite() || row.tolerance < 0.0 {
            eyre::bail!("object {i}: tolerance must be finite and >= 0");
        }
    }
    Ok(())
}

pub fn load_objects_csv(path: &Path) -> eyre::Result<Vec<ObjectRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open objects CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["slot", "weight", "tolerance"];
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != expected {
        eyre::bail!(
            "objects CSV must have headers 'slot,weight,tolerance', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ObjectRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("objects CSV {:?} has no rows", path);
    }
    validate_objects(&rows)?;
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Store
        if self.store.path.as_os_str().is_empty() {
            eyre::bail!("store.path must not be empty");
        }
        match self.store.address.checked_add(RECORD_LEN) {
            Some(end) if end <= self.store.capacity => {}
            _ => eyre::bail!(
                "store.capacity ({}) must hold a {RECORD_LEN}-byte record at store.address ({})",
                self.store.capacity,
                self.store.address
            ),
        }

        // Detector
        if !(self.detector.change_threshold.is_finite() && self.detector.change_threshold > 0.0) {
            eyre::bail!("detector.change_threshold must be finite and > 0");
        }
        if !(self.detector.no_object_threshold.is_finite()
            && self.detector.no_object_threshold > 0.0)
        {
            eyre::bail!("detector.no_object_threshold must be finite and > 0");
        }
        if self.detector.match_samples < 2 {
            eyre::bail!("detector.match_samples must be >= 2");
        }

        // Sampling
        if self.sampling.sample_rate_hz == 0 {
            eyre::bail!("sampling.sample_rate_hz must be > 0");
        }
        if self.sampling.sensor_timeout_ms == 0 {
            eyre::bail!("sampling.sensor_timeout_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        // Calibration seed
        if let Some(offset) = self.offset
            && !offset.is_finite()
        {
            eyre::bail!("offset must be finite");
        }
        validate_objects(&self.objects)?;

        Ok(())
    }
}
