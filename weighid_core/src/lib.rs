#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Weight-based object detection for a smart scale (hardware-agnostic).
//!
//! Readings come from any `weighid_traits::Scale`; the calibration record is
//! persisted through any `weighid_traits::CalibrationStore`.
//!
//! ## Architecture
//!
//! - **Calibration**: fixed 44-byte record of weights/tolerances/offset with a
//!   validity tag (`calibration` module)
//! - **Detection**: debounced slot matching (`ObjectDetector`)
//! - **Configuration**: runtime thresholds and pacing (`config` module)
//! - **Sampling**: background reader thread (`sampler`) and run loop (`runner`)
//! - **Status**: classification outcomes (`status` module)
//!
//! ## Example
//!
//! ```
//! use weighid_core::{ObjectDetector, Outcome};
//! use weighid_hardware::MemoryEeprom;
//!
//! let mut det = ObjectDetector::new(MemoryEeprom::new(64), 0);
//! det.set_object(1, 100.0, 5.0);
//! det.save_config().unwrap();
//!
//! let outcomes: Vec<Outcome> = (0..4).map(|_| det.process(101.0)).collect();
//! assert_eq!(outcomes[3], Outcome::Object(1));
//! ```

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod detector;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod util;

pub use builder::{DetectorBuilder, build_detector};
pub use calibration::{CalibrationRecord, RECORD_LEN, SLOTS, VALIDITY_TAG};
pub use config::{DetectorCfg, SamplingCfg};
pub use detector::ObjectDetector;
pub use error::{BuildError, DetectorError};
pub use runner::{Event, MonitorSummary, RunParams, SamplingMode};
pub use status::{Outcome, TrackedObject};
