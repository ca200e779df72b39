//! Type-state builder for `ObjectDetector` and the generic `build_detector`
//! constructor.
//!
//! `build()` only exists once a store has been supplied; thresholds are
//! validated at build time.

use weighid_traits::CalibrationStore;

use crate::config::DetectorCfg;
use crate::detector::ObjectDetector;
use crate::error::Result;

/// Marker for a builder that has no store yet.
pub struct Missing;

pub struct DetectorBuilder<S> {
    store: S,
    address: usize,
    cfg: DetectorCfg,
    load: bool,
}

impl Default for DetectorBuilder<Missing> {
    fn default() -> Self {
        Self {
            store: Missing,
            address: 0,
            cfg: DetectorCfg::default(),
            load: false,
        }
    }
}

impl DetectorBuilder<Missing> {
    /// Start building a detector.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S> DetectorBuilder<S> {
    /// Supply the non-volatile store the record lives in.
    pub fn with_store<T: CalibrationStore>(self, store: T) -> DetectorBuilder<T> {
        DetectorBuilder {
            store,
            address: self.address,
            cfg: self.cfg,
            load: self.load,
        }
    }

    /// Byte address of the record inside the store. Default: 0.
    pub fn with_address(mut self, address: usize) -> Self {
        self.address = address;
        self
    }

    pub fn with_config(mut self, cfg: DetectorCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Run `load_config` as part of `build()`.
    pub fn load_on_build(mut self, load: bool) -> Self {
        self.load = load;
        self
    }
}

impl<S: CalibrationStore> DetectorBuilder<S> {
    pub fn build(self) -> Result<ObjectDetector<S>> {
        let mut detector = build_detector(self.store, self.address, self.cfg)?;
        if self.load && !detector.load_config() {
            tracing::warn!(
                address = detector.address,
                "detector built without a valid calibration; it stays inert until one is saved"
            );
        }
        Ok(detector)
    }
}

/// Validate `cfg` and construct a detector with an empty record.
pub fn build_detector<S: CalibrationStore>(
    store: S,
    address: usize,
    cfg: DetectorCfg,
) -> Result<ObjectDetector<S>> {
    cfg.check()?;
    Ok(ObjectDetector::with_parts(store, address, cfg))
}
