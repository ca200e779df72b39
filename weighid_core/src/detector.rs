//! The object detector (`ObjectDetector`).
//!
//! Holds the calibration record and the debounce state, classifies readings,
//! and loads/saves the record through a `CalibrationStore`.

use eyre::WrapErr;
use weighid_traits::CalibrationStore;

use crate::calibration::{CalibrationRecord, RECORD_LEN, SLOTS};
use crate::config::DetectorCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::status::{Outcome, TrackedObject};

/// Debounced classifier over a calibration record persisted at `address`.
pub struct ObjectDetector<S: CalibrationStore> {
    pub(crate) store: S,
    pub(crate) address: usize,
    pub(crate) cfg: DetectorCfg,
    pub(crate) record: CalibrationRecord,

    pub(crate) current: TrackedObject,
    pub(crate) stable_count: u32,
    pub(crate) previous: f32,
}

impl<S: CalibrationStore> core::fmt::Debug for ObjectDetector<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectDetector")
            .field("address", &self.address)
            .field("calibrated", &self.record.is_valid())
            .field("current", &self.current)
            .field("stable_count", &self.stable_count)
            .field("previous", &self.previous)
            .finish()
    }
}

impl<S: CalibrationStore> ObjectDetector<S> {
    /// Detector with default thresholds and an empty (invalid) record.
    /// Call `load_config` to restore a saved calibration.
    pub fn new(store: S, address: usize) -> Self {
        Self::with_parts(store, address, DetectorCfg::default())
    }

    pub(crate) fn with_parts(store: S, address: usize, cfg: DetectorCfg) -> Self {
        Self {
            store,
            address,
            cfg,
            record: CalibrationRecord::default(),
            current: TrackedObject::NoObject,
            stable_count: 0,
            previous: 0.0,
        }
    }

    /// Classify one reading.
    ///
    /// A new candidate is only reported after `match_samples` consecutive
    /// readings stay within `change_threshold` of each other (the adopting
    /// reading counts as the first). The confirmation fires once per stable
    /// run; the counter then restarts.
    pub fn process(&mut self, value: f32) -> Outcome {
        if !self.record.is_valid() {
            return Outcome::NoChange;
        }

        if (value - self.previous).abs() < self.cfg.change_threshold {
            if let TrackedObject::Candidate(slot) = self.current {
                self.stable_count += 1;
                if self.stable_count >= self.cfg.match_samples {
                    self.stable_count = 0;
                    tracing::debug!(slot, value, "object confirmed");
                    return Outcome::Object(slot);
                }
            }
            return Outcome::NoChange;
        }

        if value.abs() < self.cfg.no_object_threshold {
            self.previous = value;
            self.current = TrackedObject::NoObject;
            self.stable_count = 0;
            return Outcome::NoObject;
        }

        let matched = self.record.matching_slot(value);
        self.previous = value;

        let Some(slot) = matched else {
            self.current = TrackedObject::NoMatch;
            self.stable_count = 0;
            return Outcome::NoMatch;
        };

        if self.current != TrackedObject::Candidate(slot) {
            tracing::debug!(slot, value, "new candidate");
            self.current = TrackedObject::Candidate(slot);
            self.stable_count = 1;
            return Outcome::NoChange;
        }

        // Same candidate, reading still moving: keep the count, report nothing.
        Outcome::NoChange
    }

    /// Set slot `index`; out-of-range indices are ignored.
    pub fn set_object(&mut self, index: usize, weight: f32, tolerance: f32) {
        if index < SLOTS {
            self.record.weights[index] = weight;
            self.record.tolerances[index] = tolerance;
        }
    }

    /// Weight of slot `index` for `0 < index < SLOTS`, else 0.0.
    ///
    /// Slot 0 is deliberately reported as 0.0 here; use `object` to read it.
    pub fn get_object_weight(&self, index: usize) -> f32 {
        if index > 0 && index < SLOTS {
            self.record.weights[index]
        } else {
            0.0
        }
    }

    /// `(weight, tolerance)` of any valid slot.
    pub fn object(&self, index: usize) -> Option<(f32, f32)> {
        (index < SLOTS).then(|| (self.record.weights[index], self.record.tolerances[index]))
    }

    /// Apply a batch of calibrated objects, e.g. from config or CSV.
    pub fn apply_objects(&mut self, rows: &[weighid_config::ObjectRow]) {
        for row in rows {
            self.set_object(row.slot, row.weight, row.tolerance);
        }
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.record.offset = offset;
    }

    pub fn get_offset(&self) -> f32 {
        self.record.offset
    }

    /// Read the record at the configured address.
    ///
    /// Returns false and resets to the all-zero record when the tag does not
    /// match or the store cannot be read.
    pub fn load_config(&mut self) -> bool {
        let mut buf = [0u8; RECORD_LEN];
        if let Err(e) = self.store.read(self.address, &mut buf) {
            let err = map_hw_error(&*e);
            tracing::warn!(address = self.address, error = %err, "calibration read failed; using defaults");
            self.record = CalibrationRecord::default();
            return false;
        }

        let record = CalibrationRecord::from_bytes(&buf);
        if !record.is_valid() {
            tracing::info!(address = self.address, "no valid calibration record; using defaults");
            self.record = CalibrationRecord::default();
            return false;
        }

        self.record = record;
        tracing::info!(
            address = self.address,
            offset = record.offset,
            "calibration loaded"
        );
        true
    }

    /// Stamp the validity tag, write the record and commit the store.
    pub fn save_config(&mut self) -> Result<()> {
        self.record.stamp();
        let bytes = self.record.to_bytes();
        self.store
            .write(self.address, &bytes)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("writing calibration record")?;
        self.store
            .commit()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("committing calibration store")?;
        tracing::info!(address = self.address, bytes = RECORD_LEN, "calibration saved");
        Ok(())
    }

    /// True when the record in effect carries a valid tag.
    pub fn is_calibrated(&self) -> bool {
        self.record.is_valid()
    }

    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    pub fn current_object(&self) -> TrackedObject {
        self.current
    }

    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    pub fn previous_value(&self) -> f32 {
        self.previous
    }

    pub fn config(&self) -> &DetectorCfg {
        &self.cfg
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weighid_hardware::MemoryEeprom;

    fn calibrated() -> ObjectDetector<MemoryEeprom> {
        let mut d = ObjectDetector::new(MemoryEeprom::new(64), 0);
        d.set_object(0, 0.0, 0.0);
        d.set_object(1, 100.0, 5.0);
        d.set_object(2, 250.0, 5.0);
        d.set_object(3, 500.0, 5.0);
        d.save_config().unwrap();
        d
    }

    #[test]
    fn uncalibrated_detector_is_inert() {
        let mut d = ObjectDetector::new(MemoryEeprom::new(64), 0);
        d.set_object(1, 100.0, 5.0);
        for v in [0.0, 101.0, 101.0, 101.0, 101.0, 101.0] {
            assert_eq!(d.process(v), Outcome::NoChange);
        }
        assert_eq!(d.current_object(), TrackedObject::NoObject);
        assert_eq!(d.previous_value(), 0.0);
    }

    #[test]
    fn repeat_candidate_while_moving_keeps_count() {
        let mut d = calibrated();
        assert_eq!(d.process(101.0), Outcome::NoChange);
        assert_eq!(d.process(101.0), Outcome::NoChange);
        assert_eq!(d.stable_count(), 2);
        // Still slot 1 but a significant change.
        assert_eq!(d.process(102.0), Outcome::NoChange);
        assert_eq!(d.stable_count(), 2);
        assert_eq!(d.current_object(), TrackedObject::Candidate(1));
        assert_eq!(d.process(102.0), Outcome::NoChange);
        assert_eq!(d.process(102.0), Outcome::Object(1));
    }

    #[test]
    fn object_accessor_includes_slot_zero() {
        let mut d = ObjectDetector::new(MemoryEeprom::new(64), 0);
        d.set_object(0, 12.0, 1.0);
        assert_eq!(d.object(0), Some((12.0, 1.0)));
        assert_eq!(d.get_object_weight(0), 0.0);
        assert_eq!(d.object(SLOTS), None);
    }
}
