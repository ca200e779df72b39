//! Persisted calibration record and its fixed binary layout.
//!
//! Layout (little-endian, `RECORD_LEN` bytes):
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 8    | validity tag     |
//! | 8      | 16   | weights[4] f32   |
//! | 24     | 16   | tolerances[4] f32|
//! | 40     | 4    | offset f32       |

/// Number of object slots.
pub const SLOTS: usize = 4;
/// Size of the validity tag in bytes.
pub const TAG_LEN: usize = 8;
/// Total encoded size of a record.
pub const RECORD_LEN: usize = TAG_LEN + 4 * (2 * SLOTS + 1);
/// Tag stamped by `save_config`: "abc123" followed by NUL fill.
pub const VALIDITY_TAG: [u8; TAG_LEN] = *b"abc123\0\0";

const TAG_TEXT: &[u8] = b"abc123";

const _: () = assert!(SLOTS == weighid_config::OBJECT_SLOTS);
const _: () = assert!(RECORD_LEN == weighid_config::RECORD_LEN);

/// Weights, tolerances and offset for every slot, plus the validity tag.
///
/// The default record is all zeros and therefore not valid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationRecord {
    pub validity_marker: [u8; TAG_LEN],
    pub weights: [f32; SLOTS],
    pub tolerances: [f32; SLOTS],
    pub offset: f32,
}

impl CalibrationRecord {
    /// True when the tag reads "abc123" up to its first NUL.
    pub fn is_valid(&self) -> bool {
        let end = self
            .validity_marker
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TAG_LEN);
        &self.validity_marker[..end] == TAG_TEXT
    }

    pub fn stamp(&mut self) {
        self.validity_marker = VALIDITY_TAG;
    }

    /// Highest-index slot whose tolerance band strictly contains `value`.
    pub fn matching_slot(&self, value: f32) -> Option<usize> {
        let mut found = None;
        for (i, (w, t)) in self.weights.iter().zip(&self.tolerances).enumerate() {
            if (value - w).abs() < *t {
                found = Some(i);
            }
        }
        found
    }

    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[..TAG_LEN].copy_from_slice(&self.validity_marker);
        let floats = self
            .weights
            .iter()
            .chain(&self.tolerances)
            .chain(std::iter::once(&self.offset));
        for (chunk, v) in out[TAG_LEN..].chunks_exact_mut(4).zip(floats) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; RECORD_LEN]) -> Self {
        let mut validity_marker = [0u8; TAG_LEN];
        validity_marker.copy_from_slice(&bytes[..TAG_LEN]);
        let mut floats = bytes[TAG_LEN..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        let mut next = || floats.next().unwrap_or(0.0);
        let weights = std::array::from_fn(|_| next());
        let tolerances = std::array::from_fn(|_| next());
        let offset = next();
        Self {
            validity_marker,
            weights,
            tolerances,
            offset,
        }
    }
}
