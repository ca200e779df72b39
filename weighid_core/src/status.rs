//! Classification results returned by `ObjectDetector::process`.

use std::fmt;

use crate::calibration::SLOTS;

/// Result of feeding one reading to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Nothing to report (stable, debouncing, or not calibrated).
    NoChange,
    /// The reading changed but matches no calibrated slot.
    NoMatch,
    /// The scale is empty.
    NoObject,
    /// The object in this slot has been confirmed.
    Object(usize),
}

impl Outcome {
    pub const NO_CHANGE: i32 = -3;
    pub const NO_MATCH: i32 = -2;
    pub const NO_OBJECT: i32 = -1;

    /// Integer code: the sentinels above, or the slot index.
    pub fn code(self) -> i32 {
        match self {
            Self::NoChange => Self::NO_CHANGE,
            Self::NoMatch => Self::NO_MATCH,
            Self::NoObject => Self::NO_OBJECT,
            Self::Object(slot) => i32::try_from(slot).unwrap_or(i32::MAX),
        }
    }

    /// Inverse of [`Outcome::code`]. Codes past the last slot are rejected.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::NO_CHANGE => Some(Self::NoChange),
            Self::NO_MATCH => Some(Self::NoMatch),
            Self::NO_OBJECT => Some(Self::NoObject),
            c => usize::try_from(c)
                .ok()
                .filter(|&slot| slot < SLOTS)
                .map(Self::Object),
        }
    }

    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Object(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NoChange => "no_change",
            Self::NoMatch => "no_match",
            Self::NoObject => "no_object",
            Self::Object(_) => "object",
        }
    }
}

impl From<Outcome> for i32 {
    fn from(o: Outcome) -> Self {
        o.code()
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(slot) => write!(f, "object {slot}"),
            other => f.write_str(other.name()),
        }
    }
}

/// What the detector currently believes is on the scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackedObject {
    #[default]
    NoObject,
    NoMatch,
    /// Slot seen but not necessarily confirmed yet.
    Candidate(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for o in [
            Outcome::NoChange,
            Outcome::NoMatch,
            Outcome::NoObject,
            Outcome::Object(0),
            Outcome::Object(3),
        ] {
            assert_eq!(Outcome::from_code(o.code()), Some(o));
        }
        assert_eq!(i32::from(Outcome::NoChange), -3);
        assert_eq!(Outcome::from_code(-4), None);
    }

    #[test]
    fn codes_past_last_slot_are_rejected() {
        assert_eq!(Outcome::from_code(3), Some(Outcome::Object(3)));
        assert_eq!(Outcome::from_code(4), None);
        assert_eq!(Outcome::from_code(i32::MAX), None);
    }

    #[test]
    fn display_names() {
        assert_eq!(Outcome::Object(2).to_string(), "object 2");
        assert_eq!(Outcome::NoMatch.to_string(), "no_match");
    }
}
