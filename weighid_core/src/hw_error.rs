//! Maps `Box<dyn Error>` from trait boundaries to typed `DetectorError`.
//!
//! The traits in `weighid_traits` return `Box<dyn Error + Send + Sync>`; this
//! module turns those into our error enum, with an optional feature-gated
//! path for `weighid_hardware::HwError` downcasting.

use crate::error::DetectorError;

/// Map a scale or store error to a typed `DetectorError`.
///
/// Known hardware error types are downcast first, then string heuristics
/// apply.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DetectorError {
    #[cfg(feature = "hardware-errors")]
    {
        use weighid_hardware::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Exhausted => DetectorError::EndOfStream,
                other => DetectorError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") {
        DetectorError::Timeout
    } else if lower.contains("exhausted") || lower.contains("end of stream") {
        DetectorError::EndOfStream
    } else {
        DetectorError::Hardware(s)
    }
}
