//! Hardware seams shared by the weighid crates.
//!
//! The detector never talks to a sensor or to non-volatile memory directly;
//! it goes through the two traits below so hosts, tests and firmware can plug
//! in their own backends.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type used at the trait boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A weight sensor producing calibrated readings.
pub trait Scale {
    /// Block for at most `timeout` and return the next reading.
    fn read(&mut self, timeout: std::time::Duration) -> Result<f32, BoxError>;
}

/// Address-keyed non-volatile byte store (EEPROM or an emulation of it).
///
/// Writes may be cached until `commit` makes them durable; reads observe
/// cached writes.
pub trait CalibrationStore {
    /// Fill `buf` with the bytes stored at `address..address + buf.len()`.
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), BoxError>;
    /// Write `bytes` starting at `address`.
    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), BoxError>;
    /// Flush pending writes to durable storage.
    fn commit(&mut self) -> Result<(), BoxError>;
}

impl<T: CalibrationStore + ?Sized> CalibrationStore for &mut T {
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), BoxError> {
        (**self).read(address, buf)
    }
    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), BoxError> {
        (**self).write(address, bytes)
    }
    fn commit(&mut self) -> Result<(), BoxError> {
        (**self).commit()
    }
}

impl<T: CalibrationStore + ?Sized> CalibrationStore for Box<T> {
    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), BoxError> {
        (**self).read(address, buf)
    }
    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<(), BoxError> {
        (**self).write(address, bytes)
    }
    fn commit(&mut self) -> Result<(), BoxError> {
        (**self).commit()
    }
}

impl<T: Scale + ?Sized> Scale for Box<T> {
    fn read(&mut self, timeout: std::time::Duration) -> Result<f32, BoxError> {
        (**self).read(timeout)
    }
}
