use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("store access out of range: {len} bytes at {address} (capacity {capacity})")]
    OutOfRange {
        address: usize,
        len: usize,
        capacity: usize,
    },
    #[error("sample script exhausted")]
    Exhausted,
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
