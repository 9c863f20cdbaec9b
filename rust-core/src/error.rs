//! Errors raised while (re)configuring a stream filter

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Channel count {requested} exceeds filter bank capacity of {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Bit depth {bit_depth} does not fit in a {bytes_per_sample}-byte sample")]
    InvalidFormat { bit_depth: u32, bytes_per_sample: usize },

    #[error("Unsupported sample container of {0} bytes (expected 1 to 4)")]
    UnsupportedContainer(usize),

    #[error("Unknown filter kind: {0}")]
    UnknownFilterKind(String),
}
