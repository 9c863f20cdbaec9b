//! Biquad filter design and per-channel filtering

pub mod design;
pub mod biquad;
pub mod bank;

pub use design::{BiquadCoefficients, FilterKind, synthesize, warp_frequency};
pub use biquad::{ChannelFilter, FilterParams};
pub use bank::FilterBank;
