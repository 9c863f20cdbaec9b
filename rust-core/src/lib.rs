//! PCM Filter - Incremental biquad filtering for circular PCM buffers
//!
//! Filters interleaved fixed-point audio in place as a stream's hardware
//! pointer advances, without a processing thread of its own.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod error;
pub mod filters;
pub mod pcm;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::FilterError;
pub use filters::{BiquadCoefficients, ChannelFilter, FilterBank, FilterKind, FilterParams};
pub use pcm::{FilterConfig, PositionHook, SampleFormat, StreamConfig, StreamFilter};
