//! In-place filtering of interleaved fixed-point PCM buffers

pub mod format;
pub mod region;
pub mod stream;

pub use format::SampleFormat;
pub use region::{BufferGeometry, Region, RegionCursor, RegionProcessor};
pub use stream::{Bypass, FilterConfig, PositionHook, StreamConfig, StreamFilter};
