//! Stream-facing filter engine
//!
//! A [`StreamFilter`] is created when a stream opens, reconfigured on every
//! prepare and driven from the position-query path. It owns all per-stream
//! state; nothing is shared between streams.
//!
//! The caller must serialize calls per stream (`&mut self` on every entry
//! point). No locking happens here.

use super::format::SampleFormat;
use super::region::{BufferGeometry, RegionCursor, RegionProcessor};
use crate::error::FilterError;
use crate::filters::{FilterBank, FilterKind, FilterParams};
use log::debug;

/// Stream parameters negotiated at prepare time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamConfig {
    /// Interleaved channel count
    pub channels: usize,

    /// Significant bits per sample
    pub bit_depth: u32,

    /// Container width of one sample
    pub bytes_per_sample: usize,

    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl StreamConfig {
    /// Bytes per interleaved frame
    pub fn frame_stride(&self) -> usize {
        self.channels * self.bytes_per_sample
    }

    pub fn sample_format(&self) -> Result<SampleFormat, FilterError> {
        SampleFormat::new(self.bit_depth, self.bytes_per_sample)
    }
}

impl Default for StreamConfig {
    /// Stereo, 16-bit samples in 32-bit containers, 48 kHz
    fn default() -> Self {
        Self {
            channels: 2,
            bit_depth: 16,
            bytes_per_sample: 4,
            sample_rate: 48000,
        }
    }
}

/// Filter applied to every channel of a stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    pub kind: FilterKind,

    /// Cutoff (or band center) in Hz
    pub cutoff: f32,
}

impl Default for FilterConfig {
    /// High-pass at 300 Hz
    fn default() -> Self {
        Self {
            kind: FilterKind::HighPass,
            cutoff: 300.0,
        }
    }
}

/// Hook installed in the stream layer at open time.
///
/// `pointer` is called from every position query; implementations may
/// rewrite the buffer up to the reported position but must return the
/// position unchanged.
pub trait PositionHook {
    /// Apply new stream parameters; called on every prepare
    fn prepare(&mut self, config: &StreamConfig) -> Result<(), FilterError>;

    /// Handle a position query
    ///
    /// # Arguments
    /// * `buffer` - The stream's circular sample buffer
    /// * `hw_pos_bytes` - Hardware position in bytes
    ///
    /// # Returns
    /// Hardware position in frames
    fn pointer(&mut self, buffer: &mut [u8], hw_pos_bytes: usize) -> usize;
}

/// Convert a byte position to frames; positions outside the buffer read as 0
fn bytes_to_frames(buffer_len: usize, frame_stride: usize, pos_bytes: usize) -> usize {
    if pos_bytes >= buffer_len || frame_stride == 0 {
        0
    } else {
        pos_bytes / frame_stride
    }
}

/// Per-stream incremental filter
pub struct StreamFilter {
    bank: FilterBank,
    cursor: RegionCursor,
    filter: FilterConfig,
    stream: Option<StreamConfig>,
}

impl StreamFilter {
    /// Create the filter for a newly opened stream with the default
    /// high-pass configuration
    ///
    /// # Arguments
    /// * `max_channels` - Largest channel count the stream may negotiate
    pub fn open(max_channels: usize) -> Self {
        Self::with_filter(max_channels, FilterConfig::default())
    }

    /// Create the filter for a newly opened stream
    pub fn with_filter(max_channels: usize, filter: FilterConfig) -> Self {
        let defaults = StreamConfig::default();
        Self {
            bank: FilterBank::new(
                max_channels,
                filter.kind,
                defaults.sample_rate as f32,
                filter.cutoff,
            ),
            cursor: RegionCursor::new(),
            filter,
            stream: None,
        }
    }

    /// Full (re)configuration; safe to repeat on every prepare.
    ///
    /// Clears all filter history and rewinds the cursor to frame 0. On error
    /// the previous configuration is kept.
    pub fn configure(&mut self, stream: &StreamConfig, filter: &FilterConfig) -> Result<(), FilterError> {
        let format = stream.sample_format()?;
        let params = FilterParams::full(filter.kind, stream.sample_rate as f32, filter.cutoff);

        self.bank.configure(stream.channels, format, params)?;
        self.cursor.reset();
        self.filter = *filter;
        self.stream = Some(*stream);

        debug!(
            "stream filter prepared: {} ch, {} bit, {} Hz, {} @ {} Hz",
            stream.channels, stream.bit_depth, stream.sample_rate, filter.kind, filter.cutoff
        );

        Ok(())
    }

    /// Filter the buffer up to `hw_frame_pos`.
    ///
    /// Does nothing until the stream has been configured.
    pub fn advance(&mut self, buffer: &mut [u8], hw_frame_pos: usize) {
        let Some(stream) = self.stream else {
            return;
        };

        let geometry = BufferGeometry::for_buffer(buffer, stream.frame_stride());
        RegionProcessor::advance(&mut self.cursor, hw_frame_pos, &geometry, buffer, &mut self.bank);
    }

    /// Mutable access to the channel filters, e.g. for per-channel overrides
    pub fn bank_mut(&mut self) -> &mut FilterBank {
        &mut self.bank
    }

    pub fn bank(&self) -> &FilterBank {
        &self.bank
    }

    pub fn cursor(&self) -> RegionCursor {
        self.cursor
    }

    pub fn filter_config(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn stream_config(&self) -> Option<&StreamConfig> {
        self.stream.as_ref()
    }
}

impl PositionHook for StreamFilter {
    fn prepare(&mut self, config: &StreamConfig) -> Result<(), FilterError> {
        let filter = self.filter;
        self.configure(config, &filter)
    }

    /// Before the first prepare the frame stride is unknown, so every
    /// position reads as frame 0 and nothing is filtered.
    fn pointer(&mut self, buffer: &mut [u8], hw_pos_bytes: usize) -> usize {
        let stride = self.stream.map(|s| s.frame_stride()).unwrap_or(0);
        let frames = bytes_to_frames(buffer.len(), stride, hw_pos_bytes);
        self.advance(buffer, frames);
        frames
    }
}

/// Position hook that leaves the buffer untouched
#[derive(Debug, Default)]
pub struct Bypass {
    frame_stride: usize,
}

impl PositionHook for Bypass {
    fn prepare(&mut self, config: &StreamConfig) -> Result<(), FilterError> {
        config.sample_format()?;
        self.frame_stride = config.frame_stride();
        Ok(())
    }

    fn pointer(&mut self, buffer: &mut [u8], hw_pos_bytes: usize) -> usize {
        bytes_to_frames(buffer.len(), self.frame_stride, hw_pos_bytes)
    }
}
