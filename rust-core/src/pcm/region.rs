//! Incremental region processing over a circular PCM buffer
//!
//! Each position query filters the frames between the last processed offset
//! and the reported hardware position. When the hardware pointer has wrapped
//! around the end of the buffer, the pending region is split in two: a tail
//! up to the buffer end and a head from the buffer start.
//!
//! At most one buffer lap can be recovered per call; if the caller misses
//! more than a lap the skipped audio is passed through unfiltered.

use crate::filters::FilterBank;
use log::{trace, warn};
use std::ops::Range;

/// Last processed frame offset within the circular buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCursor {
    last_processed: usize,
}

impl RegionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.last_processed
    }

    pub fn reset(&mut self) {
        self.last_processed = 0;
    }
}

/// Layout of the circular buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferGeometry {
    /// Buffer length in frames
    pub frames: usize,
    /// Bytes per interleaved frame
    pub frame_stride: usize,
}

impl BufferGeometry {
    pub fn new(frames: usize, frame_stride: usize) -> Self {
        Self { frames, frame_stride }
    }

    /// Geometry of a borrowed buffer; trailing bytes short of a frame are ignored
    pub fn for_buffer(buffer: &[u8], frame_stride: usize) -> Self {
        let frames = if frame_stride == 0 { 0 } else { buffer.len() / frame_stride };
        Self { frames, frame_stride }
    }

    pub fn bytes(&self) -> usize {
        self.frames * self.frame_stride
    }

    fn byte_range(&self, frames: &Range<usize>) -> Range<usize> {
        frames.start * self.frame_stride..frames.end * self.frame_stride
    }
}

/// Frames awaiting filtering, in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// Nothing to do
    Idle,
    /// One contiguous run
    Pending(Range<usize>),
    /// Runs to the end of the buffer, then restarts at frame 0
    Wrapped { tail: Range<usize>, head: Range<usize> },
}

impl Region {
    /// Compute the pending region between `last_processed` and `hw_pos`.
    ///
    /// Both positions are reduced modulo `buffer_frames`.
    pub fn between(last_processed: usize, hw_pos: usize, buffer_frames: usize) -> Self {
        if buffer_frames == 0 {
            return Region::Idle;
        }

        let from = last_processed % buffer_frames;
        let to = hw_pos % buffer_frames;

        if from == to {
            Region::Idle
        } else if from < to {
            Region::Pending(from..to)
        } else {
            Region::Wrapped {
                tail: from..buffer_frames,
                head: 0..to,
            }
        }
    }

    /// Total number of frames in the region
    pub fn frames(&self) -> usize {
        match self {
            Region::Idle => 0,
            Region::Pending(run) => run.len(),
            Region::Wrapped { tail, head } => tail.len() + head.len(),
        }
    }

    /// Frame runs in processing order
    pub fn runs(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let (first, second) = match self {
            Region::Idle => (None, None),
            Region::Pending(run) => (Some(run.clone()), None),
            Region::Wrapped { tail, head } => (Some(tail.clone()), Some(head.clone())),
        };
        first.into_iter().chain(second).filter(|run| !run.is_empty())
    }
}

/// Drives a [`FilterBank`] over the unprocessed part of a circular buffer
pub struct RegionProcessor;

impl RegionProcessor {
    /// Filter every frame from the cursor up to `hw_pos` and move the cursor.
    ///
    /// # Arguments
    /// * `cursor` - Last processed offset, updated in place
    /// * `hw_pos` - Current hardware position in frames
    /// * `geometry` - Buffer length and frame stride
    /// * `buffer` - The circular sample buffer
    /// * `bank` - Channel filters applied to each frame
    ///
    /// # Returns
    /// The new cursor position
    pub fn advance(
        cursor: &mut RegionCursor,
        hw_pos: usize,
        geometry: &BufferGeometry,
        buffer: &mut [u8],
        bank: &mut FilterBank,
    ) -> usize {
        if buffer.len() < geometry.bytes() {
            warn!(
                "buffer of {} bytes is shorter than {} frames of {} bytes; skipping",
                buffer.len(),
                geometry.frames,
                geometry.frame_stride
            );
            return cursor.last_processed;
        }

        let region = Region::between(cursor.last_processed, hw_pos, geometry.frames);
        if region == Region::Idle {
            return cursor.last_processed;
        }

        trace!("filtering {:?} ({} frames)", region, region.frames());

        for run in region.runs() {
            let bytes = geometry.byte_range(&run);
            bank.process_frames(&mut buffer[bytes], geometry.frame_stride);
        }

        cursor.last_processed = hw_pos % geometry.frames;
        cursor.last_processed
    }
}
