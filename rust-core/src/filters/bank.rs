//! Filter bank: one biquad per interleaved channel
//!
//! Channel filters are allocated once for the stream's maximum channel count;
//! (re)configuration only changes how many of them are active.

use super::biquad::{ChannelFilter, FilterParams};
use super::design::FilterKind;
use crate::error::FilterError;
use crate::pcm::format::SampleFormat;
use log::debug;

pub struct FilterBank {
    channels: Vec<ChannelFilter>,
    active: usize,
    format: SampleFormat,
}

impl FilterBank {
    /// Create a bank with `capacity` channel filters, none of them active
    pub fn new(capacity: usize, kind: FilterKind, sample_rate: f32, cutoff: f32) -> Self {
        let channels = (0..capacity)
            .map(|_| ChannelFilter::new(kind, sample_rate, cutoff))
            .collect();

        Self {
            channels,
            active: 0,
            format: SampleFormat::default(),
        }
    }

    /// Activate `channel_count` channels with the given sample layout and
    /// apply `params` to each of them.
    ///
    /// Every active channel's history is cleared, even when `params` is empty.
    pub fn configure(
        &mut self,
        channel_count: usize,
        format: SampleFormat,
        params: FilterParams,
    ) -> Result<(), FilterError> {
        if channel_count > self.channels.len() {
            return Err(FilterError::CapacityExceeded {
                requested: channel_count,
                capacity: self.channels.len(),
            });
        }

        self.active = channel_count;
        self.format = format;

        for filter in &mut self.channels[..channel_count] {
            filter.reconfigure(params);
            filter.reset();
        }

        debug!(
            "filter bank configured: {} of {} channels, {}-bit in {} bytes",
            channel_count,
            self.channels.len(),
            format.bit_depth(),
            format.bytes_per_sample()
        );

        Ok(())
    }

    /// Filter one interleaved frame in place, channel by channel.
    ///
    /// Bytes past the active channels' samples are left untouched.
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [u8]) {
        let format = self.format;
        let samples = frame.chunks_exact_mut(format.bytes_per_sample());

        for (sample, filter) in samples.zip(self.channels[..self.active].iter_mut()) {
            let value = format.unpack(sample);
            format.pack(filter.process(value), sample);
        }
    }

    /// Filter a contiguous run of frames spaced `frame_stride` bytes apart
    pub fn process_frames(&mut self, region: &mut [u8], frame_stride: usize) {
        if frame_stride == 0 {
            return;
        }
        for frame in region.chunks_exact_mut(frame_stride) {
            self.process_frame(frame);
        }
    }

    /// Reset filter state of every channel
    pub fn reset(&mut self) {
        for filter in &mut self.channels {
            filter.reset();
        }
    }

    /// Get a mutable reference to the filter at `index`, for per-channel
    /// overrides after `configure`.
    ///
    /// An override survives a later `configure` only for the parameters that
    /// call leaves unset.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut ChannelFilter> {
        self.channels.get_mut(index)
    }

    pub fn channel(&self, index: usize) -> Option<&ChannelFilter> {
        self.channels.get(index)
    }

    /// Maximum number of channels
    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    /// Number of channels currently filtered
    pub fn active_channels(&self) -> usize {
        self.active
    }

    pub fn format(&self) -> &SampleFormat {
        &self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 16-bit samples in the high half of 32-bit containers
    fn frame_16_in_32(samples: &[i32]) -> Vec<u8> {
        samples.iter().flat_map(|s| (s << 16).to_le_bytes()).collect()
    }

    fn read_16_in_32(frame: &[u8]) -> Vec<i32> {
        frame
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) >> 16)
            .collect()
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut bank = FilterBank::new(2, FilterKind::None, 48000.0, 0.0);
        let err = bank
            .configure(3, SampleFormat::default(), FilterParams::default())
            .unwrap_err();

        assert_eq!(err, FilterError::CapacityExceeded { requested: 3, capacity: 2 });
        assert_eq!(bank.active_channels(), 0);
    }

    #[test]
    fn test_configure_applies_shared_params() {
        let mut bank = FilterBank::new(4, FilterKind::HighPass, 48000.0, 300.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default().with_sample_rate(44100.0))
            .unwrap();

        assert_eq!(bank.active_channels(), 2);
        for i in 0..2 {
            let ch = bank.channel(i).unwrap();
            assert_eq!(ch.kind(), FilterKind::HighPass);
            assert_eq!(ch.sample_rate(), 44100.0);
            assert_eq!(ch.cutoff(), 300.0);
        }
        // Inactive channels untouched
        assert_eq!(bank.channel(2).unwrap().sample_rate(), 48000.0);
    }

    #[test]
    fn test_bypass_frame_unchanged() {
        let mut bank = FilterBank::new(2, FilterKind::None, 48000.0, 0.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default()).unwrap();

        let original = frame_16_in_32(&[0x1234, -500]);
        let mut frame = original.clone();
        bank.process_frame(&mut frame);

        assert_eq!(frame, original);
    }

    #[test]
    fn test_channels_filtered_independently() {
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 1000.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default()).unwrap();

        let mut left = ChannelFilter::new(FilterKind::LowPass, 48000.0, 1000.0);
        let mut right = left.clone();
        let fmt = SampleFormat::default();

        for &(l, r) in &[(16000, 0), (0, -8000), (12000, 4000), (-3000, 3000)] {
            let mut frame = frame_16_in_32(&[l, r]);
            bank.process_frame(&mut frame);

            let expected_l = (left.process(l as f32 / 32768.0) * 32768.0) as i32;
            let expected_r = (right.process(r as f32 / 32768.0) * 32768.0) as i32;
            assert_eq!(read_16_in_32(&frame), vec![expected_l, expected_r]);
            assert!(fmt.unpack(&frame[..4]).abs() <= 1.0);
        }
    }

    #[test]
    fn test_frame_padding_untouched() {
        // One active channel in a frame with room for two
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 1000.0);
        bank.configure(1, SampleFormat::default(), FilterParams::default()).unwrap();

        let mut frame = frame_16_in_32(&[10000, 7777]);
        bank.process_frame(&mut frame);

        assert_ne!(read_16_in_32(&frame)[0], 10000);
        assert_eq!(read_16_in_32(&frame)[1], 7777);
    }

    #[test]
    fn test_reconfigure_clears_history() {
        let mut bank = FilterBank::new(1, FilterKind::LowPass, 48000.0, 300.0);
        bank.configure(1, SampleFormat::default(), FilterParams::default()).unwrap();

        for _ in 0..100 {
            let mut frame = frame_16_in_32(&[20000]);
            bank.process_frame(&mut frame);
        }

        bank.configure(1, SampleFormat::default(), FilterParams::default()).unwrap();

        let mut silent = frame_16_in_32(&[0]);
        bank.process_frame(&mut silent);
        assert_eq!(read_16_in_32(&silent), vec![0]);
    }

    #[test]
    fn test_process_frames_walks_every_frame() {
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 1000.0);
        let fmt = SampleFormat::packed(16).unwrap();
        bank.configure(2, fmt, FilterParams::default()).unwrap();

        let mut reference = ChannelFilter::new(FilterKind::LowPass, 48000.0, 1000.0);
        let mut region: Vec<u8> = (0..8).flat_map(|_| [0x00u8, 0x40, 0x00, 0x00]).collect();
        bank.process_frames(&mut region, 4);

        for frame in region.chunks_exact(4) {
            let expected = (reference.process(0.5) * 32768.0) as i16;
            assert_eq!(i16::from_le_bytes([frame[0], frame[1]]), expected);
            // Right channel silent in, silent out
            assert_eq!(&frame[2..], &[0, 0]);
        }
    }

    #[test]
    fn test_channel_override_filters_differently() {
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 1000.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default()).unwrap();
        bank.channel_mut(1)
            .unwrap()
            .reconfigure(FilterParams::default().with_kind(FilterKind::None));

        let mut frame = frame_16_in_32(&[16000, 16000]);
        bank.process_frame(&mut frame);

        let out = read_16_in_32(&frame);
        assert_ne!(out[0], 16000);
        assert_eq!(out[1], 16000);
        assert!(bank.channel_mut(2).is_none());
    }

    #[test]
    fn test_configure_keeps_override_unless_set() {
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 1000.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default()).unwrap();
        bank.channel_mut(1)
            .unwrap()
            .reconfigure(FilterParams::default().with_cutoff(5000.0));

        // Sample rate only: the cutoff override stays
        bank.configure(2, SampleFormat::default(), FilterParams::default().with_sample_rate(44100.0))
            .unwrap();
        assert_eq!(bank.channel(0).unwrap().cutoff(), 1000.0);
        assert_eq!(bank.channel(1).unwrap().cutoff(), 5000.0);

        // Full parameters overwrite it
        bank.configure(2, SampleFormat::default(), FilterParams::full(FilterKind::LowPass, 48000.0, 1000.0))
            .unwrap();
        assert_eq!(bank.channel(1).unwrap().cutoff(), 1000.0);
        assert_eq!(bank.channel(1).unwrap().coefficients(), bank.channel(0).unwrap().coefficients());
    }

    #[test]
    fn test_reset_zeroes_history() {
        let mut bank = FilterBank::new(2, FilterKind::LowPass, 48000.0, 300.0);
        bank.configure(2, SampleFormat::default(), FilterParams::default()).unwrap();
        let coefficients = *bank.channel(0).unwrap().coefficients();

        for _ in 0..50 {
            let mut frame = frame_16_in_32(&[20000, -20000]);
            bank.process_frame(&mut frame);
        }

        let mut ringing = frame_16_in_32(&[0, 0]);
        bank.process_frame(&mut ringing);
        assert_ne!(read_16_in_32(&ringing), vec![0, 0]);

        bank.reset();

        let mut silent = frame_16_in_32(&[0, 0]);
        bank.process_frame(&mut silent);
        assert_eq!(read_16_in_32(&silent), vec![0, 0]);
        assert_eq!(*bank.channel(0).unwrap().coefficients(), coefficients);
    }
}
