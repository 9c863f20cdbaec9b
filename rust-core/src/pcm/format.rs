//! Fixed-point sample codec
//!
//! Samples are little-endian signed integers stored in 1 to 4 byte
//! containers. The significant value sits in the top `bit_depth` bits of the
//! container; the low `bit_shift` bits are dropped on read and zeroed on
//! write. Conversion is lossy truncation without dither.

use crate::error::FilterError;

/// Storage layout of a single interleaved sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleFormat {
    bytes_per_sample: usize,
    bit_depth: u32,
    /// Non-significant bits below the value
    bit_shift: u32,
    /// Full-scale magnitude, 2^(bit_depth - 1)
    max_value: f32,
}

impl SampleFormat {
    /// Create a sample format
    ///
    /// # Arguments
    /// * `bit_depth` - Significant bits per sample
    /// * `bytes_per_sample` - Container width in bytes (1 to 4)
    pub fn new(bit_depth: u32, bytes_per_sample: usize) -> Result<Self, FilterError> {
        if !(1..=4).contains(&bytes_per_sample) {
            return Err(FilterError::UnsupportedContainer(bytes_per_sample));
        }

        let container_bits = (bytes_per_sample * 8) as u32;
        if bit_depth == 0 || bit_depth > container_bits {
            return Err(FilterError::InvalidFormat {
                bit_depth,
                bytes_per_sample,
            });
        }

        Ok(Self {
            bytes_per_sample,
            bit_depth,
            bit_shift: container_bits - bit_depth,
            max_value: (1u64 << (bit_depth - 1)) as f32,
        })
    }

    /// Smallest container able to hold `bit_depth` bits
    pub fn packed(bit_depth: u32) -> Result<Self, FilterError> {
        let bytes_per_sample = (bit_depth as usize + 7) / 8;
        Self::new(bit_depth, bytes_per_sample.max(1))
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.bytes_per_sample
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub fn bit_shift(&self) -> u32 {
        self.bit_shift
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Unused high bytes of a 32-bit word holding one container
    #[inline]
    fn word_shift(&self) -> u32 {
        32 - (self.bytes_per_sample as u32) * 8
    }

    /// Decode one sample to a value nominally in [-1, 1)
    ///
    /// `bytes` must hold at least `bytes_per_sample` bytes.
    #[inline]
    pub fn unpack(&self, bytes: &[u8]) -> f32 {
        let mut word = [0u8; 4];
        word[..self.bytes_per_sample].copy_from_slice(&bytes[..self.bytes_per_sample]);
        let raw = (u32::from_le_bytes(word) << self.word_shift()) as i32;

        // Arithmetic shift drops the low bits and sign-extends
        let value = raw >> (self.word_shift() + self.bit_shift);

        value as f32 / self.max_value
    }

    /// Encode `value` in place, overwriting `bytes_per_sample` bytes
    #[inline]
    pub fn pack(&self, value: f32, bytes: &mut [u8]) {
        // `as` truncates toward zero and maps NaN to 0
        let scaled = (value * self.max_value) as i64;
        let max = self.max_value as i64;
        let clamped = scaled.clamp(-max, max - 1) as i32;

        let word = ((clamped << self.bit_shift) as u32).to_le_bytes();
        bytes[..self.bytes_per_sample].copy_from_slice(&word[..self.bytes_per_sample]);
    }
}

impl Default for SampleFormat {
    /// 16-bit samples in 32-bit containers
    fn default() -> Self {
        Self {
            bytes_per_sample: 4,
            bit_depth: 16,
            bit_shift: 16,
            max_value: 32768.0,
        }
    }
}
