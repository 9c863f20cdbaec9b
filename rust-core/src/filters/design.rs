//! Biquad coefficient synthesis
//!
//! Low-pass, high-pass and band-pass responses are designed with a bilinear
//! transform whose pre-warping uses a cubic approximation of `tan` instead of
//! the real function. The approximation shifts the effective cutoff at high
//! frequencies and is kept as-is: changing it changes the audible response.

use crate::error::FilterError;
use num_complex::Complex64;
use std::f32::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;

/// Response type of a channel filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Identity filter (bypass)
    #[default]
    None,
    LowPass,
    HighPass,
    BandPass,
}

impl FilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::LowPass => "lowpass",
            FilterKind::HighPass => "highpass",
            FilterKind::BandPass => "bandpass",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "bypass" => Ok(FilterKind::None),
            "lowpass" | "low-pass" => Ok(FilterKind::LowPass),
            "highpass" | "high-pass" => Ok(FilterKind::HighPass),
            "bandpass" | "band-pass" => Ok(FilterKind::BandPass),
            _ => Err(FilterError::UnknownFilterKind(s.to_string())),
        }
    }
}

/// Normalized biquad coefficients (every term already divided by a0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Exact passthrough
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalized(a0: f32, a1: f32, a2: f32, b0: f32, b1: f32, b2: f32) -> Self {
        // a0 == 0 is not guarded; the result is Inf/NaN
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Calculate frequency response at given frequencies
    ///
    /// # Arguments
    /// * `frequencies_hz` - Frequencies in Hz
    /// * `sample_rate` - Sample rate the coefficients were designed for
    ///
    /// # Returns
    /// Complex frequency response H(e^jω)
    pub fn frequency_response(&self, frequencies_hz: &[f64], sample_rate: f64) -> Vec<Complex64> {
        let b = [self.b0 as f64, self.b1 as f64, self.b2 as f64];
        let a = [1.0, self.a1 as f64, self.a2 as f64];

        frequencies_hz
            .iter()
            .map(|&f| {
                let omega = 2.0 * std::f64::consts::PI * f / sample_rate;
                let mut num = Complex64::new(0.0, 0.0);
                let mut den = Complex64::new(0.0, 0.0);
                for k in 0..3 {
                    // z^-k on the unit circle
                    let z = Complex64::from_polar(1.0, -omega * k as f64);
                    num += b[k] * z;
                    den += a[k] * z;
                }
                num / den
            })
            .collect()
    }

    /// Calculate magnitude response in dB
    pub fn magnitude_response_db(&self, frequencies_hz: &[f64], sample_rate: f64) -> Vec<f64> {
        self.frequency_response(frequencies_hz, sample_rate)
            .iter()
            .map(|c| 20.0 * c.norm().log10())
            .collect()
    }

    /// Gain at DC, (b0 + b1 + b2) / (1 + a1 + a2)
    pub fn dc_gain(&self) -> f32 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pre-warp a frequency for the bilinear transform.
///
/// tan(x) is approximated by x + x^3/3 with x = f*π/fs.
#[inline]
pub fn warp_frequency(sample_rate: f32, freq: f32) -> f32 {
    let x = freq * PI / sample_rate;
    x + (x * x * x) / 3.0
}

/// Design biquad coefficients for the given response.
///
/// Inputs are not validated: a non-positive sample rate or a cutoff outside
/// (0, sample_rate) yields degenerate (NaN/Inf) coefficients.
pub fn synthesize(kind: FilterKind, sample_rate: f32, cutoff: f32) -> BiquadCoefficients {
    match kind {
        FilterKind::LowPass => {
            let w = warp_frequency(sample_rate, cutoff);
            let w2 = w * w;

            let a0 = 1.0 + SQRT_2 * w + w2;
            let a1 = -2.0 + 2.0 * w2;
            let a2 = 1.0 - SQRT_2 * w + w2;

            BiquadCoefficients::normalized(a0, a1, a2, w2, 2.0 * w2, w2)
        }

        FilterKind::HighPass => {
            let w = warp_frequency(sample_rate, cutoff);
            let w2 = w * w;

            let a0 = 1.0 + SQRT_2 * w + w2;
            let a1 = -2.0 + 2.0 * w2;
            let a2 = 1.0 - SQRT_2 * w + w2;

            BiquadCoefficients::normalized(a0, a1, a2, 1.0, -2.0, -1.0)
        }

        FilterKind::BandPass => {
            // Band edges at cutoff ± cutoff/4
            let d = cutoff / 4.0;
            let lower = if cutoff - d > 0.0 { cutoff - d } else { 0.0 };
            let upper = if cutoff + d < sample_rate { cutoff + d } else { sample_rate };
            let w1 = warp_frequency(sample_rate, lower);
            let w2 = warp_frequency(sample_rate, upper);

            let w0sqr = w1 * w2;
            let wd = w2 - w1;

            let a0 = -1.0 - wd - w0sqr;
            let a1 = 2.0 - 2.0 * w0sqr;
            let a2 = -1.0 + wd - w0sqr;

            BiquadCoefficients::normalized(a0, a1, a2, -wd, 0.0, wd)
        }

        FilterKind::None => BiquadCoefficients::IDENTITY,
    }
}
