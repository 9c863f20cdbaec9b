//! Per-channel biquad filter with history state
//!
//! Direct Form I: three raw input samples and three processed output samples
//! are kept per channel, index 0 being the most recent.

use super::design::{synthesize, BiquadCoefficients, FilterKind};

/// Partial filter parameter update.
///
/// A `None` field leaves the corresponding parameter untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterParams {
    pub kind: Option<FilterKind>,
    pub sample_rate: Option<f32>,
    pub cutoff: Option<f32>,
}

impl FilterParams {
    /// Update every parameter
    pub fn full(kind: FilterKind, sample_rate: f32, cutoff: f32) -> Self {
        Self {
            kind: Some(kind),
            sample_rate: Some(sample_rate),
            cutoff: Some(cutoff),
        }
    }

    pub fn with_kind(mut self, kind: FilterKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn with_cutoff(mut self, cutoff: f32) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    /// True when no parameter would change
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.sample_rate.is_none() && self.cutoff.is_none()
    }
}

/// Real-time biquad filter for a single channel
#[derive(Debug, Clone)]
pub struct ChannelFilter {
    coefficients: BiquadCoefficients,

    /// Input history x[n], x[n-1], x[n-2]
    raw: [f32; 3],

    /// Output history y[n], y[n-1], y[n-2]
    processed: [f32; 3],

    kind: FilterKind,
    sample_rate: f32,
    cutoff: f32,
}

impl ChannelFilter {
    /// Create a new channel filter
    ///
    /// # Arguments
    /// * `kind` - Response type
    /// * `sample_rate` - Sample rate in Hz
    /// * `cutoff` - Cutoff (or band center) frequency in Hz
    pub fn new(kind: FilterKind, sample_rate: f32, cutoff: f32) -> Self {
        Self {
            coefficients: synthesize(kind, sample_rate, cutoff),
            raw: [0.0; 3],
            processed: [0.0; 3],
            kind,
            sample_rate,
            cutoff,
        }
    }

    /// Change filter parameters.
    ///
    /// Supplying any parameter clears the history and recomputes the
    /// coefficients; an empty update does nothing.
    pub fn reconfigure(&mut self, params: FilterParams) {
        if params.is_empty() {
            return;
        }

        if let Some(kind) = params.kind {
            self.kind = kind;
        }
        if let Some(sample_rate) = params.sample_rate {
            self.sample_rate = sample_rate;
        }
        if let Some(cutoff) = params.cutoff {
            self.cutoff = cutoff;
        }

        self.reset();
        self.coefficients = synthesize(self.kind, self.sample_rate, self.cutoff);
    }

    /// Process single sample (zero-allocation)
    ///
    /// # Returns
    /// Filtered output sample y[n]
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let c = &self.coefficients;

        self.raw[2] = self.raw[1];
        self.raw[1] = self.raw[0];
        self.raw[0] = sample;

        self.processed[2] = self.processed[1];
        self.processed[1] = self.processed[0];

        self.processed[0] = c.b0 * self.raw[0] + c.b1 * self.raw[1] + c.b2 * self.raw[2]
            - c.a1 * self.processed[1]
            - c.a2 * self.processed[2];

        self.processed[0]
    }

    /// Process a block in-place
    pub fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Reset filter state (clear both histories)
    pub fn reset(&mut self) {
        self.raw = [0.0; 3];
        self.processed = [0.0; 3];
    }

    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coefficients
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }
}

impl Default for ChannelFilter {
    fn default() -> Self {
        Self::new(FilterKind::None, 48000.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_passes_samples_through() {
        let mut filter = ChannelFilter::new(FilterKind::None, 48000.0, 1000.0);

        for &x in &[0.0, 0.5, -0.25, 1.0, -1.0, 0.123] {
            assert_eq!(filter.process(x), x);
        }
    }

    #[test]
    fn test_recurrence_matches_direct_form() {
        let mut filter = ChannelFilter::new(FilterKind::LowPass, 48000.0, 1000.0);
        let c = *filter.coefficients();

        let input = [1.0f32, 0.5, -0.3, 0.8, 0.0, -1.0];
        let mut x = [0.0f32; 3];
        let mut y = [0.0f32; 3];

        for &sample in &input {
            x = [sample, x[0], x[1]];
            let out = c.b0 * x[0] + c.b1 * x[1] + c.b2 * x[2] - c.a1 * y[0] - c.a2 * y[1];
            y = [out, y[0], y[1]];

            assert_eq!(filter.process(sample), out);
        }
    }

    #[test]
    fn test_lowpass_step_response() {
        let mut filter = ChannelFilter::new(FilterKind::LowPass, 48000.0, 300.0);

        let output: Vec<f32> = (0..10_000).map(|_| filter.process(1.0)).collect();

        // Rises monotonically until it first reaches unity
        let rise_end = output.iter().position(|&y| y >= 1.0).unwrap_or(output.len());
        assert!(rise_end > 1);
        for n in 1..rise_end {
            assert!(output[n] >= output[n - 1], "decrease at {}: {} -> {}", n, output[n - 1], output[n]);
        }

        // Second-order Butterworth overshoot stays small
        let peak = output.iter().cloned().fold(f32::MIN, f32::max);
        assert!(peak < 1.1, "overshoot too large: {}", peak);

        // DC gain ≈ 1
        let last = output[output.len() - 1];
        assert!((last - 1.0).abs() < 5e-3, "did not converge: {}", last);
    }

    #[test]
    fn test_impulse_response_decays() {
        let kinds = [FilterKind::LowPass, FilterKind::HighPass, FilterKind::BandPass];
        for &kind in &kinds {
            for &cutoff in &[200.0, 1000.0, 4000.0, 10000.0] {
                let mut filter = ChannelFilter::new(kind, 48000.0, cutoff);

                filter.process(1.0);
                let mut tail = 0.0f32;
                for n in 1..10_000 {
                    let y = filter.process(0.0);
                    assert!(y.is_finite(), "{} at {} Hz diverged at {}", kind, cutoff, n);
                    if n >= 9_900 {
                        tail = tail.max(y.abs());
                    }
                }

                assert!(tail < 1e-3, "{} at {} Hz tail {}", kind, cutoff, tail);
            }
        }
    }

    #[test]
    fn test_constant_input_stays_bounded() {
        let kinds = [FilterKind::LowPass, FilterKind::HighPass, FilterKind::BandPass];
        for &kind in &kinds {
            let mut filter = ChannelFilter::new(kind, 48000.0, 2000.0);
            let gain = filter.coefficients().dc_gain().abs();

            for _ in 0..10_000 {
                let y = filter.process(1.0);
                assert!(y.is_finite());
                assert!(y.abs() <= 2.0 * gain + 2.0, "{}: {} exceeds bound", kind, y);
            }
        }
    }

    #[test]
    fn test_reconfigure_zeroes_history() {
        let mut filter = ChannelFilter::new(FilterKind::LowPass, 48000.0, 300.0);
        for _ in 0..500 {
            filter.process(0.9);
        }

        filter.reconfigure(FilterParams::default().with_cutoff(1000.0));

        // Fresh filter with the same parameters must match sample for sample
        let mut fresh = ChannelFilter::new(FilterKind::LowPass, 48000.0, 1000.0);
        assert_eq!(filter.process(0.0), 0.0);
        assert_eq!(filter.process(0.0), 0.0);
        assert_eq!(filter.process(0.0), 0.0);

        filter.reset();
        for &x in &[0.25, -0.5, 0.75] {
            assert_eq!(filter.process(x), fresh.process(x));
        }
    }

    #[test]
    fn test_partial_reconfigure_keeps_other_fields() {
        let mut filter = ChannelFilter::new(FilterKind::HighPass, 44100.0, 300.0);

        filter.reconfigure(FilterParams::default().with_cutoff(800.0));
        assert_eq!(filter.kind(), FilterKind::HighPass);
        assert_eq!(filter.sample_rate(), 44100.0);
        assert_eq!(filter.cutoff(), 800.0);
        assert_eq!(*filter.coefficients(), synthesize(FilterKind::HighPass, 44100.0, 800.0));

        filter.reconfigure(FilterParams::default().with_sample_rate(48000.0));
        assert_eq!(filter.kind(), FilterKind::HighPass);
        assert_eq!(filter.cutoff(), 800.0);
        assert_eq!(*filter.coefficients(), synthesize(FilterKind::HighPass, 48000.0, 800.0));

        filter.reconfigure(FilterParams::default().with_kind(FilterKind::None));
        assert_eq!(*filter.coefficients(), BiquadCoefficients::IDENTITY);
    }

    #[test]
    fn test_empty_reconfigure_is_noop() {
        let mut filter = ChannelFilter::new(FilterKind::LowPass, 48000.0, 300.0);
        filter.process(1.0);
        let before = filter.process(1.0);

        filter.reconfigure(FilterParams::default());

        // History survived: next output continues the step response
        let after = filter.process(1.0);
        assert!(after > before);
    }

    #[test]
    fn test_block_processing_matches_per_sample() {
        let mut a = ChannelFilter::new(FilterKind::BandPass, 48000.0, 1500.0);
        let mut b = a.clone();

        let mut block = vec![0.1, -0.4, 0.7, 0.2, -0.9];
        let expected: Vec<f32> = block.iter().map(|&x| b.process(x)).collect();
        a.process_block_inplace(&mut block);

        assert_eq!(block, expected);
    }
}
