//! Normalized audio waveforms.

/// Canonical sample rate for recognition input, in Hz.
///
/// Uploads are normalized to mono at this rate before transcription.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

/// A normalized mono waveform.
///
/// Samples are in the `[-1.0, 1.0]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a waveform from mono samples at the given rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// The raw samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Whether the waveform holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_sample_count() {
        let waveform = Waveform::new(vec![0.0; 8_000], CANONICAL_SAMPLE_RATE);
        assert!((waveform.duration_secs() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn empty_waveform_has_zero_duration() {
        let waveform = Waveform::new(Vec::new(), CANONICAL_SAMPLE_RATE);
        assert_eq!(waveform.duration_secs(), 0.0);
        assert!(waveform.is_empty());
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        let waveform = Waveform::new(vec![0.0; 100], 0);
        assert_eq!(waveform.duration_secs(), 0.0);
    }
}
