//! Ambient-noise calibration for recognition input.
//!
//! Before a waveform is sent to the recognition service, a short leading
//! window is measured to establish the ambient noise floor. An energy gate
//! derived from that floor decides whether the recording contains anything
//! speech-like at all; recordings that never rise above the gate skip the
//! network round-trip entirely. A shorter calibration window responds
//! faster, a longer one tolerates noisier rooms.

use colloquy_core::Waveform;
use std::time::Duration;

/// Frame length used when scanning for speech energy: 30 ms at 16 kHz.
const FRAME_LEN: usize = 480;

/// Gate multiplier over the measured noise floor.
const GATE_RATIO: f32 = 2.5;

/// Absolute energy below which a frame is never counted as speech.
const GATE_MIN: f32 = 0.01;

/// RMS of the leading calibration window.
pub(crate) fn noise_floor(waveform: &Waveform, calibration: Duration) -> f32 {
    let window = (waveform.sample_rate() as f32 * calibration.as_secs_f32()) as usize;
    let take = window.max(1).min(waveform.samples().len());
    rms(&waveform.samples()[..take])
}

/// Whether any frame rises far enough above the noise floor to be speech.
pub(crate) fn has_speech(waveform: &Waveform, floor: f32) -> bool {
    let gate = (floor * GATE_RATIO).max(GATE_MIN);
    waveform
        .samples()
        .chunks(FRAME_LEN)
        .any(|frame| rms(frame) > gate)
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum();
    (energy / samples.len() as f32).sqrt()
}
