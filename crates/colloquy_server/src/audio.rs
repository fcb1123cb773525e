//! Audio normalization through the external ffmpeg converter.
//!
//! Uploads arrive in whatever container the browser recorded (typically
//! WebM/Opus). Codec internals are delegated to ffmpeg; this module only
//! shepherds bytes through a scoped temp directory and reads the
//! normalized result back as a [`Waveform`].

use colloquy_core::{CANONICAL_SAMPLE_RATE, Waveform};
use colloquy_error::{AudioError, AudioErrorKind};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Convert an uploaded recording to the canonical mono/16 kHz waveform.
///
/// The upload is written to a temp directory owned by this call; the
/// directory is removed on every exit path, including conversion failure.
///
/// # Errors
///
/// `Io` when temp storage fails, `Conversion` when ffmpeg cannot be
/// launched or rejects the input, `Format` when the converted file is not
/// readable WAV.
pub async fn normalize(bytes: &[u8], file_name: &str) -> Result<Waveform, AudioError> {
    let dir = tempfile::tempdir()
        .map_err(|e| AudioError::new(AudioErrorKind::Io(format!("temp dir: {e}"))))?;
    let upload_path = dir.path().join(sanitize_name(file_name));
    let wav_path = dir.path().join("normalized.wav");

    tokio::fs::write(&upload_path, bytes)
        .await
        .map_err(|e| AudioError::new(AudioErrorKind::Io(format!("persist upload: {e}"))))?;

    convert(&upload_path, &wav_path).await?;
    let waveform = read_wav(&wav_path)?;
    debug!(
        duration_secs = waveform.duration_secs(),
        "Normalized upload"
    );
    Ok(waveform)
}

/// Run ffmpeg to produce a mono/16 kHz 16-bit WAV.
async fn convert(input: &Path, output: &Path) -> Result<(), AudioError> {
    let result = Command::new("ffmpeg")
        .arg("-i")
        .arg(input)
        .arg("-ac")
        .arg("1")
        .arg("-ar")
        .arg(CANONICAL_SAMPLE_RATE.to_string())
        .arg("-sample_fmt")
        .arg("s16")
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg(output)
        .output()
        .await
        .map_err(|e| {
            AudioError::new(AudioErrorKind::Conversion(format!(
                "failed to launch ffmpeg: {e}"
            )))
        })?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AudioError::new(AudioErrorKind::Conversion(format!(
            "ffmpeg exited with {}: {}",
            result.status,
            stderr.trim()
        ))));
    }
    Ok(())
}

/// Read a normalized WAV file into a waveform.
fn read_wav(path: &Path) -> Result<Waveform, AudioError> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| AudioError::new(AudioErrorKind::Format(format!("open wav: {e}"))))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|sample| sample.map(|value| value as f32 / i16::MAX as f32))
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::new(AudioErrorKind::Format(format!("read samples: {e}"))))?,
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::new(AudioErrorKind::Format(format!("read samples: {e}"))))?,
    };

    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Strip any path components from the client-supplied file name.
fn sanitize_name(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("upload.webm")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_name("voice.webm"), "voice.webm");
        assert_eq!(sanitize_name(""), "upload.webm");
        assert_eq!(sanitize_name("/"), "upload.webm");
    }

    #[test]
    fn reads_back_a_written_wav() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tone.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: CANONICAL_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec)?;
        for i in 0..16_000u32 {
            let t = i as f32 / CANONICAL_SAMPLE_RATE as f32;
            let sample = 0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            writer.write_sample((sample * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;

        let waveform = read_wav(&path)?;
        assert_eq!(waveform.sample_rate(), CANONICAL_SAMPLE_RATE);
        assert!((waveform.duration_secs() - 1.0).abs() < 0.001);
        Ok(())
    }
}
