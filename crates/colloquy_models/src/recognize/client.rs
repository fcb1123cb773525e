//! Client for the remote speech recognition service.

use crate::recognize::calibrate;
use colloquy_core::{Transcription, Waveform};
use colloquy_error::{RecognitionError, RecognitionErrorKind};
use hound::{SampleFormat, WavSpec, WavWriter};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Wire reply from the recognition endpoint.
#[derive(Debug, Deserialize)]
struct RecognizeReply {
    text: String,
}

/// Client for a remote speech-to-text endpoint.
///
/// The service accepts a WAV upload and answers `{"text": "..."}`, with an
/// empty string when the audio held no recognizable speech.
#[derive(Debug, Clone)]
pub struct RecognizerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    calibration: Duration,
    timeout: Duration,
}

impl RecognizerClient {
    /// Creates a new client.
    ///
    /// `calibration` is the ambient-noise window measured before each
    /// recognition attempt.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        calibration: Duration,
        timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(url = %base_url, "Created recognizer client");
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            calibration,
            timeout,
        }
    }

    /// Transcribe a normalized waveform.
    ///
    /// Every failure mode is reported as a [`Transcription`] value; this
    /// never returns an error. Silent recordings are resolved locally via
    /// the calibration gate without contacting the service.
    #[instrument(skip(self, waveform), fields(samples = waveform.samples().len()))]
    pub async fn transcribe(&self, waveform: &Waveform) -> Transcription {
        if waveform.is_empty() {
            return Transcription::NoMatch;
        }

        let floor = calibrate::noise_floor(waveform, self.calibration);
        if !calibrate::has_speech(waveform, floor) {
            debug!(noise_floor = floor, "No frames above the energy gate");
            return Transcription::NoMatch;
        }

        let wav = match wav_bytes(waveform) {
            Ok(wav) => wav,
            Err(e) => {
                warn!(error = %e, "Failed to encode waveform for upload");
                return Transcription::ServiceError;
            }
        };

        match self.request(wav).await {
            Ok(text) if text.trim().is_empty() => Transcription::NoMatch,
            Ok(text) => Transcription::Text(text),
            Err(e) => {
                warn!(error = %e, "Recognition request failed");
                match e.kind {
                    RecognitionErrorKind::Unavailable(_) => Transcription::Unavailable,
                    RecognitionErrorKind::Service(_) => Transcription::ServiceError,
                }
            }
        }
    }

    /// Send the encoded waveform to the recognition endpoint.
    async fn request(&self, wav: Vec<u8>) -> Result<String, RecognitionError> {
        let part = Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .expect("Valid mime type");
        let form = Form::new().part("file", part);

        let mut request = self
            .client
            .post(&self.base_url)
            .multipart(form)
            .timeout(self.timeout);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            RecognitionError::new(RecognitionErrorKind::Unavailable(e.to_string()))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognitionError::new(RecognitionErrorKind::Service(
                format!("status {status}: {body}"),
            )));
        }

        let reply: RecognizeReply = response.json().await.map_err(|e| {
            RecognitionError::new(RecognitionErrorKind::Service(format!(
                "malformed reply body: {e}"
            )))
        })?;

        Ok(reply.text)
    }
}

/// Encode a waveform as 16-bit PCM mono WAV bytes.
fn wav_bytes(waveform: &Waveform) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for sample in waveform.samples() {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
