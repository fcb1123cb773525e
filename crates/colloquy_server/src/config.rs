//! Configuration for the relay service.

use colloquy_error::ConfigError;
use derive_getters::Getters;
use std::time::Duration;

mod defaults {
    use std::time::Duration;

    pub(super) fn backend_url() -> String {
        "http://localhost:11434".to_string()
    }

    pub(super) fn model() -> String {
        "llama3:instruct".to_string()
    }

    pub(super) fn recognizer_url() -> String {
        "http://localhost:2700/recognize".to_string()
    }

    pub(super) fn bind_addr() -> String {
        "0.0.0.0:9000".to_string()
    }

    pub(super) const NUM_PREDICT: u32 = 80;
    pub(super) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub(super) const IDLE_READ_TIMEOUT: Duration = Duration::from_secs(90);
    pub(super) const RECOGNIZER_TIMEOUT: Duration = Duration::from_secs(15);
    pub(super) const CALIBRATION: Duration = Duration::from_millis(100);
    pub(super) const MIN_AUDIO_DURATION: Duration = Duration::from_millis(300);
    pub(super) const STREAM_REPLIES: bool = true;
}

/// Runtime configuration, read once at startup and read-only afterwards.
///
/// Handlers receive this through shared state; no mutable globals exist.
#[derive(Debug, Clone, PartialEq, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct RelayConfig {
    /// Base URL of the inference backend
    #[builder(default = "defaults::backend_url()")]
    backend_url: String,
    /// Model identifier sent with every generation request
    #[builder(default = "defaults::model()")]
    model: String,
    /// Cap on generated tokens per reply
    #[builder(default = "Some(defaults::NUM_PREDICT)")]
    num_predict: Option<u32>,
    /// End-to-end timeout for buffered generation calls
    #[builder(default = "defaults::REQUEST_TIMEOUT")]
    request_timeout: Duration,
    /// Per-read idle bound for streaming generation
    #[builder(default = "defaults::IDLE_READ_TIMEOUT")]
    idle_read_timeout: Duration,
    /// Stream replies chunk-by-chunk instead of buffering
    #[builder(default = "defaults::STREAM_REPLIES")]
    stream_replies: bool,
    /// Recognition service endpoint
    #[builder(default = "defaults::recognizer_url()")]
    recognizer_url: String,
    /// Optional recognition service API key
    #[builder(default)]
    recognizer_api_key: Option<String>,
    /// Recognition request timeout
    #[builder(default = "defaults::RECOGNIZER_TIMEOUT")]
    recognizer_timeout: Duration,
    /// Ambient-noise calibration window
    #[builder(default = "defaults::CALIBRATION")]
    calibration: Duration,
    /// Recordings strictly shorter than this skip recognition
    #[builder(default = "defaults::MIN_AUDIO_DURATION")]
    min_audio_duration: Duration,
    /// Bind address for the HTTP server
    #[builder(default = "defaults::bind_addr()")]
    bind_addr: String,
}

impl RelayConfig {
    /// Creates a new builder for `RelayConfig`.
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Create config from environment variables.
    ///
    /// Reads (all optional, with built-in defaults):
    /// - `COLLOQUY_BACKEND_URL` (default: "http://localhost:11434")
    /// - `COLLOQUY_MODEL` (default: "llama3:instruct")
    /// - `COLLOQUY_NUM_PREDICT` (default: 80)
    /// - `COLLOQUY_REQUEST_TIMEOUT_SECS` (default: 60)
    /// - `COLLOQUY_IDLE_READ_TIMEOUT_SECS` (default: 90)
    /// - `COLLOQUY_STREAM_REPLIES` (default: true)
    /// - `COLLOQUY_RECOGNIZER_URL` (default: "http://localhost:2700/recognize")
    /// - `COLLOQUY_RECOGNIZER_API_KEY` (default: unset)
    /// - `COLLOQUY_RECOGNIZER_TIMEOUT_SECS` (default: 15)
    /// - `COLLOQUY_CALIBRATION_MS` (default: 100)
    /// - `COLLOQUY_MIN_AUDIO_MS` (default: 300)
    /// - `COLLOQUY_BIND_ADDR` (default: "0.0.0.0:9000")
    ///
    /// # Errors
    ///
    /// Fails when a numeric or boolean variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend_url: var("COLLOQUY_BACKEND_URL").unwrap_or_else(defaults::backend_url),
            model: var("COLLOQUY_MODEL").unwrap_or_else(defaults::model),
            num_predict: Some(
                parse_var("COLLOQUY_NUM_PREDICT")?.unwrap_or(defaults::NUM_PREDICT),
            ),
            request_timeout: parse_var("COLLOQUY_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults::REQUEST_TIMEOUT),
            idle_read_timeout: parse_var("COLLOQUY_IDLE_READ_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults::IDLE_READ_TIMEOUT),
            stream_replies: parse_var("COLLOQUY_STREAM_REPLIES")?
                .unwrap_or(defaults::STREAM_REPLIES),
            recognizer_url: var("COLLOQUY_RECOGNIZER_URL").unwrap_or_else(defaults::recognizer_url),
            recognizer_api_key: var("COLLOQUY_RECOGNIZER_API_KEY"),
            recognizer_timeout: parse_var("COLLOQUY_RECOGNIZER_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults::RECOGNIZER_TIMEOUT),
            calibration: parse_var("COLLOQUY_CALIBRATION_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults::CALIBRATION),
            min_audio_duration: parse_var("COLLOQUY_MIN_AUDIO_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults::MIN_AUDIO_DURATION),
            bind_addr: var("COLLOQUY_BIND_ADDR").unwrap_or_else(defaults::bind_addr),
        })
    }

    /// Replace the bind address (command-line override).
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn parse_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::new(format!("{name} invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_the_original_constants() {
        let config = RelayConfig::builder().build().expect("Valid RelayConfig");
        assert_eq!(config.backend_url(), "http://localhost:11434");
        assert_eq!(config.model(), "llama3:instruct");
        assert_eq!(*config.num_predict(), Some(80));
        assert_eq!(*config.request_timeout(), Duration::from_secs(60));
        assert!(*config.stream_replies());
        assert_eq!(*config.min_audio_duration(), Duration::from_millis(300));
    }

    #[test]
    fn bind_addr_override() {
        let config = RelayConfig::builder()
            .build()
            .expect("Valid RelayConfig")
            .with_bind_addr("127.0.0.1:0");
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }
}
