//! Audio handling error types.

/// Classified failure while preparing audio for recognition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioErrorKind {
    /// The external converter rejected or failed on the upload.
    Conversion(String),
    /// Temp storage or file I/O failed.
    Io(String),
    /// The normalized waveform could not be decoded.
    Format(String),
}

impl std::fmt::Display for AudioErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioErrorKind::Conversion(msg) => write!(f, "audio conversion failed: {}", msg),
            AudioErrorKind::Io(msg) => write!(f, "audio io failed: {}", msg),
            AudioErrorKind::Format(msg) => write!(f, "audio format invalid: {}", msg),
        }
    }
}

/// Audio error with source location.
#[derive(Debug, Clone)]
pub struct AudioError {
    /// Classified failure reason
    pub kind: AudioErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl AudioError {
    /// Create a new AudioError with the given kind at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_error::{AudioError, AudioErrorKind};
    ///
    /// let err = AudioError::new(AudioErrorKind::Conversion("unknown container".into()));
    /// assert!(err.to_string().contains("conversion"));
    /// ```
    #[track_caller]
    pub fn new(kind: AudioErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Audio Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for AudioError {}
