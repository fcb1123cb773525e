//! Inference backend error types.

/// Classified failure from the inference backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// A connection to the backend could not be established.
    Unreachable(String),
    /// No reply arrived within the configured timeout.
    Timeout(String),
    /// The backend replied with something other than the expected shape.
    Protocol(String),
}

impl std::fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendErrorKind::Unreachable(msg) => write!(f, "backend unreachable: {}", msg),
            BackendErrorKind::Timeout(msg) => write!(f, "backend timeout: {}", msg),
            BackendErrorKind::Protocol(msg) => write!(f, "backend protocol error: {}", msg),
        }
    }
}

/// Backend error with source location.
#[derive(Debug, Clone)]
pub struct BackendError {
    /// Classified failure reason
    pub kind: BackendErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl BackendError {
    /// Create a new BackendError with the given kind at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_error::{BackendError, BackendErrorKind};
    ///
    /// let err = BackendError::new(BackendErrorKind::Timeout("60s elapsed".into()));
    /// assert!(matches!(err.kind, BackendErrorKind::Timeout(_)));
    /// ```
    #[track_caller]
    pub fn new(kind: BackendErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Backend Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for BackendError {}
