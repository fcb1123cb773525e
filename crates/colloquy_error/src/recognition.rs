//! Speech recognition error types.

/// Classified failure from the remote recognition service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorKind {
    /// The recognition service could not be reached.
    Unavailable(String),
    /// The service replied with an error status or a malformed body.
    Service(String),
}

impl std::fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognitionErrorKind::Unavailable(msg) => {
                write!(f, "recognition service unavailable: {}", msg)
            }
            RecognitionErrorKind::Service(msg) => {
                write!(f, "recognition service error: {}", msg)
            }
        }
    }
}

/// Recognition error with source location.
#[derive(Debug, Clone)]
pub struct RecognitionError {
    /// Classified failure reason
    pub kind: RecognitionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl RecognitionError {
    /// Create a new RecognitionError with the given kind at the current location.
    #[track_caller]
    pub fn new(kind: RecognitionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Recognition Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for RecognitionError {}
