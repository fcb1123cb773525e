//! Error types for the Colloquy voice relay.
//!
//! This crate provides the foundation error types used throughout the
//! Colloquy workspace. Expected degraded outcomes (no speech detected,
//! recognition service down) are modeled as values in `colloquy_core`, not
//! as errors here; these types cover genuinely fallible operations.

mod audio;
mod backend;
mod config;
mod recognition;

pub use audio::{AudioError, AudioErrorKind};
pub use backend::{BackendError, BackendErrorKind};
pub use config::ConfigError;
pub use recognition::{RecognitionError, RecognitionErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum ColloquyErrorKind {
    /// Inference backend error
    Backend(BackendError),
    /// Speech recognition error
    Recognition(RecognitionError),
    /// Audio persistence or conversion error
    Audio(AudioError),
    /// Configuration error
    Config(ConfigError),
}

impl std::fmt::Display for ColloquyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColloquyErrorKind::Backend(e) => write!(f, "{}", e),
            ColloquyErrorKind::Recognition(e) => write!(f, "{}", e),
            ColloquyErrorKind::Audio(e) => write!(f, "{}", e),
            ColloquyErrorKind::Config(e) => write!(f, "{}", e),
        }
    }
}

/// Colloquy error with kind discrimination.
#[derive(Debug)]
pub struct ColloquyError(Box<ColloquyErrorKind>);

impl ColloquyError {
    /// Create a new error from a kind.
    pub fn new(kind: ColloquyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ColloquyErrorKind {
        &self.0
    }
}

impl std::fmt::Display for ColloquyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Colloquy Error: {}", self.0)
    }
}

impl std::error::Error for ColloquyError {}

// Generic From implementation for any type that converts to ColloquyErrorKind
impl<T> From<T> for ColloquyError
where
    T: Into<ColloquyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Colloquy operations.
pub type ColloquyResult<T> = std::result::Result<T, ColloquyError>;
