//! Speech recognition outcomes.

use crate::messages;

/// Outcome of a speech recognition attempt.
///
/// Degraded outcomes are values, not errors: callers handle every case
/// explicitly and the HTTP layer always answers 200 with a payload built
/// from [`Transcription::into_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    /// Recognized speech.
    Text(String),
    /// Valid audio that contained no recognizable speech.
    NoMatch,
    /// The recognition service could not be reached.
    Unavailable,
    /// The recognition service replied with an error or a malformed body.
    ServiceError,
}

impl Transcription {
    /// Render the wire-level text for the `/speech` response.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy_core::Transcription;
    ///
    /// assert_eq!(Transcription::Text("hello".into()).into_text(), "hello");
    /// assert_eq!(Transcription::NoMatch.into_text(), "");
    /// ```
    pub fn into_text(self) -> String {
        match self {
            Transcription::Text(text) => text,
            Transcription::NoMatch => String::new(),
            Transcription::Unavailable | Transcription::ServiceError => {
                messages::SPEECH_UNAVAILABLE.to_string()
            }
        }
    }

    /// Whether speech was actually recognized.
    pub fn is_match(&self) -> bool {
        matches!(self, Transcription::Text(_))
    }
}
