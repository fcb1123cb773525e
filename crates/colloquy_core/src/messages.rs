//! Fixed user-facing reply strings.
//!
//! The relay never surfaces a raw fault to the client; expected failure
//! modes map onto these messages and the HTTP layer answers 200.

/// Substituted when the inbound text is empty or whitespace-only.
pub const EMPTY_INPUT: &str = "Please say something.";

/// The backend connection could not be established.
pub const BACKEND_DOWN: &str =
    "It looks like the local AI engine isn't running. Please start it first.";

/// The backend did not reply within the configured timeout.
pub const BACKEND_TIMEOUT: &str = "The AI took too long to respond. Try again in a moment.";

/// Mid-stream transport failure or an unrecognizable backend reply.
pub const BACKEND_FAULT: &str = "AI service error. Please try again.";

/// The remote recognition service could not be used.
pub const SPEECH_UNAVAILABLE: &str = "Speech API unavailable";
