//! Ollama wire-protocol data transfer objects.
//!
//! Requests use [`colloquy_core::GenerationRequest`]; the types here cover
//! the two reply shapes of `/api/generate`.

use derive_getters::Getters;
use serde::Deserialize;

/// Buffered reply: the entire generated text in one JSON object.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct GenerationReply {
    /// Full generated text
    response: String,
    /// Completion flag
    #[serde(default)]
    done: bool,
}

impl GenerationReply {
    /// Consume the reply, yielding the generated text.
    pub fn into_response(self) -> String {
        self.response
    }
}

/// One line of the streaming body.
///
/// A line may carry a text delta, be a bookkeeping record (the terminal
/// line has `done: true` and no useful delta), or fail to parse entirely;
/// the decoder handles all three.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct StreamEvent {
    /// Partial text delta
    #[serde(default)]
    response: Option<String>,
    /// Set on the terminal line
    #[serde(default)]
    done: Option<bool>,
}

impl StreamEvent {
    /// Consume the event, yielding the text delta if present.
    pub fn into_response(self) -> Option<String> {
        self.response
    }
}
