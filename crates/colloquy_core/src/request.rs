//! Request types for the inference backend wire protocol.

use derive_getters::Getters;
use serde::Serialize;

/// Generation request in the backend's `/api/generate` wire shape.
///
/// Built fresh per inbound request and immutable once constructed. The
/// relay substitutes a fixed message for empty input before this is built,
/// so `prompt` is never empty on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// Model identifier
    model: String,
    /// Prompt text
    prompt: String,
    /// Enable streaming mode
    stream: bool,
    /// Cap on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    num_predict: Option<u32>,
}

impl GenerationRequest {
    /// Creates a new builder for `GenerationRequest`.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }
}
