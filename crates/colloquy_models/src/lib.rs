//! Service clients for the Colloquy voice relay.
//!
//! Two narrow integrations live here: the Ollama-style inference backend
//! (buffered and streaming generation, including the token stream decoder)
//! and the remote speech recognition service.

pub mod ollama;
pub mod recognize;

pub use ollama::{GenerationReply, OllamaClient, StreamEvent, decode_fragments};
pub use recognize::RecognizerClient;
