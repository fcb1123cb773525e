//! Ollama inference backend integration.

mod client;
mod decoder;
mod dto;

pub use client::OllamaClient;
pub use decoder::decode_fragments;
pub use dto::{GenerationReply, StreamEvent};
