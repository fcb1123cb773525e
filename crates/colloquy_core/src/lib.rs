//! Core data types for the Colloquy voice relay.
//!
//! This crate provides the foundation data types shared by the relay's
//! service clients and HTTP boundary.

mod fragment;
pub mod messages;
mod request;
mod transcription;
mod waveform;

pub use fragment::Fragment;
pub use request::{GenerationRequest, GenerationRequestBuilder};
pub use transcription::Transcription;
pub use waveform::{CANONICAL_SAMPLE_RATE, Waveform};
