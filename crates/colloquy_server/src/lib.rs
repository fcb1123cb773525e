//! HTTP relay boundary for the Colloquy voice service.
//!
//! The relay adapts inbound HTTP traffic onto the service clients: typed
//! text goes to the inference backend (buffered or streamed back out),
//! uploaded recordings are normalized and transcribed. Expected failures
//! never surface as error statuses; every handler answers 200 with a
//! user-facing payload.

pub mod api;
pub mod audio;
pub mod config;
pub mod state;

pub use api::create_router;
pub use config::RelayConfig;
pub use state::AppState;
