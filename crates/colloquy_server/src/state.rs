//! Shared request-handler state.

use crate::config::RelayConfig;
use colloquy_models::{OllamaClient, RecognizerClient};
use std::sync::Arc;

/// State shared across request handlers.
///
/// The configuration is read-only after startup; the clients hold pooled
/// HTTP connections and are cheap to clone per request. Requests share
/// nothing mutable.
#[derive(Clone)]
pub struct AppState {
    config: Arc<RelayConfig>,
    backend: OllamaClient,
    recognizer: RecognizerClient,
}

impl AppState {
    /// Build the state from startup configuration.
    pub fn new(config: RelayConfig) -> Self {
        let backend = OllamaClient::new(
            config.backend_url(),
            config.model(),
            *config.num_predict(),
            *config.request_timeout(),
            *config.idle_read_timeout(),
        );
        let recognizer = RecognizerClient::new(
            config.recognizer_url(),
            config.recognizer_api_key().clone(),
            *config.calibration(),
            *config.recognizer_timeout(),
        );
        Self {
            config: Arc::new(config),
            backend,
            recognizer,
        }
    }

    /// The startup configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The inference backend client.
    pub fn backend(&self) -> &OllamaClient {
        &self.backend
    }

    /// The speech recognition client.
    pub fn recognizer(&self) -> &RecognizerClient {
        &self.recognizer
    }
}
