//! Client for the Ollama-style generation endpoint.

use crate::ollama::decoder;
use crate::ollama::dto::GenerationReply;
use colloquy_core::{Fragment, GenerationRequest};
use colloquy_error::{BackendError, BackendErrorKind};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Client for a locally running Ollama-compatible inference server.
///
/// One instance is built at startup from explicit configuration and shared
/// across requests; each call opens its own backend connection.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    num_predict: Option<u32>,
    request_timeout: Duration,
    idle_read_timeout: Duration,
}

impl OllamaClient {
    /// Creates a new client.
    ///
    /// `request_timeout` bounds buffered calls end to end; streaming calls
    /// have no overall deadline but bound each read by `idle_read_timeout`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        num_predict: Option<u32>,
        request_timeout: Duration,
        idle_read_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        debug!(url = %base_url, model = %model, "Created inference client");
        Self {
            client: Client::new(),
            base_url,
            model,
            num_predict,
            request_timeout,
            idle_read_timeout,
        }
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn request(&self, prompt: &str, stream: bool) -> GenerationRequest {
        let mut builder = GenerationRequest::builder();
        builder.model(&self.model).prompt(prompt).stream(stream);
        if let Some(num_predict) = self.num_predict {
            builder.num_predict(num_predict);
        }
        builder.build().expect("Valid GenerationRequest")
    }

    /// Buffered generation: one request, the full reply text in one piece.
    ///
    /// # Errors
    ///
    /// `Unreachable` when the connection cannot be established, `Timeout`
    /// when no reply arrives within the request timeout, `Protocol` when
    /// the backend answers with an error status or a body without the
    /// expected text field.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, BackendError> {
        let request = self.request(prompt, false);
        debug!(url = %self.generate_url(), "Sending buffered generation request");

        let response = self
            .client
            .post(self.generate_url())
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Backend answered with error status");
            return Err(BackendError::new(BackendErrorKind::Protocol(format!(
                "status {status}: {body}"
            ))));
        }

        let reply: GenerationReply = response.json().await.map_err(|e| {
            error!(error = %e, "Backend reply was not the expected shape");
            BackendError::new(BackendErrorKind::Protocol(format!(
                "malformed reply body: {e}"
            )))
        })?;

        debug!(done = reply.done(), "Received buffered reply");
        Ok(reply.into_response())
    }

    /// Streaming generation: a lazy, finite, single-pass fragment sequence.
    ///
    /// The connection stays open for the lifetime of the returned stream;
    /// consuming a fragment drives the next network read (pull-based, no
    /// read-ahead) and dropping the stream early closes the connection.
    /// Mid-stream faults surface as a final user-facing fragment, never as
    /// an error.
    ///
    /// # Errors
    ///
    /// Fails before the first fragment if the connection cannot be
    /// established or the backend answers with an error status.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    pub async fn stream(&self, prompt: &str) -> Result<BoxStream<'static, Fragment>, BackendError> {
        let request = self.request(prompt, true);
        debug!(url = %self.generate_url(), "Opening streaming generation request");

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Backend refused streaming request");
            return Err(BackendError::new(BackendErrorKind::Protocol(format!(
                "status {status}: {body}"
            ))));
        }

        let fragments =
            decoder::decode_fragments(response.bytes_stream().boxed(), self.idle_read_timeout);
        Ok(fragments.boxed())
    }
}

/// Map a transport-level reqwest failure onto the backend taxonomy.
#[track_caller]
fn classify_transport(error: reqwest::Error) -> BackendError {
    let kind = if error.is_timeout() {
        BackendErrorKind::Timeout(error.to_string())
    } else if error.is_connect() {
        BackendErrorKind::Unreachable(error.to_string())
    } else {
        BackendErrorKind::Unreachable(format!("request failed: {error}"))
    };
    BackendError::new(kind)
}
