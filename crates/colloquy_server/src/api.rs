//! HTTP API for the relay: health, text, and speech endpoints.

use crate::audio;
use crate::state::AppState;
use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use colloquy_core::{Waveform, messages};
use colloquy_error::{BackendError, BackendErrorKind};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

/// Inbound body for `POST /process`.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    text: String,
}

/// Buffered reply shape for `POST /process`.
#[derive(Debug, Serialize)]
pub struct ProcessReply {
    response: String,
}

/// Reply shape for `POST /speech`.
#[derive(Debug, Serialize)]
pub struct SpeechReply {
    text: String,
}

/// Create the relay router.
///
/// CORS is wide open: the paired frontend is served from another origin.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/process", post(process))
        .route("/speech", post(speech))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "service": "colloquy" })),
    )
}

/// Text path: relay the prompt to the inference backend.
///
/// Empty input never reaches the backend; the fixed substitute message is
/// returned in whichever shape this deployment uses.
#[instrument(skip(state, request))]
async fn process(State(state): State<AppState>, Json(request): Json<ProcessRequest>) -> Response {
    let text = request.text.trim();
    if text.is_empty() {
        info!("Empty input, substituting fixed reply");
        return fixed_reply(&state, messages::EMPTY_INPUT);
    }

    let prompt = shape_prompt(text);
    if *state.config().stream_replies() {
        stream_reply(&state, &prompt).await
    } else {
        buffered_reply(&state, &prompt).await
    }
}

/// Audio path: normalize the upload and transcribe it.
///
/// Every failure mode degrades to a 200 reply; an empty `text` means
/// "nothing to say".
#[instrument(skip_all)]
async fn speech(State(state): State<AppState>, multipart: Multipart) -> Json<SpeechReply> {
    let text = transcribe_upload(&state, multipart).await;
    Json(SpeechReply { text })
}

/// Shape the user's text into the fast-reply prompt.
fn shape_prompt(text: &str) -> String {
    format!(
        "Reply briefly in simple, clear language. Use 1-2 short sentences.\n\nUser: {text}"
    )
}

/// Render a fixed message in the deployment's `/process` response shape.
fn fixed_reply(state: &AppState, message: &str) -> Response {
    if *state.config().stream_replies() {
        plain_text(message.to_string())
    } else {
        Json(ProcessReply {
            response: message.to_string(),
        })
        .into_response()
    }
}

fn plain_text(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Streaming variant: forward fragments chunk-by-chunk as they decode.
async fn stream_reply(state: &AppState, prompt: &str) -> Response {
    match state.backend().stream(prompt).await {
        Ok(fragments) => {
            let body = Body::from_stream(
                fragments.map(|fragment| Ok::<_, Infallible>(Bytes::from(fragment.into_text()))),
            );
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                body,
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Streaming setup failed");
            plain_text(map_backend_error(&e).to_string())
        }
    }
}

/// Buffered variant: one JSON object with the whole reply.
async fn buffered_reply(state: &AppState, prompt: &str) -> Response {
    let response = match state.backend().generate(prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "Buffered generation failed");
            map_backend_error(&e).to_string()
        }
    };
    Json(ProcessReply { response }).into_response()
}

/// Map a backend failure onto its fixed user-facing message.
fn map_backend_error(error: &BackendError) -> &'static str {
    match &error.kind {
        BackendErrorKind::Unreachable(_) => messages::BACKEND_DOWN,
        BackendErrorKind::Timeout(_) => messages::BACKEND_TIMEOUT,
        BackendErrorKind::Protocol(_) => messages::BACKEND_FAULT,
    }
}

/// Run an upload through normalization, the duration gate, and recognition.
async fn transcribe_upload(state: &AppState, mut multipart: Multipart) -> String {
    let Some((bytes, file_name)) = read_upload(&mut multipart).await else {
        warn!("Upload carried no audio field");
        return String::new();
    };

    let waveform = match audio::normalize(&bytes, &file_name).await {
        Ok(waveform) => waveform,
        Err(e) => {
            warn!(error = %e, "Audio normalization failed");
            return String::new();
        }
    };

    if too_short(&waveform, *state.config().min_audio_duration()) {
        info!(
            duration_secs = waveform.duration_secs(),
            "Recording below minimum duration, skipping recognition"
        );
        return String::new();
    }

    state.recognizer().transcribe(&waveform).await.into_text()
}

/// Pull the first audio field out of the multipart upload.
///
/// The paired frontend posts the blob under `file`; `audio` is accepted
/// as well.
async fn read_upload(multipart: &mut Multipart) -> Option<(Bytes, String)> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed reading multipart field");
                return None;
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name != "file" && name != "audio" {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "upload.webm".to_string());
        match field.bytes().await {
            Ok(bytes) if !bytes.is_empty() => return Some((bytes, file_name)),
            Ok(_) => {
                warn!(field = %name, "Audio field was empty");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed reading audio field");
                return None;
            }
        }
    }
}

/// Whether a recording is strictly below the minimum duration.
///
/// A recording exactly at the threshold is transcribed.
fn too_short(waveform: &Waveform, min: Duration) -> bool {
    waveform.duration_secs() < min.as_secs_f32()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colloquy_core::CANONICAL_SAMPLE_RATE;

    #[test]
    fn prompt_carries_the_user_text() {
        let prompt = shape_prompt("turn on the lights");
        assert!(prompt.ends_with("User: turn on the lights"));
        assert!(prompt.starts_with("Reply briefly"));
    }

    #[test]
    fn duration_exactly_at_threshold_is_accepted() {
        // 8000 samples at 16 kHz is exactly 500 ms.
        let waveform = Waveform::new(vec![0.0; 8_000], CANONICAL_SAMPLE_RATE);
        assert!(!too_short(&waveform, Duration::from_millis(500)));
    }

    #[test]
    fn duration_below_threshold_is_rejected() {
        let waveform = Waveform::new(vec![0.0; 7_999], CANONICAL_SAMPLE_RATE);
        assert!(too_short(&waveform, Duration::from_millis(500)));
    }

    #[test]
    fn backend_errors_map_to_fixed_messages() {
        let down = BackendError::new(BackendErrorKind::Unreachable("refused".into()));
        assert_eq!(map_backend_error(&down), messages::BACKEND_DOWN);

        let slow = BackendError::new(BackendErrorKind::Timeout("60s".into()));
        assert_eq!(map_backend_error(&slow), messages::BACKEND_TIMEOUT);

        let odd = BackendError::new(BackendErrorKind::Protocol("no text field".into()));
        assert_eq!(map_backend_error(&odd), messages::BACKEND_FAULT);
    }
}
