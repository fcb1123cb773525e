//! End-to-end tests for the relay HTTP surface.
//!
//! Each test stands up the relay and a mock inference backend (or
//! recognizer) on ephemeral ports and talks to the relay over real HTTP.
//! The full `/speech` pipeline needs ffmpeg on PATH and is `#[ignore]`d.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use bytes::Bytes;
use colloquy_core::{CANONICAL_SAMPLE_RATE, Transcription, Waveform, messages};
use colloquy_models::RecognizerClient;
use colloquy_server::{AppState, RelayConfig, create_router};
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
struct MockState {
    calls: Arc<AtomicUsize>,
}

async fn spawn(router: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

/// An address nothing is listening on.
async fn closed_port() -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

async fn mock_buffered(State(state): State<MockState>, Json(body): Json<Value>) -> Json<Value> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(body["stream"], json!(false));
    Json(json!({ "response": "Hi there!", "done": true }))
}

async fn mock_streaming(State(state): State<MockState>, Json(body): Json<Value>) -> impl IntoResponse {
    state.calls.fetch_add(1, Ordering::SeqCst);
    assert_eq!(body["stream"], json!(true));
    let lines: Vec<Result<Bytes, Infallible>> = vec![
        Ok(Bytes::from_static(b"{\"response\":\"Hi\"}\n")),
        Ok(Bytes::from_static(b"{\"response\":\" there\"}\n")),
        Ok(Bytes::from_static(b"{\"response\":\"\",\"done\":true}\n")),
    ];
    Body::from_stream(futures_util::stream::iter(lines))
}

async fn mock_slow(State(state): State<MockState>, Json(_): Json<Value>) -> Json<Value> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "response": "too late", "done": true }))
}

async fn mock_unrecognizable(State(state): State<MockState>, Json(_): Json<Value>) -> Json<Value> {
    state.calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "weird": 1 }))
}

async fn mock_recognizer() -> Json<Value> {
    Json(json!({ "text": "turn on the lights" }))
}

async fn spawn_backend(
    handler: axum::routing::MethodRouter<MockState>,
) -> anyhow::Result<(String, Arc<AtomicUsize>)> {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = MockState {
        calls: calls.clone(),
    };
    let router = Router::new()
        .route("/api/generate", handler)
        .with_state(state);
    let url = spawn(router).await?;
    Ok((url, calls))
}

async fn spawn_relay(config: RelayConfig) -> anyhow::Result<String> {
    spawn(create_router(AppState::new(config))).await
}

fn config_with_backend(backend_url: &str, stream_replies: bool) -> RelayConfig {
    RelayConfig::builder()
        .backend_url(backend_url)
        .stream_replies(stream_replies)
        .request_timeout(Duration::from_millis(500))
        .build()
        .expect("Valid RelayConfig")
}

fn speechy_waveform() -> Waveform {
    let mut samples = vec![0.0f32; 3_200]; // 200 ms of silence
    let tone_len = CANONICAL_SAMPLE_RATE as usize; // 1 s
    samples.extend((0..tone_len).map(|i| {
        let t = i as f32 / CANONICAL_SAMPLE_RATE as f32;
        0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
    }));
    Waveform::new(samples, CANONICAL_SAMPLE_RATE)
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let relay = spawn_relay(config_with_backend("http://127.0.0.1:9", true)).await?;
    let body: Value = reqwest::get(&relay).await?.json().await?;
    assert_eq!(body["status"], json!("healthy"));
    Ok(())
}

#[tokio::test]
async fn buffered_process_round_trip() -> anyhow::Result<()> {
    let (backend, _calls) = spawn_backend(post(mock_buffered)).await?;
    let relay = spawn_relay(config_with_backend(&backend, false)).await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body, json!({ "response": "Hi there!" }));
    Ok(())
}

#[tokio::test]
async fn streaming_process_concatenates_fragments() -> anyhow::Result<()> {
    let (backend, _calls) = spawn_backend(post(mock_streaming)).await?;
    let relay = spawn_relay(config_with_backend(&backend, true)).await?;

    let response = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(response.text().await?, "Hi there");
    Ok(())
}

#[tokio::test]
async fn empty_text_never_reaches_the_backend() -> anyhow::Result<()> {
    let (backend, calls) = spawn_backend(post(mock_buffered)).await?;
    let relay = spawn_relay(config_with_backend(&backend, true)).await?;
    let client = reqwest::Client::new();

    for body in [json!({ "text": "   " }), json!({})] {
        let response = client
            .post(format!("{relay}/process"))
            .json(&body)
            .send()
            .await?;
        assert!(response.status().is_success());
        assert_eq!(response.text().await?, messages::EMPTY_INPUT);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn backend_down_degrades_to_fixed_message_streaming() -> anyhow::Result<()> {
    let backend = closed_port().await?;
    let relay = spawn_relay(config_with_backend(&backend, true)).await?;

    let response = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?;

    assert!(response.status().is_success());
    assert_eq!(response.text().await?, messages::BACKEND_DOWN);
    Ok(())
}

#[tokio::test]
async fn backend_down_degrades_to_fixed_message_buffered() -> anyhow::Result<()> {
    let backend = closed_port().await?;
    let relay = spawn_relay(config_with_backend(&backend, false)).await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["response"], json!(messages::BACKEND_DOWN));
    Ok(())
}

#[tokio::test]
async fn backend_timeout_degrades_to_fixed_message() -> anyhow::Result<()> {
    let (backend, _calls) = spawn_backend(post(mock_slow)).await?;
    let relay = spawn_relay(config_with_backend(&backend, false)).await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["response"], json!(messages::BACKEND_TIMEOUT));
    Ok(())
}

#[tokio::test]
async fn unrecognizable_backend_reply_degrades_to_fixed_message() -> anyhow::Result<()> {
    let (backend, _calls) = spawn_backend(post(mock_unrecognizable)).await?;
    let relay = spawn_relay(config_with_backend(&backend, false)).await?;

    let body: Value = reqwest::Client::new()
        .post(format!("{relay}/process"))
        .json(&json!({ "text": "hello" }))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["response"], json!(messages::BACKEND_FAULT));
    Ok(())
}

#[tokio::test]
async fn recognizer_round_trip() -> anyhow::Result<()> {
    let router = Router::new().route("/recognize", post(mock_recognizer));
    let service = spawn(router).await?;

    let client = RecognizerClient::new(
        format!("{service}/recognize"),
        None,
        Duration::from_millis(100),
        Duration::from_secs(5),
    );

    let result = client.transcribe(&speechy_waveform()).await;
    assert_eq!(result, Transcription::Text("turn on the lights".to_string()));
    Ok(())
}

#[tokio::test]
async fn silent_waveform_short_circuits_without_network() {
    // Unroutable endpoint: a network attempt would show up as Unavailable.
    let client = RecognizerClient::new(
        "http://127.0.0.1:9/recognize",
        None,
        Duration::from_millis(100),
        Duration::from_secs(1),
    );

    let silence = Waveform::new(vec![0.0; 16_000], CANONICAL_SAMPLE_RATE);
    assert_eq!(client.transcribe(&silence).await, Transcription::NoMatch);
}

#[tokio::test]
async fn recognizer_down_reports_unavailable() -> anyhow::Result<()> {
    let service = closed_port().await?;
    let client = RecognizerClient::new(
        format!("{service}/recognize"),
        None,
        Duration::from_millis(100),
        Duration::from_secs(1),
    );

    let result = client.transcribe(&speechy_waveform()).await;
    assert_eq!(result, Transcription::Unavailable);
    assert_eq!(result.into_text(), messages::SPEECH_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
#[ignore] // Requires ffmpeg on PATH
async fn speech_upload_end_to_end() -> anyhow::Result<()> {
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::io::Cursor;

    let recognizer = spawn(Router::new().route("/recognize", post(mock_recognizer))).await?;
    let config = RelayConfig::builder()
        .backend_url("http://127.0.0.1:9")
        .recognizer_url(format!("{recognizer}/recognize"))
        .build()
        .expect("Valid RelayConfig");
    let relay = spawn_relay(config).await?;

    // Two seconds of tone, WAV-encoded; ffmpeg re-normalizes it.
    let spec = WavSpec {
        channels: 1,
        sample_rate: CANONICAL_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)?;
    for i in 0..(2 * CANONICAL_SAMPLE_RATE) {
        let t = i as f32 / CANONICAL_SAMPLE_RATE as f32;
        let sample = 0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;

    let part = reqwest::multipart::Part::bytes(cursor.into_inner())
        .file_name("voice.wav")
        .mime_str("audio/wav")?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let body: Value = reqwest::Client::new()
        .post(format!("{relay}/speech"))
        .multipart(form)
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(body["text"], json!("turn on the lights"));
    Ok(())
}
