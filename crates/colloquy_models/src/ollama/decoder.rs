//! Token stream decoder for the backend's newline-delimited JSON protocol.
//!
//! The backend keeps one HTTP connection open for the whole generation and
//! writes one JSON object per line, each carrying a partial text delta.
//! [`decode_fragments`] turns that raw byte stream into a lazy sequence of
//! cleaned [`Fragment`]s: nothing is buffered beyond the current line, and
//! each fragment is yielded as soon as its line is complete.
//!
//! Lines that fail to parse are dropped silently, as are parsed lines with
//! no text delta; neither aborts the stream. A transport failure or an
//! expired idle-read timeout terminates the sequence after one final
//! fragment carrying a fixed user-facing message, so the consumer always
//! receives something it can forward.

use crate::ollama::dto::StreamEvent;
use async_stream::stream;
use bytes::Bytes;
use colloquy_core::{Fragment, messages};
use futures_util::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

/// Decode a streaming generation body into a lazy fragment sequence.
///
/// The sequence is finite and single-pass: it ends when the underlying
/// stream ends. Consuming one fragment drives exactly the network reads
/// needed to complete the next line; dropping the sequence early drops the
/// byte stream and with it the underlying connection.
///
/// `idle_timeout` bounds each individual read so a hung backend cannot
/// keep the connection open forever.
pub fn decode_fragments<S, E>(bytes: S, idle_timeout: Duration) -> impl Stream<Item = Fragment>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    stream! {
        let mut bytes = bytes;
        let mut buf: Vec<u8> = Vec::new();
        let mut open = true;
        while open {
            match tokio::time::timeout(idle_timeout, bytes.next()).await {
                Err(_) => {
                    warn!(
                        idle_timeout_secs = idle_timeout.as_secs(),
                        "Backend stream went idle"
                    );
                    yield Fragment::new(messages::BACKEND_FAULT);
                    break;
                }
                Ok(Some(Err(e))) => {
                    warn!(error = %e, "Backend stream failed mid-read");
                    yield Fragment::new(messages::BACKEND_FAULT);
                    break;
                }
                Ok(None) => {
                    // Trailing line without a newline terminator
                    if let Some(fragment) = decode_line(&buf) {
                        yield fragment;
                    }
                    open = false;
                }
                Ok(Some(Ok(chunk))) => {
                    buf.extend_from_slice(&chunk);
                    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buf.drain(..=pos).collect();
                        if let Some(fragment) = decode_line(&line[..pos]) {
                            yield fragment;
                        }
                    }
                }
            }
        }
    }
}

/// Decode one line of the streaming body.
///
/// Returns `None` for empty lines, unparseable lines, and bookkeeping
/// records without a text delta.
fn decode_line(line: &[u8]) -> Option<Fragment> {
    let line = match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    };
    if line.is_empty() {
        return None;
    }
    let event: StreamEvent = match serde_json::from_slice(line) {
        Ok(event) => event,
        Err(e) => {
            debug!(error = %e, "Dropping unparseable stream line");
            return None;
        }
    };
    let text = event.into_response()?;
    Some(Fragment::new(repair_escapes(&text)))
}

/// Decode double-encoded backslash escapes left in backend text deltas.
///
/// The backend's deltas sometimes arrive with escape sequences written out
/// as two characters (`\` + `n`) instead of the whitespace they stand for.
/// This decodes the common sequences back to their literal characters,
/// resolves `\uXXXX` code points, and strips the stray carriage returns
/// and lone backslashes the same double-encoding leaves behind. Text
/// without escapes passes through unchanged.
fn repair_escapes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\r' {
            i += 1;
            continue;
        }
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let Some(&next) = chars.get(i + 1) else {
            // Lone trailing backslash
            break;
        };
        i += 2;
        match next {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => {}
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'u' => {
                let digits: String = chars[i..].iter().take(4).collect();
                let decoded = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(decoded) => {
                        out.push(decoded);
                        i += 4;
                    }
                    // Not a unicode escape; the backslash is stripped
                    None => out.push('u'),
                }
            }
            other => out.push(other),
        }
    }
    out
}
