//! SSE delta stream for OpenRouter-style chat completions.
//!
//! Converts a chunked byte stream framed as server-sent events (`data: `
//! lines, `[DONE]` sentinel) into incremental text deltas. SSE framing is
//! handled by `eventsource-stream`, which buffers chunk boundaries that
//! split a line — a half-received `data:` line is re-parsed once the rest
//! of it arrives.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::stream::{Stream, StreamExt};

use crate::error::AppError;

const DONE_SENTINEL: &str = "[DONE]";

/// One item of the decoded completion stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDelta {
    /// Incremental text content from `choices[0].delta.content`.
    Content(String),
    /// The `[DONE]` sentinel — stream is complete, not an error.
    Done,
}

pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<StreamDelta, AppError>> + Send>>;

/// Decode an SSE byte stream into text deltas.
///
/// Payloads that are not valid JSON are skipped silently — partial or
/// malformed lines must never abort the stream. Transport errors are
/// surfaced as terminal `AppError::Completion` items; deltas already
/// yielded stay with the caller.
pub fn delta_stream<S, B, E>(byte_stream: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let events = byte_stream.eventsource();

    let mapped = events.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = event.data.trim();
                if data == DONE_SENTINEL {
                    return Some(Ok(StreamDelta::Done));
                }
                match serde_json::from_str::<serde_json::Value>(data) {
                    Ok(value) => value
                        .pointer("/choices/0/delta/content")
                        .and_then(|c| c.as_str())
                        .filter(|text| !text.is_empty())
                        .map(|text| Ok(StreamDelta::Content(text.to_string()))),
                    Err(_) => {
                        tracing::debug!(len = data.len(), "Skipping non-JSON stream line");
                        None
                    }
                }
            }
            Err(e) => Some(Err(AppError::Completion(format!("stream error: {e}")))),
        }
    });

    Box::pin(mapped)
}
