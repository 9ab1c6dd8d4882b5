//! Incremental decoding of streamed chat responses.
//!
//! Both backends stream line-oriented bodies: the OpenAI-compatible API sends Server-Sent
//! Events (`data: {chunk}` lines ending with `data: [DONE]`), Ollama sends one JSON object
//! per line. [`line_fragments`] reads a byte stream line by line and hands each line to a
//! format-specific parser.

use anyhow::Result;
use futures::stream::{BoxStream, Stream, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use std::io;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::errors::BackendError;

/// An ordered, finite stream of text fragments. The stream ends (`None`) when the backend
/// signals completion, an `Err` item terminates it with a failure, and dropping it cancels the
/// underlying request.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// What a single line of a streamed body means
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Fragment(String),
    Done,
    Skip,
}

pub type LineParser = fn(&str) -> Result<StreamEvent>;

pub fn line_fragments<S, B, E>(body: S, parse_line: LineParser) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BackendError> + Send + 'static,
{
    let body = body.map_ok(io::Cursor::new).map_err(|e| {
        let error: BackendError = e.into();
        io::Error::other(error)
    });
    let mut lines = StreamReader::new(Box::pin(body)).lines();

    Box::pin(async_stream::try_stream! {
        while let Some(line) = lines.next_line().await.map_err(stream_error)? {
            match parse_line(line.trim_end())? {
                StreamEvent::Fragment(text) => yield text,
                StreamEvent::Done => break,
                StreamEvent::Skip => {}
            }
        }
    })
}

/// Recover the backend error carried through the reader, or report an undecodable body
fn stream_error(error: io::Error) -> anyhow::Error {
    let message = error.to_string();
    match error.into_inner().map(|inner| inner.downcast::<BackendError>()) {
        Some(Ok(backend)) => anyhow::Error::from(*backend),
        _ => BackendError::MalformedResponse(format!("Unreadable stream body: {}", message)).into(),
    }
}

/// Concatenate every fragment of a stream, in order
pub async fn collect_text(stream: FragmentStream) -> Result<String> {
    stream
        .try_fold(String::new(), |mut text, fragment| async move {
            text.push_str(&fragment);
            Ok(text)
        })
        .await
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Parse one line of an OpenAI-compatible Server-Sent Events body
pub fn parse_sse_line(line: &str) -> Result<StreamEvent> {
    let Some(data) = line.strip_prefix("data:") else {
        // event:, id:, retry: and comment lines carry no text
        return Ok(StreamEvent::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamEvent::Done);
    }

    let value: Value = serde_json::from_str(data).map_err(|e| {
        BackendError::MalformedResponse(format!("Invalid stream chunk {}: {}", data, e))
    })?;
    if let Some(error) = value.get("error") {
        return Err(BackendError::Api(error.to_string()).into());
    }

    let chunk: ChatCompletionChunk = serde_json::from_value(value)
        .map_err(|e| BackendError::MalformedResponse(format!("Invalid stream chunk: {}", e)))?;

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
        .map(StreamEvent::Fragment)
        .unwrap_or(StreamEvent::Skip))
}

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    message: Option<OllamaChunkMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaChunkMessage {
    #[serde(default)]
    content: String,
}

/// Parse one line of an Ollama newline-delimited JSON body
pub fn parse_ndjson_line(line: &str) -> Result<StreamEvent> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(StreamEvent::Skip);
    }

    let chunk: OllamaChunk = serde_json::from_str(line).map_err(|e| {
        BackendError::MalformedResponse(format!("Invalid stream chunk {}: {}", line, e))
    })?;
    if let Some(error) = chunk.error {
        return Err(BackendError::Api(error).into());
    }

    let text = chunk.message.map(|m| m.content).unwrap_or_default();
    Ok(match (text.is_empty(), chunk.done) {
        (false, _) => StreamEvent::Fragment(text),
        (true, true) => StreamEvent::Done,
        (true, false) => StreamEvent::Skip,
    })
}
