//! Streaming response handling

use std::pin::Pin;

use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::Stream;
use futures::StreamExt;
use serde::Deserialize;

use crate::errors::ExplorerError;
use crate::errors::Result;

/// Boxed stream of generated text fragments
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Streaming response from LLM
pub struct StreamingResponse {
    stream: TokenStream,
}

impl StreamingResponse {
    pub fn new(stream: TokenStream) -> Self {
        Self { stream }
    }

    /// Wrap a fixed sequence of fragments
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(Box::pin(futures::stream::iter(tokens.into_iter().map(Ok))))
    }

    /// Collect all chunks into a single string
    pub async fn collect_all(mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(chunk) = self.stream.next().await {
            result.push_str(&chunk?);
        }
        Ok(result)
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> TokenStream {
        self.stream
    }
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// One decoded event of an OpenAI-compatible chat stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// A non-empty content delta
    Token(String),
    /// The `[DONE]` sentinel
    Done,
    /// Role-only or empty deltas
    Skip,
}

/// Decode the `data` field of one chat-completions event
pub fn parse_event_data(data: &str) -> Result<StreamChunk> {
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamChunk::Done);
    }
    if data.is_empty() {
        return Ok(StreamChunk::Skip);
    }

    let payload: ChunkPayload = serde_json::from_str(data)
        .map_err(|e| ExplorerError::Llm(format!("Malformed stream chunk: {e}")))?;
    let token = payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty());
    Ok(token.map_or(StreamChunk::Skip, StreamChunk::Token))
}

/// Turn a raw event-stream body into content fragments
///
/// The stream ends at `[DONE]` or when the body ends. A final event without its
/// terminating blank line is still delivered.
pub fn token_stream<S, E>(bytes: S) -> TokenStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let body = bytes.chain(futures::stream::once(async {
        Ok::<Bytes, E>(Bytes::from_static(b"\n\n"))
    }));

    let stream = async_stream::try_stream! {
        let mut events = Box::pin(body.eventsource());
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ExplorerError::Http(e.to_string()))?;
            match parse_event_data(&event.data)? {
                StreamChunk::Token(token) => yield token,
                StreamChunk::Done => break,
                StreamChunk::Skip => {}
            }
        }
    };
    Box::pin(stream)
}
