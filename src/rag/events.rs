//! Event framing for streamed answers
//!
//! A stream is at most one `metadata` event, then `message` events in generation order, then
//! exactly one terminal `done` or `error` event. Payloads are JSON, so a `message` fragment is
//! sent as a JSON string and may safely contain newlines.

use serde::Serialize;

use super::QueryMode;
use super::SourceCitation;

/// Metadata sent before any answer text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamMetadata {
    pub mode: QueryMode,
    pub sources: Vec<SourceCitation>,
    pub retrieved_docs: usize,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonePayload {
    pub answer: String,
    pub token_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    Metadata(StreamMetadata),
    Message(String),
    Done(DonePayload),
    Error(ErrorPayload),
}

impl QueryEvent {
    #[must_use]
    pub fn done(answer: String, token_count: usize) -> Self {
        Self::Done(DonePayload {
            answer,
            token_count,
        })
    }

    #[must_use]
    pub fn error(error: impl ToString) -> Self {
        Self::Error(ErrorPayload {
            error: error.to_string(),
        })
    }

    /// Event name on the wire
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Metadata(_) => "metadata",
            Self::Message(_) => "message",
            Self::Done(_) => "done",
            Self::Error(_) => "error",
        }
    }

    /// Whether this event ends the stream
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error(_))
    }

    /// JSON payload; always a single line
    #[must_use]
    pub fn data(&self) -> String {
        let encoded = match self {
            Self::Metadata(metadata) => serde_json::to_string(metadata),
            Self::Message(token) => serde_json::to_string(token),
            Self::Done(done) => serde_json::to_string(done),
            Self::Error(error) => serde_json::to_string(error),
        };
        encoded.unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("failed to encode event: {e}") }).to_string()
        })
    }

    /// `event: <kind>\ndata: <json>\n\n`
    #[must_use]
    pub fn to_sse_frame(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.kind(), self.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_frame_escapes_newlines() {
        let frame = QueryEvent::Message("line one\nline two\r".to_string()).to_sse_frame();
        assert_eq!(frame, "event: message\ndata: \"line one\\nline two\\r\"\n\n");
    }

    #[test]
    fn test_done_frame() {
        let frame = QueryEvent::done("Paris".to_string(), 2).to_sse_frame();
        assert_eq!(
            frame,
            "event: done\ndata: {\"answer\":\"Paris\",\"token_count\":2}\n\n"
        );
    }

    #[test]
    fn test_metadata_payload_shape() {
        let event = QueryEvent::Metadata(StreamMetadata {
            mode: QueryMode::GeneralFallback,
            sources: vec![],
            retrieved_docs: 0,
            question: "q".to_string(),
            message: None,
            top_k: None,
        });
        let value: serde_json::Value = serde_json::from_str(&event.data()).unwrap();
        assert_eq!(value["mode"], "general_fallback");
        assert_eq!(value["sources"], serde_json::json!([]));
        assert!(value.get("top_k").is_none());
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_error_is_terminal() {
        let event = QueryEvent::error("LLM service unavailable");
        assert!(event.is_terminal());
        assert_eq!(event.kind(), "error");
        assert_eq!(event.data(), "{\"error\":\"LLM service unavailable\"}");
    }
}
