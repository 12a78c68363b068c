use futures::stream::{Stream, StreamExt};
use serde_json::Value;

use crate::application::ports::{LlmByteStream, LlmClientError};
use crate::domain::StreamEvent;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Incremental line decoder for an OpenAI-style SSE completion body.
///
/// Bytes are buffered until a newline arrives, so a frame split across
/// network reads (including inside a multi-byte character) decodes once.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw chunk and returns the events of every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// Decodes whatever unterminated line is left once the body has ended.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&String::from_utf8_lossy(&rest))
    }
}

/// Classifies a single SSE line into at most one event.
pub fn decode_line(line: &str) -> Option<StreamEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix(DATA_PREFIX)?;
    if data == DONE_SENTINEL {
        return Some(StreamEvent::Done);
    }

    // malformed fragments are noise, not errors
    let parsed: Value = serde_json::from_str(data).ok()?;
    decode_payload(&parsed)
}

fn decode_payload(parsed: &Value) -> Option<StreamEvent> {
    if let Some(error) = parsed.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_ERROR);
        return Some(StreamEvent::Error(message.to_string()));
    }

    let delta = parsed.pointer("/choices/0/delta")?;
    let field = |name: &str| {
        delta
            .get(name)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    };

    if let Some(content) = field("content") {
        return Some(StreamEvent::Content(content));
    }

    field("reasoning")
        .or_else(|| field("reasoning_content"))
        .map(StreamEvent::Reasoning)
}

/// Lazily turns an upstream byte stream into decoded events.
///
/// The stream ends after a `Done` event, after a transport error, or when the
/// body is exhausted.
pub fn decode_event_stream(
    mut body: LlmByteStream,
) -> impl Stream<Item = Result<StreamEvent, LlmClientError>> + Send {
    async_stream::stream! {
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for event in decoder.push(&bytes) {
                let done = event == StreamEvent::Done;
                yield Ok(event);
                if done {
                    return;
                }
            }
        }

        if let Some(event) = decoder.finish() {
            yield Ok(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_comment_and_blank_lines_when_decoding_then_no_events() {
        assert_eq!(decode_line(": OPENROUTER PROCESSING"), None);
        assert_eq!(decode_line("   "), None);
        assert_eq!(decode_line("event: ping"), None);
    }

    #[test]
    fn given_both_reasoning_fields_when_decoding_then_reasoning_wins() {
        let event = decode_line(
            r#"data: {"choices":[{"delta":{"reasoning":"a","reasoning_content":"b"}}]}"#,
        );
        assert_eq!(event, Some(StreamEvent::Reasoning("a".to_string())));
    }

    #[test]
    fn given_error_without_message_when_decoding_then_unknown_error() {
        let event = decode_line(r#"data: {"error":{"code":500}}"#);
        assert_eq!(event, Some(StreamEvent::Error("Unknown error".to_string())));
    }

    #[test]
    fn given_line_split_across_chunks_when_pushing_then_decoded_once_complete() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"choices\":[{\"del").is_empty());
        let events = decoder.push(b"ta\":{\"content\":\"Hi\"}}]}\r\n");
        assert_eq!(events, vec![StreamEvent::Content("Hi".to_string())]);
    }
}
