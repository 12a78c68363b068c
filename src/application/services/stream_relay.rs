use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::application::ports::{CompletionRequest, LlmClient};
use crate::domain::{ERROR_PREFIX, REASONING_CLOSE, REASONING_OPEN, StreamEvent};

use super::decode_event_stream;

pub type RelayStream = Pin<Box<dyn Stream<Item = RelayUnit> + Send>>;

/// One flushable unit of the plain-text reply protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayUnit {
    Content(String),
    Reasoning(String),
    /// Terminal; nothing follows it on the wire.
    Error(String),
}

impl RelayUnit {
    pub fn encode(&self) -> String {
        match self {
            RelayUnit::Content(text) => text.clone(),
            RelayUnit::Reasoning(text) => format!("{REASONING_OPEN}{text}{REASONING_CLOSE}"),
            RelayUnit::Error(message) => format!("{ERROR_PREFIX}{message}"),
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            RelayUnit::Content(text) => Bytes::from(text),
            other => Bytes::from(other.encode()),
        }
    }

    /// A relay that only reports `message` and ends.
    pub fn error_stream(message: impl Into<String>) -> RelayStream {
        Box::pin(stream::once(futures::future::ready(RelayUnit::Error(
            message.into(),
        ))))
    }
}

/// Bridges a streaming completion to the plain-text reply protocol.
///
/// Dropping the returned stream drops the upstream body, which closes the
/// upstream connection; a disconnected client therefore stops the relay.
pub struct StreamRelay<L>
where
    L: LlmClient,
{
    llm_client: Arc<L>,
}

impl<L> StreamRelay<L>
where
    L: LlmClient + 'static,
{
    pub fn new(llm_client: Arc<L>) -> Self {
        Self { llm_client }
    }

    #[tracing::instrument(skip(self, request), fields(model = %request.model, history = request.messages.len()))]
    pub fn relay(&self, request: CompletionRequest) -> RelayStream {
        let llm_client = Arc::clone(&self.llm_client);

        Box::pin(async_stream::stream! {
            let body = match llm_client.complete_stream(&request).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, "Streaming completion request failed");
                    yield RelayUnit::Error(e.user_message());
                    return;
                }
            };

            let mut events = Box::pin(decode_event_stream(body));
            let mut units = 0usize;

            while let Some(event) = events.next().await {
                if let Ok(event) = &event {
                    tracing::trace!(kind = event.kind(), "Decoded stream event");
                }
                match event {
                    Ok(StreamEvent::Content(text)) if !text.is_empty() => {
                        units += 1;
                        yield RelayUnit::Content(text);
                    }
                    Ok(StreamEvent::Reasoning(text)) if !text.is_empty() => {
                        units += 1;
                        yield RelayUnit::Reasoning(text);
                    }
                    Ok(StreamEvent::Error(message)) => {
                        tracing::warn!(error = %message, "Upstream reported an in-band error");
                        yield RelayUnit::Error(message);
                        return;
                    }
                    Ok(StreamEvent::Done) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Upstream stream broke mid-response");
                        yield RelayUnit::Error(e.user_message());
                        return;
                    }
                }
            }

            tracing::debug!(units, "Relay finished");
        })
    }
}
