use bytes::Bytes;
use futures::stream::{self, StreamExt};

use colloquy::application::ports::{LlmByteStream, LlmClientError};
use colloquy::application::services::{SseDecoder, decode_event_stream};
use colloquy::domain::StreamEvent;

fn body(chunks: &[&'static str]) -> LlmByteStream {
    let items: Vec<Result<Bytes, LlmClientError>> = chunks
        .iter()
        .map(|c| Ok(Bytes::from_static(c.as_bytes())))
        .collect();
    Box::pin(stream::iter(items))
}

async fn collect(chunks: &[&'static str]) -> Vec<StreamEvent> {
    decode_event_stream(body(chunks))
        .map(|event| event.unwrap())
        .collect()
        .await
}

#[tokio::test]
async fn given_single_content_frame_when_decoding_then_content_then_done() {
    let events = collect(&["data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n"]).await;

    assert_eq!(
        events,
        vec![StreamEvent::Content("Hi".to_string()), StreamEvent::Done]
    );
}

#[tokio::test]
async fn given_many_frames_when_decoding_then_input_order_is_preserved() {
    let events = collect(&[
        "data: {\"choices\":[{\"delta\":{\"reasoning\":\"think\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"more\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n",
    ])
    .await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Reasoning("think".to_string()),
            StreamEvent::Content("a".to_string()),
            StreamEvent::Reasoning("more".to_string()),
            StreamEvent::Content("b".to_string()),
        ]
    );
}

#[tokio::test]
async fn given_frames_after_done_when_decoding_then_consumption_stops_at_done() {
    let events = collect(&[
        "data: [DONE]\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
    ])
    .await;

    assert_eq!(events, vec![StreamEvent::Done]);
}

#[tokio::test]
async fn given_malformed_json_when_decoding_then_line_is_skipped_silently() {
    let events = collect(&[
        "data: {not json\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
    ])
    .await;

    assert_eq!(events, vec![StreamEvent::Content("ok".to_string())]);
}

#[tokio::test]
async fn given_error_payload_when_decoding_then_error_event_carries_message() {
    let events = collect(&["data: {\"error\":{\"message\":\"rate limited\"}}\n"]).await;

    assert_eq!(events, vec![StreamEvent::Error("rate limited".to_string())]);
}

#[tokio::test]
async fn given_comments_and_empty_deltas_when_decoding_then_no_events() {
    let events = collect(&[
        ": OPENROUTER PROCESSING\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n",
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n",
        "data: {\"id\":\"gen-1\",\"usage\":{\"total_tokens\":3}}\n",
    ])
    .await;

    assert!(events.is_empty());
}

#[tokio::test]
async fn given_frame_split_across_reads_when_decoding_then_emitted_once_complete() {
    let events = collect(&[
        "data: {\"choices\":[{\"de",
        "lta\":{\"content\":\"Bon",
        "jour\"}}]}\ndata: [DO",
        "NE]\n",
    ])
    .await;

    assert_eq!(
        events,
        vec![StreamEvent::Content("Bonjour".to_string()), StreamEvent::Done]
    );
}

#[tokio::test]
async fn given_body_ending_without_done_when_decoding_then_stream_finishes() {
    let events = collect(&["data: {\"choices\":[{\"delta\":{\"content\":\"cut\"}}]}\n"]).await;

    assert_eq!(events, vec![StreamEvent::Content("cut".to_string())]);
}

#[tokio::test]
async fn given_transport_failure_when_decoding_then_error_is_yielded_and_stream_ends() {
    let items: Vec<Result<Bytes, LlmClientError>> = vec![
        Ok(Bytes::from_static(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n")),
        Err(LlmClientError::ApiRequestFailed("connection reset".to_string())),
        Ok(Bytes::from_static(b"data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n")),
    ];
    let results: Vec<_> = decode_event_stream(Box::pin(stream::iter(items)))
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert!(matches!(&results[0], Ok(StreamEvent::Content(text)) if text == "a"));
    assert!(results[1].is_err());
}

#[test]
fn given_multibyte_char_split_across_chunks_when_pushing_then_decoded_intact() {
    let frame = "data: {\"choices\":[{\"delta\":{\"content\":\"é\"}}]}\n".as_bytes();
    let split = frame.iter().position(|&b| b == 0xC3).unwrap() + 1;

    let mut decoder = SseDecoder::new();
    assert!(decoder.push(&frame[..split]).is_empty());
    let events = decoder.push(&frame[split..]);

    assert_eq!(events, vec![StreamEvent::Content("é".to_string())]);
}

#[test]
fn given_trailing_line_without_newline_when_finishing_then_decoded() {
    let mut decoder = SseDecoder::new();
    assert!(decoder.push(b"data: [DONE]").is_empty());
    assert_eq!(decoder.finish(), Some(StreamEvent::Done));
    assert_eq!(decoder.finish(), None);
}
