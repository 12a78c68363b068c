/// A decoded unit of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Content(String),
    Reasoning(String),
    Error(String),
    Done,
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Content(_) => "content",
            StreamEvent::Reasoning(_) => "reasoning",
            StreamEvent::Error(_) => "error",
            StreamEvent::Done => "done",
        }
    }
}
