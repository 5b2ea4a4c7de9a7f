use serde::{Deserialize, Serialize};

/// Body of the streaming explain call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExplainRequest {
    pub return_id: String,
    pub question: String,
    pub use_backend: bool,
}

impl ExplainRequest {
    pub fn new(return_id: impl Into<String>, question: impl Into<String>, use_backend: bool) -> Self {
        Self {
            return_id: return_id.into(),
            question: question.into(),
            use_backend,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// A `done` event or the legacy `[DONE]` sentinel was seen.
    Finished,
    /// The transport ran out of chunks without a terminal marker.
    Exhausted,
    /// Opening or reading the stream failed; the fallback message is showing.
    Failed,
    /// A newer session replaced this one.
    Superseded,
    /// The caller cancelled the session.
    Cancelled,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
            Self::Superseded => "superseded",
            Self::Cancelled => "cancelled",
        }
    }
}
