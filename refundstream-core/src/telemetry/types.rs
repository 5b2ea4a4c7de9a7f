use serde::{Deserialize, Serialize};

use crate::model::SessionOutcome;

/// Summary of one explain session, handed to the telemetry sink when the
/// session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionTrace {
    pub return_id: Option<String>,

    /// Correlation id sent as `X-Request-Id`.
    pub request_id: Option<String>,

    pub use_backend: bool,

    /// Transport name, e.g. "http".
    pub transport: Option<String>,

    pub outcome: Option<SessionOutcome>,

    pub chunks: u64,
    pub frames: u64,
    pub events: u64,

    /// Wall time from trigger to termination.
    pub latency_ms: Option<u64>,

    pub error_kind: Option<String>,
}

impl SessionTrace {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn return_id(mut self, v: &str) -> Self {
        self.return_id = Some(v.to_string());
        self
    }
    pub fn request_id(mut self, v: &str) -> Self {
        self.request_id = Some(v.to_string());
        self
    }
    pub fn use_backend(mut self, v: bool) -> Self {
        self.use_backend = v;
        self
    }
    pub fn transport(mut self, v: &str) -> Self {
        self.transport = Some(v.to_string());
        self
    }
    pub fn outcome(mut self, v: SessionOutcome) -> Self {
        self.outcome = Some(v);
        self
    }
    pub fn counts(mut self, chunks: u64, frames: u64, events: u64) -> Self {
        self.chunks = chunks;
        self.frames = frames;
        self.events = events;
        self
    }
    pub fn latency_ms(mut self, ms: u64) -> Self {
        self.latency_ms = Some(ms);
        self
    }
    pub fn error_kind_opt(mut self, kind: Option<&str>) -> Self {
        self.error_kind = kind.map(|s| s.to_string());
        self
    }
}
