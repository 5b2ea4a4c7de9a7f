//! Decoding of `data:` frames into explain events.

use serde::{Deserialize, Serialize};

/// Prefix marking an event-bearing SSE line.
pub const DATA_PREFIX: &str = "data: ";

/// Legacy end-of-stream marker sent as a bare `data:` payload.
pub const LEGACY_DONE: &str = "[DONE]";

/// Structured event carried as JSON in a `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExplainEvent {
    /// Progress label replacing the current step header.
    Step {
        #[serde(default)]
        content: String,
    },
    /// Text appended to the explanation.
    Content {
        #[serde(default)]
        content: String,
    },
    /// Business-level failure reported by the upstream, rendered inline.
    Error {
        #[serde(default)]
        content: String,
    },
    Done {
        #[serde(default)]
        content: String,
    },
}

/// What a single frame turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    Event(ExplainEvent),
    /// Valid JSON that is not a known event (unknown `type`, not an object, ...).
    Unrecognized(serde_json::Value),
    /// Payload that is not JSON at all; handled by the legacy text path.
    Legacy(String),
}

impl FramePayload {
    /// Classify one complete frame. Returns `None` for lines that do not start
    /// with `data: ` (comments, keep-alives, blank separators, other fields).
    pub fn parse(frame: &str) -> Option<Self> {
        let payload = frame.strip_prefix(DATA_PREFIX)?;
        let value = match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(v) => v,
            Err(_) => return Some(Self::Legacy(payload.to_string())),
        };
        Some(match ExplainEvent::deserialize(&value) {
            Ok(ev) => Self::Event(ev),
            Err(_) => Self::Unrecognized(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_each_event_type() {
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"step","content":"Checking"}"#),
            Some(FramePayload::Event(ExplainEvent::Step { content: "Checking".into() }))
        );
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"content","content":"Hello "}"#),
            Some(FramePayload::Event(ExplainEvent::Content { content: "Hello ".into() }))
        );
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"error","content":"boom"}"#),
            Some(FramePayload::Event(ExplainEvent::Error { content: "boom".into() }))
        );
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"done"}"#),
            Some(FramePayload::Event(ExplainEvent::Done { content: String::new() }))
        );
    }

    #[test]
    fn non_data_lines_are_skipped() {
        assert_eq!(FramePayload::parse(""), None);
        assert_eq!(FramePayload::parse(": keep-alive"), None);
        assert_eq!(FramePayload::parse("event: message"), None);
        // prefix must include the space
        assert_eq!(FramePayload::parse("data:{\"type\":\"done\"}"), None);
    }

    #[test]
    fn plain_text_falls_back_to_legacy() {
        assert_eq!(
            FramePayload::parse("data: plain text"),
            Some(FramePayload::Legacy("plain text".into()))
        );
        assert_eq!(
            FramePayload::parse("data: [DONE]"),
            Some(FramePayload::Legacy(LEGACY_DONE.into()))
        );
        assert_eq!(FramePayload::parse("data: "), Some(FramePayload::Legacy(String::new())));
    }

    #[test]
    fn json_without_known_type_is_unrecognized() {
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"usage","tokens":3}"#),
            Some(FramePayload::Unrecognized(json!({"type":"usage","tokens":3})))
        );
        assert_eq!(FramePayload::parse("data: 42"), Some(FramePayload::Unrecognized(json!(42))));
    }

    #[test]
    fn extra_fields_are_ignored() {
        assert_eq!(
            FramePayload::parse(r#"data: {"type":"content","content":"x","seq":7}"#),
            Some(FramePayload::Event(ExplainEvent::Content { content: "x".into() }))
        );
    }
}
