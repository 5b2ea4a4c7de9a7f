/// Span name and field keys for explain sessions.
/// Keep these stable; changing them is a breaking change for dashboards.
pub const SPAN_SESSION: &str = "explain.session";

pub const KEY_RETURN_ID: &str = "return_id";
pub const KEY_REQUEST_ID: &str = "request_id";
pub const KEY_USE_BACKEND: &str = "use_backend";
pub const KEY_TRANSPORT: &str = "transport";

pub const KEY_OUTCOME: &str = "outcome";
pub const KEY_CHUNKS: &str = "chunks";
pub const KEY_FRAMES: &str = "frames";
pub const KEY_EVENTS: &str = "events";
pub const KEY_LATENCY_MS: &str = "latency_ms";

/// Error-related (if applicable)
pub const KEY_ERROR_KIND: &str = "error_kind";
