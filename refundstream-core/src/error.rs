use thiserror::Error;

/// Core error type for refundstream.
/// Internally, modules can use `anyhow::Result<T>` for convenience,
/// but public boundaries should expose `CoreResult<T>` with this error.
///
/// None of these reach the display: the session boundary turns every one of
/// them into [`crate::session::FALLBACK_ERROR_TEXT`].
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Stream-opening call answered with a non-success status.
    #[error("explain backend returned status {status}")]
    Transport { status: u16 },

    /// Connection could not be established or the request could not be sent.
    #[error("explain backend unavailable: {0}")]
    Unavailable(String),

    /// The response body could not be read as a byte stream.
    #[error("response stream unavailable: {0}")]
    StreamUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExplainError {
    /// Short, stable label used for telemetry and span fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transport { .. } => "transport",
            Self::Unavailable(_) => "unavailable",
            Self::StreamUnavailable(_) => "stream_unavailable",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, ExplainError>;
