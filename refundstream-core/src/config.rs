use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub const DEFAULT_QUESTION: &str = "Why is my refund delayed?";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BackendCfg {
    /// Base URL of the explain service, e.g. http://localhost:3000
    pub base_url: String,
    /// Path of the streaming explain endpoint, appended to `base_url`.
    #[serde(default = "default_explain_path")]
    pub explain_path: String,
}

impl Default for BackendCfg {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            explain_path: default_explain_path(),
        }
    }
}

impl BackendCfg {
    pub fn explain_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.explain_path.trim_start_matches('/')
        )
    }
}

fn default_explain_path() -> String {
    "/api/explain".into()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HttpCfg {
    /// TCP connect timeout in milliseconds (default 5000ms)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Total request timeout in milliseconds. 0 disables it, which is the
    /// default: an explanation stream stays open as long as the backend keeps it.
    #[serde(default)]
    pub request_timeout_ms: u64,
    /// Optional per-host idle connection pool cap (None = reqwest default)
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

impl Default for HttpCfg {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: 0,
            pool_max_idle_per_host: None,
        }
    }
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExplainCfg {
    /// Question sent when the caller does not supply one.
    #[serde(default = "default_question")]
    pub default_question: String,
    /// Ask the upstream to use its live backend instead of the canned path.
    #[serde(default)]
    pub use_backend: bool,
}

impl Default for ExplainCfg {
    fn default() -> Self {
        Self {
            default_question: default_question(),
            use_backend: false,
        }
    }
}

fn default_question() -> String {
    DEFAULT_QUESTION.into()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendCfg,
    /// HTTP client configuration (timeouts, pooling). Missing → defaults.
    #[serde(default)]
    pub http: HttpCfg,
    #[serde(default)]
    pub explain: ExplainCfg,
}

impl Config {
    /// Load a Config from a file path (JSON or TOML by extension). If the
    /// extension is missing or unrecognized, try JSON first, then TOML.
    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::error::CoreResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(crate::error::ExplainError::from)?;
        let s = std::str::from_utf8(&bytes)
            .map_err(|e| crate::error::ExplainError::Other(e.into()))?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::ExplainError::Other(e.into()))?,
            Some("toml") => toml::from_str::<Self>(s)
                .map_err(|e| crate::error::ExplainError::Other(e.into()))?,
            _ => serde_json::from_str::<Self>(s)
                .map_err(|e| crate::error::ExplainError::Other(e.into()))
                .or_else(|_| {
                    toml::from_str::<Self>(s)
                        .map_err(|e| crate::error::ExplainError::Other(e.into()))
                })?,
        };
        Ok(cfg)
    }
}
