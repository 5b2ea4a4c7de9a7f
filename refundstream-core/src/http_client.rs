use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::HttpCfg;
use crate::error::{CoreResult, ExplainError};
use crate::stream::ChunkStream;

/// Request context carries correlation ids.
#[derive(Clone, Copy, Default)]
pub struct RequestCtx<'a> {
    pub request_id: Option<&'a str>,
}

/// Thin wrapper around reqwest::Client with defaults and helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new_default() -> CoreResult<Self> {
        Self::from_config(&HttpCfg::default())
    }

    pub fn from_config(cfg: &HttpCfg) -> CoreResult<Self> {
        let mut builder =
            Client::builder().connect_timeout(Duration::from_millis(cfg.connect_timeout_ms));
        if cfg.request_timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(cfg.request_timeout_ms));
        }
        if let Some(n) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(n);
        }
        let inner = builder
            .build()
            .map_err(|e| ExplainError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: "refundstream/0.1".to_string(),
        })
    }

    /// POST JSON and return the response body as a stream of raw chunks.
    ///
    /// One attempt only. A non-success status becomes `Transport`, a failed
    /// send becomes `Unavailable`, and a body read failure is yielded as a
    /// `StreamUnavailable` item.
    pub async fn post_stream<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        ctx: &RequestCtx<'_>,
    ) -> CoreResult<ChunkStream> {
        let mut req = self
            .inner
            .post(url)
            .json(body)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "text/event-stream");

        if let Some(rid) = ctx.request_id {
            req = req.header("X-Request-Id", rid);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ExplainError::Unavailable(e.to_string()))?;

        let status = resp.status();
        let upstream_id = extract_request_id(resp.headers());
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                upstream_request_id = upstream_id.as_deref(),
                body = %truncate(&body, 300),
                "explain stream rejected"
            );
            return Err(ExplainError::Transport {
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !content_type.starts_with("text/event-stream") {
            debug!(content_type, "explain response is not declared as an event stream");
        }

        let chunks = resp
            .bytes_stream()
            .map(|r| r.map_err(|e| ExplainError::StreamUnavailable(e.to_string())));
        Ok(chunks.boxed())
    }
}

fn extract_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    static CANDIDATES: [&str; 3] = ["x-request-id", "request-id", "x-amzn-requestid"];
    for k in CANDIDATES {
        if let Some(v) = headers.get(k)
            && let Ok(s) = v.to_str()
        {
            return Some(s.to_string());
        }
    }
    None
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut t = s[..end].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
