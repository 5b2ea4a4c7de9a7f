use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};

use crate::config::{BackendCfg, HttpCfg};
use crate::error::{CoreResult, ExplainError};
use crate::http_client::{HttpClient, RequestCtx};
use crate::model::ExplainRequest;
use crate::stream::ChunkStream;

/// Opens the byte stream behind one explain session.
///
/// The returned stream is finite and cannot be restarted; callers open a new
/// one per session. Implementations make a single attempt and never retry.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    fn name(&self) -> &str;
    async fn open(&self, req: &ExplainRequest, ctx: &RequestCtx<'_>) -> CoreResult<ChunkStream>;
}

/// Transport that POSTs the request to the configured explain endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    url: String,
}

impl HttpTransport {
    pub fn new(http: HttpClient, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn from_config(backend: &BackendCfg, http: &HttpCfg) -> CoreResult<Self> {
        Ok(Self::new(HttpClient::from_config(http)?, backend.explain_url()))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn open(&self, req: &ExplainRequest, ctx: &RequestCtx<'_>) -> CoreResult<ChunkStream> {
        self.http.post_stream(&self.url, req, ctx).await
    }
}

/// What a [`ScriptedTransport`] does after its last chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTail {
    /// The stream ends.
    End,
    /// A body read failure is yielded.
    Fail,
    /// The stream never produces another item.
    Hang,
}

/// Transport replaying canned chunks. Useful for tests and offline demos.
pub struct ScriptedTransport {
    chunks: Vec<Bytes>,
    tail: ScriptTail,
    reject_status: Option<u16>,
    seen: Mutex<Vec<ExplainRequest>>,
}

impl ScriptedTransport {
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            tail: ScriptTail::End,
            reject_status: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose open call fails with the given status.
    pub fn rejecting(status: u16) -> Self {
        let mut t = Self::new(Vec::<Bytes>::new());
        t.reject_status = Some(status);
        t
    }

    pub fn with_tail(mut self, tail: ScriptTail) -> Self {
        self.tail = tail;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ExplainRequest> {
        self.seen.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl StreamTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn open(&self, req: &ExplainRequest, _ctx: &RequestCtx<'_>) -> CoreResult<ChunkStream> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(req.clone());
        }
        if let Some(status) = self.reject_status {
            return Err(ExplainError::Transport { status });
        }
        let tail: ChunkStream = match self.tail {
            ScriptTail::End => stream::empty().boxed(),
            ScriptTail::Fail => stream::once(futures::future::ready(Err(
                ExplainError::StreamUnavailable("scripted read failure".into()),
            )))
            .boxed(),
            ScriptTail::Hang => stream::pending().boxed(),
        };
        let head = stream::iter(self.chunks.clone().into_iter().map(Ok));
        Ok(head.chain(tail).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn scripted_replays_chunks_then_ends() {
        let t = ScriptedTransport::new(["data: a\n", "data: b\n"]);
        let req = ExplainRequest::new("r1", "q", false);
        let mut s = t.open(&req, &RequestCtx::default()).await.unwrap();
        assert_eq!(s.next().await.unwrap().unwrap(), Bytes::from_static(b"data: a\n"));
        assert_eq!(s.next().await.unwrap().unwrap(), Bytes::from_static(b"data: b\n"));
        assert!(s.next().await.is_none());
        assert_eq!(t.requests(), vec![req]);
    }

    #[tokio::test]
    async fn scripted_fail_tail_and_rejection() {
        let t = ScriptedTransport::new(["x"]).with_tail(ScriptTail::Fail);
        let req = ExplainRequest::new("r1", "q", false);
        let mut s = t.open(&req, &RequestCtx::default()).await.unwrap();
        assert!(s.next().await.unwrap().is_ok());
        assert!(matches!(
            s.next().await,
            Some(Err(ExplainError::StreamUnavailable(_)))
        ));

        let rejecting = ScriptedTransport::rejecting(503);
        let res = rejecting.open(&req, &RequestCtx::default()).await;
        assert!(matches!(res, Err(ExplainError::Transport { status: 503 })));
    }

    #[tokio::test]
    async fn http_transport_posts_wire_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/api/explain")
                .json_body(json!({"return_id": "ret-9", "question": "Why?", "use_backend": true}));
            then.status(200)
                .header("content-type", "text/event-stream")
                .body("data: {\"type\":\"done\"}\n");
        });
        let backend = BackendCfg {
            base_url: server.base_url(),
            ..Default::default()
        };
        let t = HttpTransport::from_config(&backend, &HttpCfg::default()).unwrap();
        assert_eq!(t.url(), format!("{}/api/explain", server.base_url()));
        let req = ExplainRequest::new("ret-9", "Why?", true);
        let mut s = t.open(&req, &RequestCtx::default()).await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = s.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, b"data: {\"type\":\"done\"}\n");
        m.assert();
    }
}
