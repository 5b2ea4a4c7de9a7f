//! Session controller: one explain request from trigger to termination.
//!
//! A session clears the display, opens the transport, feeds every chunk to a
//! fresh [`SseReducer`] and stops on `done`/`[DONE]`, stream end, failure or
//! cancellation. Starting a session while another is in flight cancels the
//! older one (cancel-and-replace); the superseded session emits nothing more.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{field, info, info_span, warn};
use tracing_futures::Instrument;

use crate::config::{Config, DEFAULT_QUESTION};
use crate::error::CoreResult;
use crate::http_client::RequestCtx;
use crate::model::{ExplainRequest, SessionOutcome};
use crate::normalizer::normalize_explain;
use crate::reducer::SseReducer;
use crate::stream::DisplaySink;
use crate::telemetry::{
    self, SessionTrace, KEY_CHUNKS, KEY_ERROR_KIND, KEY_EVENTS, KEY_FRAMES, KEY_LATENCY_MS,
    KEY_OUTCOME, KEY_REQUEST_ID, KEY_RETURN_ID, KEY_TRANSPORT, KEY_USE_BACKEND, SPAN_SESSION,
};
use crate::transport::{HttpTransport, StreamTransport};

/// The only failure text a user ever sees.
pub const FALLBACK_ERROR_TEXT: &str = "Error loading explanation. Please try again.";

struct ActiveSession {
    generation: u64,
    token: CancellationToken,
    superseded: Arc<AtomicBool>,
}

/// How the pump loop stopped, before mapping to a [`SessionOutcome`].
enum Ended {
    Finished,
    Exhausted,
    Cancelled,
}

pub struct SessionController {
    transport: Arc<dyn StreamTransport>,
    default_question: String,
    use_backend_default: bool,
    generation: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            transport,
            default_question: DEFAULT_QUESTION.to_string(),
            use_backend_default: false,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    /// Build a controller talking HTTP to the configured backend.
    pub fn from_config(cfg: &Config) -> CoreResult<Self> {
        let transport = HttpTransport::from_config(&cfg.backend, &cfg.http)?;
        let mut ctl = Self::new(Arc::new(transport)).with_default_question(&cfg.explain.default_question);
        ctl.use_backend_default = cfg.explain.use_backend;
        Ok(ctl)
    }

    pub fn with_default_question(mut self, question: &str) -> Self {
        self.default_question = question.to_string();
        self
    }

    /// `use_backend` value configured for callers that do not choose one.
    pub fn use_backend_default(&self) -> bool {
        self.use_backend_default
    }

    /// True while the most recently started session is still running.
    pub fn is_loading(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    /// Abort the in-flight session, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match self.active.lock() {
            Ok(active) => match active.as_ref() {
                Some(s) => {
                    s.token.cancel();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Run one session asking the default question.
    pub async fn start_stream(
        &self,
        return_id: &str,
        use_backend: bool,
        sink: &mut dyn DisplaySink,
    ) -> SessionOutcome {
        self.explain(ExplainRequest::new(return_id, "", use_backend), sink)
            .await
    }

    /// Run one session to completion, emitting every display update to `sink`.
    pub async fn explain(&self, req: ExplainRequest, sink: &mut dyn DisplaySink) -> SessionOutcome {
        let started = Instant::now();
        let (generation, token, superseded) = self.begin();
        let request_id = format!("{}-{}", req.return_id.trim(), generation);

        let span = info_span!(
            SPAN_SESSION,
            { KEY_RETURN_ID } = %req.return_id,
            { KEY_REQUEST_ID } = %request_id,
            { KEY_USE_BACKEND } = req.use_backend,
            { KEY_TRANSPORT } = self.transport.name(),
            { KEY_OUTCOME } = field::Empty,
            { KEY_CHUNKS } = field::Empty,
            { KEY_FRAMES } = field::Empty,
            { KEY_EVENTS } = field::Empty,
            { KEY_LATENCY_MS } = field::Empty,
            { KEY_ERROR_KIND } = field::Empty,
        );

        sink.show("");
        let mut reducer = SseReducer::new();
        let result = self
            .run(req.clone(), &request_id, &token, &mut reducer, sink)
            .instrument(span.clone())
            .await;

        let mut error_kind = None;
        let outcome = match result {
            Ok(Ended::Finished) => SessionOutcome::Finished,
            Ok(Ended::Exhausted) => SessionOutcome::Exhausted,
            Ok(Ended::Cancelled) if superseded.load(Ordering::SeqCst) => SessionOutcome::Superseded,
            Ok(Ended::Cancelled) => SessionOutcome::Cancelled,
            Err(e) => {
                let _enter = span.enter();
                warn!(error = %e, kind = e.kind(), "explain session failed");
                error_kind = Some(e.kind());
                sink.show(FALLBACK_ERROR_TEXT);
                SessionOutcome::Failed
            }
        };
        self.end(generation);

        let stats = reducer.stats();
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        span.record(KEY_OUTCOME, outcome.as_str());
        span.record(KEY_CHUNKS, stats.chunks);
        span.record(KEY_FRAMES, stats.frames);
        span.record(KEY_EVENTS, stats.events);
        span.record(KEY_LATENCY_MS, latency_ms);
        if let Some(kind) = error_kind {
            span.record(KEY_ERROR_KIND, kind);
        }
        {
            let _enter = span.enter();
            info!(outcome = outcome.as_str(), latency_ms, "explain session ended");
        }

        telemetry::emit(
            SessionTrace::new()
                .return_id(&req.return_id)
                .request_id(&request_id)
                .use_backend(req.use_backend)
                .transport(self.transport.name())
                .outcome(outcome)
                .counts(stats.chunks, stats.frames, stats.events)
                .latency_ms(latency_ms)
                .error_kind_opt(error_kind),
        );
        outcome
    }

    async fn run(
        &self,
        req: ExplainRequest,
        request_id: &str,
        token: &CancellationToken,
        reducer: &mut SseReducer,
        sink: &mut dyn DisplaySink,
    ) -> CoreResult<Ended> {
        let req = normalize_explain(req, &self.default_question)?;
        let ctx = RequestCtx {
            request_id: Some(request_id),
        };

        let mut chunks = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(Ended::Cancelled),
            opened = self.transport.open(&req, &ctx) => opened?,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return Ok(Ended::Cancelled),
                next = chunks.next() => next,
            };
            match next {
                None => return Ok(Ended::Exhausted),
                Some(Err(e)) => return Err(e),
                Some(Ok(bytes)) => {
                    if reducer.feed(&bytes, sink).is_finished() {
                        return Ok(Ended::Finished);
                    }
                }
            }
        }
    }

    fn begin(&self) -> (u64, CancellationToken, Arc<AtomicBool>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let superseded = Arc::new(AtomicBool::new(false));
        if let Ok(mut active) = self.active.lock() {
            if let Some(prev) = active.take() {
                prev.superseded.store(true, Ordering::SeqCst);
                prev.token.cancel();
            }
            *active = Some(ActiveSession {
                generation,
                token: token.clone(),
                superseded: superseded.clone(),
            });
        }
        (generation, token, superseded)
    }

    fn end(&self, generation: u64) {
        if let Ok(mut active) = self.active.lock()
            && active.as_ref().is_some_and(|a| a.generation == generation)
        {
            *active = None;
        }
    }
}
