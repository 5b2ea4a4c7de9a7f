//! Reduces a stream of SSE frames into the single display string shown to the
//! user.
//!
//! `step` events replace the current step header, `content` events append to
//! the explanation, `error` events replace the display with an inline error,
//! and `done` (or the legacy `[DONE]` payload) freezes the display at the
//! accumulated content and stops all further processing.

use tracing::{debug, trace};

use crate::event::{ExplainEvent, FramePayload, LEGACY_DONE};
use crate::frame::LineFrameDecoder;
use crate::stream::{DisplaySink, Flow};

/// Evolving state behind the display string. Only ever grows during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    pub current_step: String,
    pub accumulated_content: String,
}

impl RenderState {
    /// `**<step>**\n\n<content>`. An unset step still renders its (empty) header.
    pub fn display(&self) -> String {
        format!("**{}**\n\n{}", self.current_step, self.accumulated_content)
    }
}

/// Counters for one reducer's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReducerStats {
    pub chunks: u64,
    /// Complete lines, including ones that were ignored.
    pub frames: u64,
    /// Frames that changed the display.
    pub events: u64,
}

/// One reducer per session; construct a fresh one for every explain request.
#[derive(Debug, Default)]
pub struct SseReducer {
    decoder: LineFrameDecoder,
    state: RenderState,
    finished: bool,
    stats: ReducerStats,
}

impl SseReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn stats(&self) -> ReducerStats {
        self.stats
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consume one raw chunk, emitting a display string for every frame that
    /// changes what the user sees.
    pub fn feed(&mut self, chunk: &[u8], sink: &mut dyn DisplaySink) -> Flow {
        if self.finished {
            return Flow::Finished;
        }
        self.stats.chunks += 1;
        for frame in self.decoder.feed(chunk) {
            self.stats.frames += 1;
            if self.apply_frame(&frame, sink).is_finished() {
                self.finished = true;
                return Flow::Finished;
            }
        }
        Flow::Continue
    }

    fn apply_frame(&mut self, frame: &str, sink: &mut dyn DisplaySink) -> Flow {
        let Some(payload) = FramePayload::parse(frame) else {
            trace!(frame, "ignoring non-data line");
            return Flow::Continue;
        };
        match payload {
            FramePayload::Event(ev) => self.apply_event(ev, sink),
            FramePayload::Legacy(text) => {
                self.stats.events += 1;
                if text == LEGACY_DONE {
                    sink.show(&self.state.accumulated_content);
                    return Flow::Finished;
                }
                self.state.accumulated_content.push_str(&text);
                sink.show(&self.state.accumulated_content);
                Flow::Continue
            }
            FramePayload::Unrecognized(value) => {
                debug!(%value, "ignoring unrecognized event payload");
                Flow::Continue
            }
        }
    }

    fn apply_event(&mut self, ev: ExplainEvent, sink: &mut dyn DisplaySink) -> Flow {
        self.stats.events += 1;
        match ev {
            ExplainEvent::Step { content } => {
                self.state.current_step = content;
                sink.show(&self.state.display());
            }
            ExplainEvent::Content { content } => {
                self.state.accumulated_content.push_str(&content);
                sink.show(&self.state.display());
            }
            ExplainEvent::Error { content } => {
                debug!(error = %content, "upstream reported an error event");
                sink.show(&format!("**Error:** {content}"));
            }
            ExplainEvent::Done { .. } => {
                sink.show(&self.state.accumulated_content);
                return Flow::Finished;
            }
        }
        Flow::Continue
    }
}
