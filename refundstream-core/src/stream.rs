//! Streaming primitives shared by the transport, reducer and session.
//!
//! Contract:
//! - A transport yields 0..n raw chunks, in arrival order, then ends.
//! - A read failure is yielded as a single `Err` item; nothing follows it.
//! - Chunks carry no framing: they may split frames and UTF-8 sequences.

use bytes::Bytes;

use crate::error::CoreResult;

/// Boxed stream of raw body chunks. Transports return this.
pub type ChunkStream = futures::stream::BoxStream<'static, CoreResult<Bytes>>;

/// Receives every display string the reducer produces.
///
/// Implemented for any `FnMut(&str)` closure, so a UI can pass its
/// re-render callback directly.
pub trait DisplaySink: Send {
    fn show(&mut self, text: &str);
}

impl<F> DisplaySink for F
where
    F: FnMut(&str) + Send,
{
    fn show(&mut self, text: &str) {
        self(text)
    }
}

/// Whether a reducer still wants chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A terminal marker was seen; further chunks are ignored.
    Finished,
}

impl Flow {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }
}
