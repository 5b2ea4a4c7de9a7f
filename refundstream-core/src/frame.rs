//! Incremental line framing for SSE bodies.
//!
//! Chunk boundaries from the transport carry no meaning: a frame may be split
//! across chunks, several frames may share one chunk, and a chunk may even end
//! in the middle of a multi-byte UTF-8 sequence. `LineFrameDecoder` owns the
//! not-yet-terminated suffix and hands back only complete lines, so feeding
//! the same bytes in any split yields the same frames.

/// Splits a byte stream into `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineFrameDecoder {
    /// Decoded text after the last recognized `\n`.
    buf: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    partial_utf8: Vec<u8>,
}

impl LineFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk and return every line it completed, in order.
    /// The terminator (`\n`, or `\r\n`) is stripped from each returned line.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut frames = Vec::new();
        while let Some(idx) = self.buf.find('\n') {
            let mut line = self.buf.drain(..=idx).collect::<String>();
            line.truncate(line.len() - 1);
            if line.ends_with('\r') {
                line.truncate(line.len() - 1);
            }
            frames.push(line);
        }
        frames
    }

    /// Text received after the last line terminator. Never emitted as a frame.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    fn decode(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.partial_utf8);
        bytes.extend_from_slice(chunk);

        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    self.buf.push_str(s);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.buf.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            self.buf.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Sequence continues in the next chunk.
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        self.partial_utf8 = rest.to_vec();
    }
}
