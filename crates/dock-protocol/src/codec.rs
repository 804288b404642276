//! Streaming line framer for serial input
//!
//! Serial reads hand back arbitrary chunks, so bytes are buffered until a
//! `\n` arrives. A trailing `\r` is stripped, which makes both CRLF and bare
//! LF endings work.

use tracing::warn;

/// Longest line kept while waiting for a terminator
pub const MAX_LINE_LEN: usize = 256;

/// Line framer
#[derive(Debug, Default)]
pub struct LineCodec {
    buffer: Vec<u8>,
}

impl LineCodec {
    /// Create an empty codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
        }
    }

    /// Push raw bytes into the buffer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // A device streaming noise without newlines must not grow us forever
        if self.buffer.len() > MAX_LINE_LEN && !self.buffer.contains(&b'\n') {
            warn!(
                "Discarding {} bytes of unterminated serial input",
                self.buffer.len()
            );
            self.buffer.clear();
        }
    }

    /// Take the next complete line, without its terminator
    ///
    /// The holder terminates replies with CRLF. A bare LF is accepted as
    /// well, so firmware built with `println` line endings still binds.
    pub fn next_line(&mut self) -> Option<String> {
        let term_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.buffer.drain(..=term_pos).collect();

        let mut line = &raw[..raw.len() - 1];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        Some(String::from_utf8_lossy(line).into_owned())
    }

    /// Number of buffered bytes not yet returned as a line
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
