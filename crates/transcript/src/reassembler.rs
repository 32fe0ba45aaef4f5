//! Reassembles newline-terminated lines from arbitrarily split text chunks.

use std::mem;

/// Carry buffer for the unterminated tail of the stream.
///
/// A line is only returned once its `\n` has been seen, no matter how many chunks it was split
/// across. The tail left at the end of a stream stays here until
/// [`take_remainder`](Self::take_remainder).
#[derive(Debug, Default)]
pub struct LineReassembler {
    carry: String,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every line it completes, in order, without the `\n`.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let Some(last_newline) = chunk.rfind('\n') else {
            self.carry.push_str(chunk);
            return Vec::new();
        };

        let (complete, tail) = chunk.split_at(last_newline);
        let mut lines: Vec<String> = complete.split('\n').map(str::to_string).collect();
        if !self.carry.is_empty() {
            let mut first = mem::take(&mut self.carry);
            first.push_str(&lines[0]);
            lines[0] = first;
        }
        // `tail` starts with the newline itself.
        self.carry.push_str(&tail[1..]);
        lines
    }

    /// Text received after the last newline.
    pub fn pending(&self) -> &str {
        &self.carry
    }

    /// Takes the unterminated tail, if any. Used by callers that know the stream has ended.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.carry))
        }
    }
}
