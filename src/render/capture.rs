//! Scoped output capture.
//!
//! Every open component and every open slot gets its own buffer. Writes go
//! to the innermost buffer and buffers are released in LIFO order.

/// A stack of output buffers on top of a root buffer that is never
/// released.
#[derive(Debug, Default)]
pub struct Capture {
    root: String,
    buffers: Vec<Buffer>,
    started: usize,
}

#[derive(Debug)]
struct Buffer {
    id: usize,
    text: String,
}

/// Identifies a buffer returned by [`Capture::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    index: usize,
    id: usize,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new buffer, all writes go here until it is released.
    pub fn begin(&mut self) -> Mark {
        let id = self.started;
        self.started += 1;
        self.buffers.push(Buffer {
            id,
            text: String::new(),
        });
        Mark {
            index: self.buffers.len() - 1,
            id,
        }
    }

    /// Releases the buffer and returns what was written to it.
    ///
    /// Any buffers started after `mark` that are still active are discarded
    /// first. A mark whose buffer was already released returns an empty
    /// string and leaves the active buffers alone.
    pub fn end(&mut self, mark: Mark) -> String {
        match self.buffers.get(mark.index) {
            Some(buf) if buf.id == mark.id => {}
            _ => return String::new(),
        }
        self.buffers.truncate(mark.index + 1);
        self.buffers.pop().map(|buf| buf.text).unwrap_or_default()
    }

    /// The buffer that currently receives output.
    pub fn current(&mut self) -> &mut String {
        match self.buffers.last_mut() {
            Some(buf) => &mut buf.text,
            None => &mut self.root,
        }
    }

    /// The number of active buffers, not counting the root.
    pub fn depth(&self) -> usize {
        self.buffers.len()
    }

    /// Takes everything written at the top level.
    pub fn into_root(self) -> String {
        self.root
    }
}
