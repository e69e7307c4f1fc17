//! Reusable payload cursor
//!
//! One buffer file becomes one payload by driving the cursor through a full
//! `begin` -> `append`* -> `end` cycle. The three calls are deliberately
//! separate so the shipping loop can re-check its size and time budgets
//! after every line and call [`PayloadCursor::end`] before the file is fully
//! consumed.
//!
//! The cursor is an explicit two-state machine: `append` and `end` are only
//! legal while a file is open, and a second `begin` without an intervening
//! `end` is rejected. Nothing survives a cycle except the payload the caller
//! extracts, so one cursor instance is reused sequentially across many files.

use std::fmt;

use crate::error::ReaderError;

#[cfg(test)]
#[path = "reader_test.rs"]
mod tests;

/// Per-payload behavior plugged into a [`PayloadCursor`]
///
/// Implementations accumulate one payload per file. The cursor guarantees
/// `init` is called before any `push_line`, and that `finish` closes the
/// cycle, so implementations only deal with accumulation.
pub trait PayloadBuilder {
    /// The finished batch type handed to the transport
    type Payload;

    /// The canonical "nothing to send" value
    ///
    /// Pure; callers use it to represent "no file / no content" without
    /// special-casing.
    fn no_payload(&self) -> Self::Payload;

    /// Open a file: parse name context and reset all accumulators
    fn init(&mut self, file_name: &str) -> Result<(), ReaderError>;

    /// Feed one line of the file, in file order
    ///
    /// Implementations may ignore lines (e.g. blank ones) without affecting
    /// the output arity.
    fn push_line(&mut self, line: &str);

    /// Hand out the accumulated payload and reset for the next file
    fn finish(&mut self) -> Self::Payload;
}

/// Cursor position in the per-file lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No file open; only `begin` is legal
    Idle,
    /// A file is open; `append` and `end` are legal
    Active,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorState::Idle => f.write_str("idle"),
            CursorState::Active => f.write_str("active"),
        }
    }
}

/// The reusable state machine driving a [`PayloadBuilder`] over files
#[derive(Debug)]
pub struct PayloadCursor<B> {
    builder: B,
    state: CursorState,
}

impl<B: PayloadBuilder> PayloadCursor<B> {
    /// Wrap a builder in an idle cursor
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            state: CursorState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// The canonical "nothing to send" value; legal in any state
    pub fn no_payload(&self) -> B::Payload {
        self.builder.no_payload()
    }

    /// Open a file for reading
    ///
    /// Fails with [`ReaderError::InvalidState`] if a file is already open,
    /// or with the builder's [`ReaderError::FormatError`] if the file name
    /// does not parse - in which case the cursor stays idle and is safe to
    /// reuse on the next file.
    pub fn begin(&mut self, file_name: &str) -> Result<(), ReaderError> {
        if self.state != CursorState::Idle {
            return Err(ReaderError::InvalidState {
                operation: "begin",
                state: self.state,
            });
        }
        self.builder.init(file_name)?;
        self.state = CursorState::Active;
        Ok(())
    }

    /// Feed the next line of the open file
    pub fn append(&mut self, line: &str) -> Result<(), ReaderError> {
        if self.state != CursorState::Active {
            return Err(ReaderError::InvalidState {
                operation: "append",
                state: self.state,
            });
        }
        self.builder.push_line(line);
        Ok(())
    }

    /// Close the open file and take its payload
    ///
    /// Legal at any point after `begin`; calling it before the file is fully
    /// consumed is how a caller aborts mid-file or enforces batch limits.
    pub fn end(&mut self) -> Result<B::Payload, ReaderError> {
        if self.state != CursorState::Active {
            return Err(ReaderError::InvalidState {
                operation: "end",
                state: self.state,
            });
        }
        self.state = CursorState::Idle;
        Ok(self.builder.finish())
    }
}
