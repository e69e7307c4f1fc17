//! Durable Buffer - On-disk buffering core for log shipping
//!
//! Guarantees that events are never lost between process crashes and
//! successful delivery: the writer side appends events to rolling on-disk
//! buffer files, and this crate discovers those files, replays them in
//! chronological order, and converts their lines into bulk-index payloads
//! for the remote backend.
//!
//! # Architecture
//!
//! ```text
//! [Shipping Loop] --> [FileSet] ----ordered paths----> per file:
//!                     [PayloadCursor::begin/append/end] --> [Vec<String>]
//!                                |                              |
//!                      [BulkPayloadBuilder]              [Bulk Transport]
//! ```
//!
//! The shipping loop asks [`FileSet`] for the ordered list of buffer files,
//! then drives the [`PayloadCursor`] line by line over each file. The cursor
//! is split into `begin`/`append`/`end` so the caller can re-check size or
//! time limits after every line and cut a batch early.
//!
//! # File naming
//!
//! Buffer files are named `<prefix>-<dateToken>[_<sequence>].json`, where the
//! date token is encoded per [`RollingInterval`]. The hourly token has a
//! superseded legacy spelling (`20220418-16` instead of `2022041816`) that is
//! still recognized for backward compatibility; on a timestamp tie the
//! legacy-named file sorts first so replay order stays total.
//!
//! # Example
//!
//! ```ignore
//! use durable_buffer::{
//!     BulkOpType, BulkPayloadBuilder, BulkPayloadConfig, FileSet,
//!     PayloadCursor, RollingInterval,
//! };
//!
//! let file_set = FileSet::new("/var/log/app/buffer", RollingInterval::Hour);
//! let config = BulkPayloadConfig::new(BulkOpType::Index, RollingInterval::Hour);
//! let builder = BulkPayloadBuilder::new(config, |_line: &str, date| {
//!     format!("logs-{}", date.format("%Y.%m.%d"))
//! })?;
//! let mut cursor = PayloadCursor::new(builder);
//!
//! for path in file_set.get_buffer_files()? {
//!     cursor.begin(&path.to_string_lossy())?;
//!     for line in read_lines(&path) {
//!         cursor.append(&line)?;
//!     }
//!     let payload = cursor.end()?;
//!     transport.send(payload);
//! }
//! ```

// =============================================================================
// Subsystems
// =============================================================================

/// Rolling interval policy - date token formats and the legacy hourly encoding
pub mod rolling;

/// Buffer file discovery, name parsing, and replay ordering
pub mod file_set;

/// Reusable payload cursor - the Idle/Active state machine
pub mod reader;

/// Bulk payload construction - NDJSON command/document pairs
pub mod bulk;

/// Error taxonomy shared across subsystems
pub mod error;

// =============================================================================
// Public re-exports
// =============================================================================

pub use bulk::{
    BulkCommand, BulkCommandBody, BulkOpType, BulkPayloadBuilder, BulkPayloadConfig,
    CommandSerializer, IndexNamer, JsonCommandSerializer,
};
pub use error::{ConfigError, FileSetError, ReaderError};
pub use file_set::{BufferFileName, FileSet, TokenEncoding};
pub use reader::{CursorState, PayloadBuilder, PayloadCursor};
pub use rolling::RollingInterval;

// Tests live next to their modules via #[cfg(test)] #[path = "..."] mod tests;
// See: rolling/rolling_test.rs, file_set/file_set_test.rs, etc.
