//! Error taxonomy for the durable buffer core
//!
//! Three families, matching how failures recover:
//!
//! - [`ConfigError`] is construction-time and fatal to the component instance.
//! - [`ReaderError`] is per-file; the shipping loop quarantines the offending
//!   file and moves on to the next one.
//! - [`FileSetError`] wraps directory-scan I/O failures.
//!
//! No transient/retryable errors originate here; network and storage retries
//! belong to the transport collaborators.

use std::io;

use thiserror::Error;

use crate::reader::CursorState;
use crate::rolling::RollingInterval;

/// Construction-time configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rolling interval is too coarse for per-event index routing
    #[error(
        "rolling intervals less frequent than {minimum:?} are not supported \
         for per-event index routing (got {interval:?})"
    )]
    IntervalTooCoarse {
        /// The configured interval
        interval: RollingInterval,
        /// The coarsest interval still supported
        minimum: RollingInterval,
    },
}

/// Per-file and cursor-protocol errors
#[derive(Debug, Error)]
pub enum ReaderError {
    /// File name superficially matches the buffer pattern but is unparsable
    ///
    /// "Looks like mine but is corrupt" - distinct from the silent skip the
    /// file set applies to names that belong to a different file set.
    #[error(
        "the file name '{file_name}' does not seem to follow the right file \
         pattern - it must be named [prefix]-{{date}}[_n].json"
    )]
    FormatError {
        /// Name of the offending file (directory stripped)
        file_name: String,
    },

    /// A cursor operation was invoked outside its legal state
    #[error("cursor operation '{operation}' is not valid in the {state} state")]
    InvalidState {
        /// The operation that was attempted
        operation: &'static str,
        /// The state the cursor was in
        state: CursorState,
    },
}

/// Buffer directory scan errors
#[derive(Debug, Error)]
pub enum FileSetError {
    /// Failed to enumerate the buffer directory
    #[error("failed to scan buffer directory '{path}'")]
    Scan {
        /// The directory that was being scanned
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}
