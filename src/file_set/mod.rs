//! Buffer file discovery and replay ordering
//!
//! Enumerates the on-disk buffer files for one prefix and rolling interval,
//! parses each name into a `(timestamp, sequence, encoding)` key, and returns
//! the matching paths in ascending order. That order is the sole source of
//! chronological replay order for the whole shipping pipeline, so the sort
//! key must be total: on a timestamp tie, lower sequence numbers come first,
//! and a legacy-named file comes before a canonical-named file encoding the
//! same instant.
//!
//! A candidate whose name does not match the requested interval is skipped
//! silently - it most likely belongs to a different interval's file set
//! sharing the same prefix, and is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::FileSetError;
use crate::rolling::{self, RollingInterval};

#[cfg(test)]
#[path = "file_set_test.rs"]
mod tests;

/// Which naming era a buffer file's date token was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TokenEncoding {
    /// Superseded hyphenated hourly spelling (`20220418-16`); sorts first
    /// on a timestamp tie because those files were written earlier
    Legacy,
    /// Current compact spelling
    Canonical,
}

/// A buffer file name parsed into its sortable parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferFileName {
    /// Full path of the file on disk
    pub path: PathBuf,
    /// Timestamp encoded in the name; `None` for `Infinite` rolling
    pub timestamp: Option<NaiveDateTime>,
    /// Sequence number when several files share one timestamp
    pub sequence: Option<u32>,
    /// Which naming era produced the date token
    pub encoding: TokenEncoding,
}

impl BufferFileName {
    /// Parse a path as a buffer file for the given prefix and interval
    ///
    /// Returns `None` when the name belongs to a different file set - wrong
    /// prefix, wrong extension, or a date token that does not match the
    /// requested interval. Never errors; "not mine" is not a failure.
    pub fn parse(path: &Path, prefix: &str, interval: RollingInterval) -> Option<BufferFileName> {
        let name = path.file_name()?.to_str()?;
        if !has_json_extension(name) {
            return None;
        }
        let rest = name.strip_prefix(prefix)?;
        if rest.len() < 5 {
            // prefix overlapped into the extension
            return None;
        }

        if interval == RollingInterval::Infinite {
            // No date token: `prefix.json` or `prefix_n.json`. Older writers
            // emitted `prefix-.json`, so tolerate a bare hyphen too.
            let stem = &rest[..rest.len() - 5];
            let stem = stem.strip_prefix('-').unwrap_or(stem);
            let sequence = match stem {
                "" => None,
                s => Some(parse_sequence(s.strip_prefix('_')?)?),
            };
            return Some(BufferFileName {
                path: path.to_path_buf(),
                timestamp: None,
                sequence,
                encoding: TokenEncoding::Canonical,
            });
        }

        let rest = rest.strip_prefix('-')?;

        // Legacy hourly names carry an internal hyphen in the date itself,
        // so they must be recognized before the canonical split.
        if interval == RollingInterval::Hour {
            if let Some((timestamp, sequence)) = rolling::parse_legacy_hourly_file_token(rest) {
                return Some(BufferFileName {
                    path: path.to_path_buf(),
                    timestamp: Some(timestamp),
                    sequence,
                    encoding: TokenEncoding::Legacy,
                });
            }
        }

        let stem = &rest[..rest.len() - 5];
        let (token, sequence) = match stem.split_once('_') {
            Some((token, seq)) => (token, Some(parse_sequence(seq)?)),
            None => (stem, None),
        };
        let timestamp = interval.parse_token(token)?;

        Some(BufferFileName {
            path: path.to_path_buf(),
            timestamp: Some(timestamp),
            sequence,
            encoding: TokenEncoding::Canonical,
        })
    }

    /// Total sort key: timestamp, then sequence, then naming era
    pub fn sort_key(&self) -> (Option<NaiveDateTime>, u32, TokenEncoding) {
        (self.timestamp, self.sequence.unwrap_or(0), self.encoding)
    }
}

/// The set of buffer files for one prefix and rolling interval
///
/// Constructed from the same directory-plus-prefix base path the writer side
/// uses (the writer appends `-<dateToken>[_<sequence>].json`).
#[derive(Debug, Clone)]
pub struct FileSet {
    directory: PathBuf,
    prefix: String,
    interval: RollingInterval,
}

impl FileSet {
    /// Create a file set for `file_name_base` (directory plus file prefix)
    pub fn new(file_name_base: impl Into<PathBuf>, interval: RollingInterval) -> Self {
        let base = file_name_base.into();
        let prefix = base
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = match base.parent() {
            Some(dir) if dir != Path::new("") => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self {
            directory,
            prefix,
            interval,
        }
    }

    /// The rolling interval this set matches against
    pub fn interval(&self) -> RollingInterval {
        self.interval
    }

    /// List the eligible buffer files in replay order
    ///
    /// A missing buffer directory is an empty set, not an error - the writer
    /// may not have created it yet.
    pub fn get_buffer_files(&self) -> Result<Vec<PathBuf>, FileSetError> {
        let mut matched = self.parse_buffer_files()?;
        matched.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(matched.into_iter().map(|f| f.path).collect())
    }

    /// Like [`get_buffer_files`](Self::get_buffer_files), but with the parsed
    /// name parts, unsorted
    fn parse_buffer_files(&self) -> Result<Vec<BufferFileName>, FileSetError> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.scan_error(e)),
        };

        let mut matched = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| self.scan_error(e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            match BufferFileName::parse(&path, &self.prefix, self.interval) {
                Some(parsed) => matched.push(parsed),
                None => {
                    let name = entry.file_name();
                    if name.to_string_lossy().starts_with(self.prefix.as_str()) {
                        tracing::debug!(
                            file = %name.to_string_lossy(),
                            interval = ?self.interval,
                            "skipping buffer candidate that does not match the interval"
                        );
                    }
                }
            }
        }

        Ok(matched)
    }

    fn scan_error(&self, source: std::io::Error) -> FileSetError {
        FileSetError::Scan {
            path: self.directory.display().to_string(),
            source,
        }
    }
}

/// Case-insensitive `.json` extension check
pub(crate) fn has_json_extension(name: &str) -> bool {
    name.len() >= 5
        && name
            .get(name.len() - 5..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".json"))
}

/// Parse a sequence segment: plain or zero-padded non-negative integer
fn parse_sequence(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
