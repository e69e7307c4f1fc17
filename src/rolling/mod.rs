//! Rolling interval policy
//!
//! Maps a retention granularity to the date token used in buffer file names.
//! The hourly token changed historically from a hyphenated spelling
//! (`20220418-16`) to a compact one (`2022041816`); this module is the single
//! place that knows both encodings, so new legacy formats can be added here
//! without touching file discovery or payload construction.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

#[cfg(test)]
#[path = "rolling_test.rs"]
mod tests;

/// How often the writer starts a new buffer file
///
/// Ordered coarsest to finest; `Infinite` means a single unbounded file with
/// no date token at all. The derived order is what makes "coarser than Day"
/// well defined for per-event index routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RollingInterval {
    /// Never roll; one file per prefix
    Infinite,
    /// Roll yearly (`2022`)
    Year,
    /// Roll monthly (`202204`)
    Month,
    /// Roll daily (`20220418`)
    Day,
    /// Roll hourly (`2022041816`)
    Hour,
    /// Roll every minute (`202204181659`)
    Minute,
}

/// Superseded hourly date format, kept for backward compatibility
pub const LEGACY_HOURLY_FORMAT: &str = "%Y%m%d-%H";

impl RollingInterval {
    /// Canonical chrono format string for this interval's date token
    pub fn format(&self) -> &'static str {
        match self {
            RollingInterval::Infinite => "",
            RollingInterval::Year => "%Y",
            RollingInterval::Month => "%Y%m",
            RollingInterval::Day => "%Y%m%d",
            RollingInterval::Hour => "%Y%m%d%H",
            RollingInterval::Minute => "%Y%m%d%H%M",
        }
    }

    /// Digit count of the canonical date token
    pub fn token_len(&self) -> usize {
        match self {
            RollingInterval::Infinite => 0,
            RollingInterval::Year => 4,
            RollingInterval::Month => 6,
            RollingInterval::Day => 8,
            RollingInterval::Hour => 10,
            RollingInterval::Minute => 12,
        }
    }

    /// Parse a canonical date token for this interval
    ///
    /// Strict: the token must be exactly [`token_len`](Self::token_len) ASCII
    /// digits and encode valid calendar values. Returns `None` for `Infinite`,
    /// which has no date token.
    pub fn parse_token(&self, token: &str) -> Option<NaiveDateTime> {
        let len = self.token_len();
        if len == 0 || token.len() != len || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let year: i32 = token[0..4].parse().ok()?;
        let month: u32 = if len >= 6 { token[4..6].parse().ok()? } else { 1 };
        let day: u32 = if len >= 8 { token[6..8].parse().ok()? } else { 1 };
        let hour: u32 = if len >= 10 { token[8..10].parse().ok()? } else { 0 };
        let minute: u32 = if len >= 12 { token[10..12].parse().ok()? } else { 0 };

        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)
    }
}

/// Recognizer for the legacy hourly date token (`20220418-16`)
pub fn legacy_hourly_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // literal pattern, cannot fail to compile
        Regex::new(r"^\d{8}-\d{2}$").expect("legacy hourly pattern compiles")
    })
}

/// Parse a legacy hourly date token (`20220418-16` -> 2022-04-18T16:00)
///
/// Must yield the same instant as [`RollingInterval::parse_token`] on the
/// canonical spelling of the same hour; index routing downstream depends only
/// on the date, not on which naming era produced the file.
pub fn parse_legacy_hourly_token(token: &str) -> Option<NaiveDateTime> {
    if !legacy_hourly_pattern().is_match(token) {
        return None;
    }

    let year: i32 = token[0..4].parse().ok()?;
    let month: u32 = token[4..6].parse().ok()?;
    let day: u32 = token[6..8].parse().ok()?;
    let hour: u32 = token[9..11].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, 0, 0)
}

/// Parse the trailing file token of a legacy-hourly buffer file
///
/// Matches `<legacyDate>[_<sequence>].json` (extension case-insensitive),
/// e.g. `20220418-16_001.json`, and returns the timestamp plus the optional
/// sequence number.
pub fn parse_legacy_hourly_file_token(token: &str) -> Option<(NaiveDateTime, Option<u32>)> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<date>\d{8}-\d{2})(?:_(?P<sequence>\d+))?(?i:\.json)$")
            .expect("legacy hourly file pattern compiles")
    });

    let captures = pattern.captures(token)?;
    let timestamp = parse_legacy_hourly_token(&captures["date"])?;
    let sequence = match captures.name("sequence") {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };

    Some((timestamp, sequence))
}
