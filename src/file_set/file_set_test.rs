use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use super::*;

const ALL_INTERVALS: [RollingInterval; 6] = [
    RollingInterval::Infinite,
    RollingInterval::Year,
    RollingInterval::Month,
    RollingInterval::Day,
    RollingInterval::Hour,
    RollingInterval::Minute,
];

fn at(y: i32, mo: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "{}\n").unwrap();
    path
}

/// Buffer file name for `interval` at 2000-01-01T00:00
fn interval_file_name(interval: RollingInterval) -> String {
    if interval == RollingInterval::Infinite {
        return "buffer.json".to_string();
    }
    let token = at(2000, 1, 1, 0).format(interval.format());
    format!("buffer-{token}.json")
}

// =============================================================================
// Interval selectivity
// =============================================================================

#[test]
fn test_only_files_of_requested_interval_are_returned() {
    let dir = TempDir::new().unwrap();
    for interval in ALL_INTERVALS {
        touch(dir.path(), &interval_file_name(interval));
    }

    for interval in ALL_INTERVALS {
        let file_set = FileSet::new(dir.path().join("buffer"), interval);
        let files = file_set.get_buffer_files().unwrap();
        assert_eq!(
            files,
            vec![dir.path().join(interval_file_name(interval))],
            "{interval:?}"
        );
    }
}

#[test]
fn test_other_prefixes_and_extensions_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mine = touch(dir.path(), "buffer-20000101.json");
    touch(dir.path(), "other-20000101.json");
    touch(dir.path(), "buffer-20000101.txt");
    touch(dir.path(), "buffer-notadate.json");
    touch(dir.path(), "buffer-20000101.json.bak");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Day);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![mine]);
}

#[test]
fn test_extension_match_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let upper = touch(dir.path(), "buffer-20000101.JSON");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Day);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![upper]);
}

#[test]
fn test_missing_directory_is_an_empty_set() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("does-not-exist").join("buffer");

    let file_set = FileSet::new(base, RollingInterval::Day);
    assert!(file_set.get_buffer_files().unwrap().is_empty());
}

// =============================================================================
// Legacy hourly coexistence
// =============================================================================

#[test]
fn test_old_hourly_format_is_supported() {
    let dir = TempDir::new().unwrap();
    let legacy = touch(dir.path(), "buffer-20220418-16.json");
    let legacy_seq = touch(dir.path(), "buffer-20220418-16_001.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Hour);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![legacy, legacy_seq]);
}

#[test]
fn test_both_hourly_formats_supported_and_old_sorted_first() {
    let dir = TempDir::new().unwrap();
    // same instant in both naming eras
    let canonical = touch(dir.path(), "buffer-2022041816.json");
    let legacy = touch(dir.path(), "buffer-20220418-16.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Hour);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![legacy, canonical]);
}

#[test]
fn test_legacy_hourly_files_not_matched_for_day_interval() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "buffer-20220418-16.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Day);
    assert!(file_set.get_buffer_files().unwrap().is_empty());
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_files_ordered_by_timestamp_then_sequence() {
    let dir = TempDir::new().unwrap();
    let later = touch(dir.path(), "buffer-20000102.json");
    let second = touch(dir.path(), "buffer-20000101_2.json");
    let first = touch(dir.path(), "buffer-20000101_1.json");
    let plain = touch(dir.path(), "buffer-20000101.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Day);
    assert_eq!(
        file_set.get_buffer_files().unwrap(),
        vec![plain, first, second, later]
    );
}

#[test]
fn test_zero_padded_sequences_order_numerically() {
    let dir = TempDir::new().unwrap();
    let ten = touch(dir.path(), "buffer-20000101_010.json");
    let two = touch(dir.path(), "buffer-20000101_002.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Day);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![two, ten]);
}

// =============================================================================
// Infinite rolling
// =============================================================================

#[test]
fn test_infinite_matches_undated_files() {
    let dir = TempDir::new().unwrap();
    let plain = touch(dir.path(), "buffer.json");
    let seq = touch(dir.path(), "buffer_1.json");
    touch(dir.path(), "buffer-20000101.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Infinite);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![plain, seq]);
}

#[test]
fn test_infinite_tolerates_hyphenated_legacy_name() {
    // older writers emitted `prefix-.json` for the infinite interval
    let dir = TempDir::new().unwrap();
    let hyphenated = touch(dir.path(), "buffer-.json");

    let file_set = FileSet::new(dir.path().join("buffer"), RollingInterval::Infinite);
    assert_eq!(file_set.get_buffer_files().unwrap(), vec![hyphenated]);
}

// =============================================================================
// BufferFileName parsing
// =============================================================================

#[test]
fn test_parse_canonical_name_fields() {
    let path = Path::new("/spool/buffer-2022041816_003.json");
    let parsed = BufferFileName::parse(path, "buffer", RollingInterval::Hour).unwrap();

    assert_eq!(parsed.path, path.to_path_buf());
    assert_eq!(parsed.timestamp, Some(at(2022, 4, 18, 16)));
    assert_eq!(parsed.sequence, Some(3));
    assert_eq!(parsed.encoding, TokenEncoding::Canonical);
}

#[test]
fn test_parse_legacy_name_fields() {
    let path = Path::new("/spool/buffer-20220418-16.json");
    let parsed = BufferFileName::parse(path, "buffer", RollingInterval::Hour).unwrap();

    assert_eq!(parsed.timestamp, Some(at(2022, 4, 18, 16)));
    assert_eq!(parsed.sequence, None);
    assert_eq!(parsed.encoding, TokenEncoding::Legacy);
}

#[test]
fn test_parse_rejects_foreign_names() {
    let cases = [
        "other-20220418.json",
        "buffer-20220418.log",
        "buffer-20220418-16-7.json",
        "buffer-20220418_x.json",
        "buffer_.json",
    ];
    for name in cases {
        let path = PathBuf::from(name);
        assert!(
            BufferFileName::parse(&path, "buffer", RollingInterval::Day).is_none(),
            "{name}"
        );
    }
}

#[test]
fn test_prefix_containing_hyphens() {
    let path = Path::new("buffer-serilog-20220418-16.json");
    let parsed = BufferFileName::parse(path, "buffer-serilog", RollingInterval::Hour).unwrap();
    assert_eq!(parsed.timestamp, Some(at(2022, 4, 18, 16)));
    assert_eq!(parsed.encoding, TokenEncoding::Legacy);
}

#[test]
fn test_sort_key_orders_legacy_before_canonical_on_tie() {
    let legacy =
        BufferFileName::parse(Path::new("b-20220418-16.json"), "b", RollingInterval::Hour).unwrap();
    let canonical =
        BufferFileName::parse(Path::new("b-2022041816.json"), "b", RollingInterval::Hour).unwrap();

    assert_eq!(legacy.timestamp, canonical.timestamp);
    assert!(legacy.sort_key() < canonical.sort_key());
}
