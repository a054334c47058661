// studiolog - core/context.rs
//
// Run-Context Indexer: one forward scan over the file building an ordered,
// gapless, non-overlapping partition of line numbers into execution-mode
// intervals (edit / play-server / play-client ...).
//
// Transition markers are sparse (a session log has a handful among
// hundreds of thousands of lines), so lines are cheap-rejected with a
// substring test before any parsing happens. The index is rebuilt from
// scratch by every call that needs it; the file grows concurrently and a
// cached index would go stale at its open tail.

use crate::core::model::{GameStateRange, RunContext};
use crate::core::parser;
use crate::util::constants::{CONTEXT_MARKER, CONTEXT_MODE_PATTERN, INITIAL_CONTEXT_LABEL};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

fn mode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(CONTEXT_MODE_PATTERN).expect("mode capture regex is invalid"))
}

/// The interval partition for one scan pass over a file.
#[derive(Debug, Clone)]
pub struct ContextIndex {
    ranges: Vec<GameStateRange>,
}

impl ContextIndex {
    /// Build the index with a single forward scan.
    ///
    /// A missing or unreadable file yields the trivial index: one open
    /// "edit" interval from line 1. A read fault mid-scan ends the scan at
    /// the last good line; the partition stays well-formed because the
    /// current interval is simply left open.
    pub fn build(path: &Path) -> Self {
        let mut open = GameStateRange {
            label: INITIAL_CONTEXT_LABEL.to_string(),
            start_line: 1,
            end_line: -1,
            start_time: None,
            end_time: None,
        };
        let mut ranges: Vec<GameStateRange> = Vec::new();

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Context index over missing file");
                return Self { ranges: vec![open] };
            }
        };

        let mut reader = BufReader::new(file);
        let mut buf: Vec<u8> = Vec::new();
        let mut line_num: u64 = 0;
        let mut transitions: usize = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, line = line_num, "Read fault during context scan");
                    break;
                }
            }
            line_num += 1;

            let line = String::from_utf8_lossy(&buf);
            // Cheap reject: transition lines are rare.
            if !line.contains(CONTEXT_MARKER) {
                continue;
            }
            let Some(entry) = parser::parse_line(line.trim(), line_num) else {
                continue;
            };
            let Some(caps) = mode_pattern().captures(&entry.message) else {
                continue;
            };
            let mode = caps[1].to_string();
            transitions += 1;

            // Close the open interval at the line before the marker. A
            // marker on the interval's own first line leaves nothing to
            // close; the empty interval is dropped to keep the partition
            // gapless.
            if line_num > open.start_line {
                open.end_line = (line_num - 1) as i64;
                open.end_time = Some(entry.timestamp.clone());
                ranges.push(open);
            }
            open = GameStateRange {
                label: mode,
                start_line: line_num,
                end_line: -1,
                start_time: Some(entry.timestamp),
                end_time: None,
            };
        }

        ranges.push(open);
        tracing::debug!(
            path = %path.display(),
            lines = line_num,
            transitions,
            ranges = ranges.len(),
            "Context index built"
        );
        Self { ranges }
    }

    /// The ordered interval partition.
    pub fn ranges(&self) -> &[GameStateRange] {
        &self.ranges
    }

    /// Classify the execution mode active at `line`.
    ///
    /// Linear scan; transitions are rare, so the range list is short.
    pub fn context_at(&self, line: u64) -> RunContext {
        self.ranges
            .iter()
            .find(|r| r.covers(line))
            .map(|r| r.context())
            .unwrap_or(RunContext::Unknown)
    }

    /// Classify by timestamp instead of line number.
    ///
    /// Used by the tail-scan path, where physical line numbers are not
    /// knowable while walking backward. Intervals are half-open in time:
    /// a marker's own timestamp belongs to the interval it opens. When two
    /// markers share a timestamp the intervening interval is zero-width in
    /// time; entries at that instant resolve to the latest interval opened
    /// then.
    pub fn context_at_time(&self, timestamp: &str) -> RunContext {
        let Some(ts) = crate::core::time::parse_timestamp(timestamp) else {
            return RunContext::Unknown;
        };
        self.ranges
            .iter()
            .find(|r| {
                let after_start = match r.start_time.as_deref().and_then(crate::core::time::parse_timestamp) {
                    Some(start) => ts >= start,
                    None => true,
                };
                let before_end = match r.end_time.as_deref().and_then(crate::core::time::parse_timestamp) {
                    Some(end) => ts < end,
                    None => true,
                };
                after_start && before_end
            })
            .map(|r| r.context())
            .unwrap_or(RunContext::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_line(seq: u64, secs: u64, category: &str, message: &str) -> String {
        format!("2026-02-03T08:00:{secs:02}.000Z,{secs}.0,1a2b,{seq} [{category}] {message}")
    }

    fn marker_line(seq: u64, secs: u64, mode: &str) -> String {
        log_line(seq, secs, "FLog::GameState", &format!("GameStateType: {mode}"))
    }

    fn build_from(lines: &[String]) -> (ContextIndex, u64) {
        let mut f = NamedTempFile::new().expect("temp file");
        for line in lines {
            writeln!(f, "{line}").expect("write");
        }
        (ContextIndex::build(f.path()), lines.len() as u64)
    }

    /// Ranges must partition [1, lineCount] with zero gaps and overlaps.
    fn assert_partition(index: &ContextIndex, line_count: u64) {
        let ranges = index.ranges();
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].start_line, 1, "partition starts at line 1");
        for pair in ranges.windows(2) {
            assert_eq!(
                pair[0].end_line as u64 + 1,
                pair[1].start_line,
                "gapless, non-overlapping"
            );
        }
        let last = ranges.last().unwrap();
        assert_eq!(last.end_line, -1, "last range is open-ended");
        for line in 1..=line_count.max(1) {
            let covering = ranges.iter().filter(|r| r.covers(line)).count();
            assert_eq!(covering, 1, "line {line} covered exactly once");
        }
    }

    #[test]
    fn test_no_markers_yields_single_edit_range() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "hello"),
            log_line(2, 1, "FLog::Output", "world"),
        ];
        let (index, count) = build_from(&lines);
        assert_partition(&index, count);
        assert_eq!(index.ranges().len(), 1);
        assert_eq!(index.ranges()[0].label, "edit");
        assert_eq!(index.context_at(1), RunContext::Edit);
        assert_eq!(index.context_at(999), RunContext::Edit);
    }

    #[test]
    fn test_play_session_partition() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "editing"),     // line 1: edit
            marker_line(2, 1, "PlayServer"),               // line 2: play opens
            log_line(3, 2, "FLog::Output", "server tick"), // line 3
            marker_line(4, 3, "Edit"),                     // line 4: back to edit
            log_line(5, 4, "FLog::Output", "edited"),      // line 5
        ];
        let (index, count) = build_from(&lines);
        assert_partition(&index, count);

        let ranges = index.ranges();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].label, "edit");
        assert_eq!(ranges[0].end_line, 1);
        assert_eq!(ranges[1].label, "PlayServer");
        assert_eq!(ranges[1].start_line, 2);
        assert_eq!(ranges[1].end_line, 3);
        assert_eq!(ranges[2].label, "Edit");
        assert_eq!(ranges[2].start_line, 4);
        assert_eq!(ranges[2].end_line, -1);

        assert_eq!(index.context_at(1), RunContext::Edit);
        assert_eq!(index.context_at(2), RunContext::Play);
        assert_eq!(index.context_at(3), RunContext::Play);
        assert_eq!(index.context_at(4), RunContext::Edit);
    }

    /// A marker on line 1 must not leave an empty implicit interval behind.
    #[test]
    fn test_marker_on_first_line() {
        let lines = vec![
            marker_line(1, 0, "PlayClient"),
            log_line(2, 1, "FLog::Output", "client tick"),
        ];
        let (index, count) = build_from(&lines);
        assert_partition(&index, count);
        assert_eq!(index.ranges().len(), 1);
        assert_eq!(index.ranges()[0].label, "PlayClient");
        assert_eq!(index.context_at(1), RunContext::Play);
    }

    #[test]
    fn test_interval_timestamps_from_markers() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "a"),
            marker_line(2, 5, "PlayServer"),
            marker_line(3, 9, "Edit"),
        ];
        let (index, _) = build_from(&lines);
        let ranges = index.ranges();
        assert_eq!(ranges[0].end_time.as_deref(), Some("2026-02-03T08:00:05.000Z"));
        assert_eq!(
            ranges[1].start_time.as_deref(),
            Some("2026-02-03T08:00:05.000Z")
        );
        assert_eq!(ranges[1].end_time.as_deref(), Some("2026-02-03T08:00:09.000Z"));
        assert!(ranges[2].end_time.is_none());
    }

    #[test]
    fn test_marker_substring_without_capture_is_skipped() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "mentions GameStateType only"),
            log_line(2, 1, "FLog::Output", "plain"),
        ];
        let (index, count) = build_from(&lines);
        assert_partition(&index, count);
        assert_eq!(index.ranges().len(), 1);
    }

    #[test]
    fn test_missing_file_yields_trivial_index() {
        let index = ContextIndex::build(Path::new("/nonexistent/studio.log"));
        assert_eq!(index.ranges().len(), 1);
        assert_eq!(index.ranges()[0].label, "edit");
        assert_eq!(index.ranges()[0].end_line, -1);
    }

    #[test]
    fn test_context_at_time() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "a"),
            marker_line(2, 5, "PlayServer"),
            log_line(3, 6, "FLog::Output", "b"),
            marker_line(4, 9, "Edit"),
        ];
        let (index, _) = build_from(&lines);
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:00.000Z"),
            RunContext::Edit
        );
        // A marker's own timestamp belongs to the interval it opens.
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:05.000Z"),
            RunContext::Play
        );
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:06.000Z"),
            RunContext::Play
        );
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:09.000Z"),
            RunContext::Edit
        );
        assert_eq!(index.context_at_time("garbage"), RunContext::Unknown);
    }

    /// Two markers in the same millisecond: the intervening interval is
    /// zero-width in time, so timestamp lookups at that instant resolve to
    /// the latest interval opened then. Line lookups are unaffected.
    #[test]
    fn test_context_at_time_with_same_timestamp_markers() {
        let lines = vec![
            log_line(1, 0, "FLog::Output", "a"),
            marker_line(2, 5, "PlayServer"),
            marker_line(3, 5, "Edit"),
            log_line(4, 6, "FLog::Output", "b"),
        ];
        let (index, count) = build_from(&lines);
        assert_partition(&index, count);
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:05.000Z"),
            RunContext::Edit
        );
        assert_eq!(
            index.context_at_time("2026-02-03T08:00:06.000Z"),
            RunContext::Edit
        );
        assert_eq!(index.context_at(2), RunContext::Play);
        assert_eq!(index.context_at(3), RunContext::Edit);
    }

    #[test]
    fn test_unrecognised_mode_is_unknown() {
        let lines = vec![
            marker_line(1, 0, "MainMenu"),
            log_line(2, 1, "FLog::Output", "x"),
        ];
        let (index, _) = build_from(&lines);
        assert_eq!(index.context_at(2), RunContext::Unknown);
    }
}
