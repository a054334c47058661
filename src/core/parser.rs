// studiolog - core/parser.rs
//
// Converts one raw line of a Studio session log into a structured entry.
//
// Line grammar:
//   <ISO8601 timestamp>,<elapsed float>,<hex id>,<seq int>[,<level>] [<category>] <message>
//
// e.g.
//   2026-02-03T08:52:02.095Z,128.095795,1996c,12 [DFLog::HttpTraceError] message
//   2026-02-03T08:52:04.244Z,130.244095,12f4,6,Info [FLog::Output] message
//
// The elapsed-time float, hex id, and sequence int are ignored. The level
// token is optional and defaults to "Info". Non-conforming lines yield None
// and are silently dropped everywhere: Studio interleaves foreign output and
// partial writes into its own log, and those must never abort a scan.

use crate::core::model::LogEntry;
use regex::Regex;
use std::sync::OnceLock;

/// Compiled line grammar. Pattern correctness is pinned by the unit tests
/// below, so the startup expect can only fire on a build-breaking edit.
fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{4}-\d{2}-\d{2}T[\d:.]+Z),[\d.]+,[0-9a-f]+,\d+(?:,(\w+))?\s*\[([^\]]+)\]\s*(.*)$",
        )
        .expect("line grammar regex is invalid")
    })
}

/// Parse a single trimmed log line.
///
/// Returns `None` for any line that does not conform to the grammar.
pub fn parse_line(line: &str, line_num: u64) -> Option<LogEntry> {
    let caps = line_pattern().captures(line)?;
    Some(LogEntry {
        timestamp: caps[1].to_string(),
        level: caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Info".to_string()),
        category: caps[3].to_string(),
        message: caps[4].trim().to_string(),
        raw: line.to_string(),
        line_num,
        run_context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_with_level() {
        let line = "2026-02-03T08:52:04.244Z,130.244095,12f4,6,Info [FLog::Output] Hello world";
        let entry = parse_line(line, 7).expect("should parse");
        assert_eq!(entry.timestamp, "2026-02-03T08:52:04.244Z");
        assert_eq!(entry.level, "Info");
        assert_eq!(entry.category, "FLog::Output");
        assert_eq!(entry.message, "Hello world");
        assert_eq!(entry.line_num, 7);
        assert!(entry.run_context.is_none());
    }

    #[test]
    fn test_parse_line_without_level_defaults_to_info() {
        let line = "2026-02-03T08:52:02.095Z,128.095795,1996c,12 [DFLog::HttpTraceError] timed out";
        let entry = parse_line(line, 1).expect("should parse");
        assert_eq!(entry.level, "Info");
        assert_eq!(entry.category, "DFLog::HttpTraceError");
        assert_eq!(entry.message, "timed out");
    }

    #[test]
    fn test_parse_line_warning_level() {
        let line = "2026-02-03T08:00:02.000Z,2.0,abc,3,Warning [FLog::Warning] something odd";
        let entry = parse_line(line, 3).expect("should parse");
        assert_eq!(entry.level, "Warning");
        assert_eq!(entry.category, "FLog::Warning");
        assert_eq!(entry.message, "something odd");
    }

    /// Property: for any conforming line, the raw field is the line itself.
    #[test]
    fn test_raw_preserves_original_line() {
        let line = "2026-02-03T08:00:01.000Z,1.0,abc,2 [FLog::Output] Hello from script";
        let entry = parse_line(line, 2).expect("should parse");
        assert_eq!(entry.raw, line);
    }

    #[test]
    fn test_message_may_contain_brackets_and_commas() {
        let line = "2026-02-03T08:00:01.000Z,1.0,abc,2 [FLog::Output] a [b], c: {d}";
        let entry = parse_line(line, 1).expect("should parse");
        assert_eq!(entry.message, "a [b], c: {d}");
    }

    #[test]
    fn test_empty_message() {
        let line = "2026-02-03T08:00:01.000Z,1.0,abc,2 [FLog::Output] ";
        let entry = parse_line(line, 1).expect("should parse");
        assert_eq!(entry.message, "");
    }

    #[test]
    fn test_foreign_lines_are_dropped() {
        assert!(parse_line("not a log line", 1).is_none());
        assert!(parse_line("", 1).is_none());
        assert!(parse_line("2026-02-03 08:00:01 missing fields", 1).is_none());
        // Truncated tail of a concurrent append
        assert!(parse_line("2026-02-03T08:00:01.000Z,1.0,ab", 1).is_none());
    }

    #[test]
    fn test_hex_id_with_letters() {
        let line = "2026-02-03T08:52:02.095Z,128.1,deadbeef,3 [FLog::Output] ok";
        assert!(parse_line(line, 1).is_some());
    }
}
