// studiolog - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// Every type here is ephemeral: entries, ranges, and reports are rebuilt
// from the source file on each call and never cached, because the file is
// appended to by an external process between calls.

use serde::Serialize;

// =============================================================================
// Log Entry (normalised output of parsing)
// =============================================================================

/// A single parsed log line.
///
/// `line_num` is 1-based and only meaningful within the scan pass that
/// produced it; the file may grow between calls, but earlier line numbers
/// remain stable because the file is append-only.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp string as it appeared in the line, millisecond
    /// precision with a trailing `Z` (e.g. `2026-02-03T08:52:02.095Z`).
    pub timestamp: String,

    /// Level token from the optional fourth comma field. `"Info"` if absent.
    pub level: String,

    /// Bracket-delimited category tag (e.g. `FLog::Output`).
    pub category: String,

    /// Message text, trimmed. May contain any characters.
    pub message: String,

    /// The original line, unmodified.
    pub raw: String,

    /// 1-based physical line number within the scan pass.
    pub line_num: u64,

    /// Execution mode active when the line was emitted. Assigned lazily:
    /// only populated when a caller requested context filtering or tagging.
    pub run_context: Option<RunContext>,
}

// =============================================================================
// Run context
// =============================================================================

/// Coarse classification of which Studio execution mode was active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunContext {
    /// A play session (server or client data model).
    Play,
    /// The edit-mode data model.
    Edit,
    /// No covering interval, or an unrecognised mode name.
    #[default]
    Unknown,
}

impl RunContext {
    /// Classify a raw mode name captured from a transition marker line.
    ///
    /// Mode names containing `server` or `client` (e.g. `PlayServer`,
    /// `PlayClient`) indicate a play session; names containing `edit`
    /// indicate edit mode; anything else is unknown.
    pub fn classify(mode: &str) -> Self {
        let lower = mode.to_lowercase();
        if lower.contains("server") || lower.contains("client") {
            RunContext::Play
        } else if lower.contains("edit") {
            RunContext::Edit
        } else {
            RunContext::Unknown
        }
    }

    /// Lowercase label for display and output tagging.
    pub fn label(&self) -> &'static str {
        match self {
            RunContext::Play => "play",
            RunContext::Edit => "edit",
            RunContext::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Game state range (run-context interval)
// =============================================================================

/// One execution-mode interval of the context index.
///
/// Ranges are contiguous, ordered by `start_line`, and partition the file
/// starting at line 1. The last range is open-ended (`end_line == -1`).
#[derive(Debug, Clone, Serialize)]
pub struct GameStateRange {
    /// Raw mode label as captured from the marker line (or `edit` for the
    /// implicit first interval).
    pub label: String,

    /// First line covered by this interval (1-based, inclusive).
    pub start_line: u64,

    /// Last line covered (inclusive), or -1 when open to end of file.
    pub end_line: i64,

    /// Timestamp of the marker that opened this interval. None for the
    /// implicit first interval.
    pub start_time: Option<String>,

    /// Timestamp of the marker that closed this interval. None while open.
    pub end_time: Option<String>,
}

impl GameStateRange {
    /// Whether `line` falls inside this interval.
    pub fn covers(&self, line: u64) -> bool {
        line >= self.start_line && (self.end_line < 0 || line <= self.end_line as u64)
    }

    /// Coarse classification of this interval's mode label.
    pub fn context(&self) -> RunContext {
        RunContext::classify(&self.label)
    }
}

// =============================================================================
// Retrieval result
// =============================================================================

/// Outcome of one windowed retrieval call.
///
/// Invariant: `remaining` + number of emitted lines == number of entries
/// that survived the filter chain over the whole requested range.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    /// Formatted matching lines joined with `\n`. Empty when nothing matched.
    pub logs: String,

    /// Physical line number of the first emitted line (0 if none).
    pub start_line: u64,

    /// Physical line number of the last emitted line (0 if none).
    /// Callers re-supply this as the next call's `after_line` to page
    /// forward across file growth.
    pub last_line: u64,

    /// True matches counted but not emitted (byte budget exhausted).
    pub remaining: u64,

    /// Whether another page exists (`remaining > 0`).
    pub has_more: bool,
}

/// Outcome of one windowed search call: retrieval shape plus the number of
/// matches actually emitted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub logs: String,
    pub start_line: u64,
    pub last_line: u64,
    /// Matches emitted in `logs`.
    pub match_count: u64,
    /// Matches counted past the byte budget.
    pub remaining: u64,
    pub has_more: bool,
}

// =============================================================================
// Error report
// =============================================================================

/// One error-classified entry, as recorded by the error aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub line: u64,
    pub timestamp: String,
    pub message: String,
    pub category: String,
    pub level: String,
    /// Execution mode active at this line.
    pub context: RunContext,
}

/// Aggregated error scan outcome.
///
/// `error_count` is the unbounded total; `errors` is capped at the
/// aggregator's detail limit.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub has_error: bool,
    pub error_count: u64,
    pub errors: Vec<ErrorDetail>,
}

impl ErrorReport {
    pub fn empty() -> Self {
        Self {
            has_error: false,
            error_count: 0,
            errors: Vec::new(),
        }
    }
}
