// studiolog - core/retrieve.rs
//
// Windowed retrieval: the shared range-scan / tail-scan machinery behind
// "most recent N", "by line range", and "by date range" queries, and behind
// the search engine.
//
// Range-scan: one forward pass bounded by exclusive line cursors. Every
// entry surviving the filter chain counts as a true match; formatted output
// is appended only while the byte budget lasts, and counting continues to
// the end of the requested range so `remaining` is exact. The caller pages
// forward by re-supplying `last_line` as the next call's `after_line`,
// which stays valid across file growth because the file is append-only.
//
// Tail-scan: drives the Reverse Chunk Reader and stops once `limit` entries
// survive the same filter chain, then reverses to oldest-first.
//
// A missing or unreadable file is an empty result, never an error; a read
// fault mid-scan ends the scan at the last good line and returns partial
// results.

use crate::core::context::ContextIndex;
use crate::core::filter::{default_categories, EntryFilter};
use crate::core::model::{LogEntry, RetrievalResult, RunContext};
use crate::core::parser;
use crate::core::reverse::ReverseLineReader;
use crate::core::time::TimeRange;
use crate::util::constants::DEFAULT_BYTE_BUDGET;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// =============================================================================
// Query parameters
// =============================================================================

/// Parameters of one retrieval call.
#[derive(Debug, Clone)]
pub struct LogQuery {
    /// Skip lines up to and including this physical line number.
    pub after_line: Option<u64>,

    /// Stop before this physical line number.
    pub before_line: Option<u64>,

    /// Categories to include. `None` selects the engine default
    /// (user script output); an explicit empty set disables category
    /// filtering entirely.
    pub categories: Option<HashSet<String>>,

    /// Only entries whose level token equals this, case-insensitively
    /// (e.g. `Warning`). Entries with no level token carry `"Info"`.
    pub level: Option<String>,

    /// Whether the noise denylist excludes internal Studio chatter.
    pub filter_noise: bool,

    /// Inclusive date-range bounds, as timestamp strings. A date-only end
    /// bound covers the whole day.
    pub start_time: Option<String>,
    pub end_time: Option<String>,

    /// Only entries emitted in this execution mode.
    pub context: Option<RunContext>,

    /// Prefix each output line with its run-context tag, e.g. `[play]`.
    pub context_tags: bool,

    /// Prefix each output line with a seconds-truncated timestamp.
    pub timestamps: bool,

    /// Cap on the encoded size of the returned `logs` text.
    pub byte_budget: usize,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            after_line: None,
            before_line: None,
            categories: None,
            level: None,
            filter_noise: true,
            start_time: None,
            end_time: None,
            context: None,
            context_tags: false,
            timestamps: false,
            byte_budget: DEFAULT_BYTE_BUDGET,
        }
    }
}

impl LogQuery {
    /// Build the filter chain for this query (search patterns are added by
    /// the search engine on top).
    pub(crate) fn build_filter(&self) -> EntryFilter {
        EntryFilter {
            categories: self
                .categories
                .clone()
                .unwrap_or_else(default_categories),
            level: self.level.clone(),
            exclude_noise: self.filter_noise,
            rules: None,
            time_range: TimeRange::parse(self.start_time.as_deref(), self.end_time.as_deref()),
            context: self.context,
            pattern: None,
        }
    }

    /// Whether a run-context index is needed before scanning.
    pub(crate) fn needs_context_index(&self) -> bool {
        self.context.is_some() || self.context_tags
    }
}

// =============================================================================
// Output formatting
// =============================================================================

/// Format one surviving entry for output: optional run-context tag,
/// optional seconds-truncated timestamp, then the message.
pub(crate) fn format_entry(entry: &LogEntry, query: &LogQuery) -> String {
    let mut out = String::new();
    if query.context_tags {
        let context = entry.run_context.unwrap_or_default();
        out.push('[');
        out.push_str(context.label());
        out.push_str("] ");
    }
    if query.timestamps {
        // "2026-02-03T08:52:02.095Z" -> "08:52:02"
        if let Some(time) = entry.timestamp.get(11..19) {
            out.push('[');
            out.push_str(time);
            out.push_str("] ");
        }
    }
    out.push_str(&entry.message);
    out
}

// =============================================================================
// Range scan
// =============================================================================

/// Raw outcome of one range scan, before being shaped into a caller-facing
/// result.
pub(crate) struct ScanOutcome {
    pub logs: String,
    pub start_line: u64,
    pub last_line: u64,
    pub true_matches: u64,
    pub emitted: u64,
}

impl ScanOutcome {
    fn empty() -> Self {
        Self {
            logs: String::new(),
            start_line: 0,
            last_line: 0,
            true_matches: 0,
            emitted: 0,
        }
    }
}

/// Forward pass over the file applying `filter`, formatting survivors with
/// `format` while the byte budget lasts.
pub(crate) fn scan_window<F>(
    path: &Path,
    query: &LogQuery,
    filter: &EntryFilter,
    format: F,
) -> ScanOutcome
where
    F: Fn(&LogEntry) -> String,
{
    // One index build per call, before the loop, never per line.
    let index = if query.needs_context_index() {
        Some(ContextIndex::build(path))
    } else {
        None
    };

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Scan over missing file");
            return ScanOutcome::empty();
        }
    };

    let mut outcome = ScanOutcome::empty();
    let mut lines: Vec<String> = Vec::new();
    let mut current_bytes: usize = 0;
    let mut budget_exceeded = false;

    let mut reader = BufReader::new(file);
    let mut buf: Vec<u8> = Vec::new();
    let mut line_num: u64 = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, line = line_num, "Read fault; returning partial scan");
                break;
            }
        }
        line_num += 1;

        if query.after_line.is_some_and(|a| line_num <= a) {
            continue;
        }
        if query.before_line.is_some_and(|b| line_num >= b) {
            break;
        }

        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim();
        if line.is_empty() {
            continue;
        }
        let Some(mut entry) = parser::parse_line(line, line_num) else {
            continue;
        };
        if !filter.matches(&mut entry, index.as_ref()) {
            continue;
        }

        outcome.true_matches += 1;
        if budget_exceeded {
            continue;
        }

        let formatted = format(&entry);
        let line_bytes = formatted.len() + 1; // joining '\n'
        if current_bytes + line_bytes > query.byte_budget && !lines.is_empty() {
            // Budget reached: stop emitting but keep counting true matches
            // through the rest of the range.
            budget_exceeded = true;
            continue;
        }

        if lines.is_empty() {
            outcome.start_line = line_num;
        }
        outcome.last_line = line_num;
        current_bytes += line_bytes;
        lines.push(formatted);
    }

    outcome.emitted = lines.len() as u64;
    outcome.logs = lines.join("\n");
    tracing::debug!(
        path = %path.display(),
        scanned = line_num,
        matches = outcome.true_matches,
        emitted = outcome.emitted,
        "Range scan complete"
    );
    outcome
}

/// Retrieve a filtered, byte-budgeted window of log output.
pub fn get_log_window(path: &Path, query: &LogQuery) -> RetrievalResult {
    let filter = query.build_filter();
    let outcome = scan_window(path, query, &filter, |entry| format_entry(entry, query));
    RetrievalResult {
        logs: outcome.logs,
        start_line: outcome.start_line,
        last_line: outcome.last_line,
        remaining: outcome.true_matches - outcome.emitted,
        has_more: outcome.true_matches > outcome.emitted,
    }
}

// =============================================================================
// Tail scan
// =============================================================================

/// Collect the most recent `limit` entries surviving `filter`, oldest-first.
///
/// Physical line numbers are not knowable when walking backward, so tail
/// entries carry `line_num == 0` and run-context is resolved by timestamp
/// against the interval index instead.
pub(crate) fn tail_entries(
    path: &Path,
    limit: usize,
    filter: &EntryFilter,
    needs_context: bool,
) -> Vec<LogEntry> {
    let index = if needs_context {
        Some(ContextIndex::build(path))
    } else {
        None
    };

    let reader = match ReverseLineReader::open(path) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Tail scan over missing file");
            return Vec::new();
        }
    };

    let mut entries: Vec<LogEntry> = Vec::new();
    for line in reader {
        let Some(mut entry) = parser::parse_line(&line, 0) else {
            continue;
        };
        if let Some(ref index) = index {
            entry.run_context = Some(index.context_at_time(&entry.timestamp));
        }
        if !filter.matches(&mut entry, None) {
            continue;
        }
        entries.push(entry);
        if entries.len() >= limit {
            break;
        }
    }

    // Collected newest-first; callers read oldest-first.
    entries.reverse();
    tracing::debug!(
        path = %path.display(),
        entries = entries.len(),
        limit,
        "Tail scan complete"
    );
    entries
}

/// The most recent `limit` entries matching `query`, oldest-first.
pub fn get_recent_entries(path: &Path, limit: usize, query: &LogQuery) -> Vec<LogEntry> {
    let filter = query.build_filter();
    tail_entries(path, limit, &filter, query.needs_context_index())
}
