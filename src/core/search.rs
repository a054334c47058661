// studiolog - core/search.rs
//
// Search engine: windowed retrieval parameterised by a user pattern.
//
// The pattern is compiled case-insensitively before any scanning happens:
// an invalid pattern is the one error this crate surfaces, and it never
// reaches the file. Matching targets the parsed message text on both the
// range-scan and tail-scan paths; the raw line (timestamp, ids, category)
// is never the match target.

use crate::core::model::{LogEntry, SearchResult};
use crate::core::retrieve::{self, LogQuery};
use crate::util::error::Result;
use std::path::Path;

/// Search a line/date window of the log, returning a byte-budgeted page of
/// matches. Output lines are prefixed with their physical line number
/// (`123|...`) so hits can be fed back into line-range retrieval.
pub fn search_log_window(path: &Path, pattern: &str, query: &LogQuery) -> Result<SearchResult> {
    let mut filter = query.build_filter();
    filter.set_pattern(pattern)?;

    let outcome = retrieve::scan_window(path, query, &filter, |entry| {
        format!("{}|{}", entry.line_num, retrieve::format_entry(entry, query))
    });

    tracing::debug!(
        path = %path.display(),
        pattern,
        matches = outcome.true_matches,
        "Search complete"
    );
    Ok(SearchResult {
        logs: outcome.logs,
        start_line: outcome.start_line,
        last_line: outcome.last_line,
        match_count: outcome.emitted,
        remaining: outcome.true_matches - outcome.emitted,
        has_more: outcome.true_matches > outcome.emitted,
    })
}

/// The most recent `limit` entries whose message matches `pattern`,
/// oldest-first.
pub fn search_recent(
    path: &Path,
    pattern: &str,
    limit: usize,
    query: &LogQuery,
) -> Result<Vec<LogEntry>> {
    let mut filter = query.build_filter();
    filter.set_pattern(pattern)?;
    Ok(retrieve::tail_entries(
        path,
        limit,
        &filter,
        query.needs_context_index(),
    ))
}
