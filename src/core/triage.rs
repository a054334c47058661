// studiolog - core/triage.rs
//
// Error aggregation: a single forward pass that answers "did the workload
// go wrong, how often, and where".
//
// An entry is error-classified when its category belongs to a small fixed
// error-category set, or its level is warning/error (case-insensitive).
// The noise denylist still applies: Studio emits plenty of internal
// warnings (StyleRule failures, asset load retries) that have nothing to
// do with the automated workload and would otherwise swamp the report.

use crate::core::context::ContextIndex;
use crate::core::filter::EntryFilter;
use crate::core::model::{ErrorDetail, ErrorReport, RunContext};
use crate::core::parser;
use crate::util::constants::{DEFAULT_MAX_ERROR_DETAILS, ERROR_CATEGORIES};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parameters of one error scan.
#[derive(Debug, Clone)]
pub struct ErrorScan {
    /// Skip lines up to and including this physical line number.
    pub after_line: Option<u64>,

    /// Stop before this physical line number.
    pub before_line: Option<u64>,

    /// Only errors emitted in this execution mode.
    pub context: Option<RunContext>,

    /// Cap on detail records. The total count is unbounded.
    pub max_details: usize,
}

impl Default for ErrorScan {
    fn default() -> Self {
        Self {
            after_line: None,
            before_line: None,
            context: None,
            max_details: DEFAULT_MAX_ERROR_DETAILS,
        }
    }
}

/// Whether an entry's category or level classifies it as an error.
fn is_error_classified(category: &str, level: &str) -> bool {
    ERROR_CATEGORIES.contains(&category)
        || level.eq_ignore_ascii_case("warning")
        || level.eq_ignore_ascii_case("error")
}

/// Scan the requested range and aggregate error-classified entries.
///
/// Missing/unreadable file → empty report; a read fault mid-scan returns
/// what was collected up to the last good line.
pub fn collect_errors(path: &Path, scan: &ErrorScan) -> ErrorReport {
    // Noise and context screening reuse the shared chain; category
    // membership is not used here because errors are collected from all
    // categories.
    let screen = EntryFilter {
        exclude_noise: true,
        context: scan.context,
        ..Default::default()
    };
    let index = ContextIndex::build(path);

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Error scan over missing file");
            return ErrorReport::empty();
        }
    };

    let mut report = ErrorReport::empty();
    let mut reader = BufReader::new(file);
    let mut buf: Vec<u8> = Vec::new();
    let mut line_num: u64 = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, line = line_num, "Read fault; returning partial report");
                break;
            }
        }
        line_num += 1;

        if scan.after_line.is_some_and(|a| line_num <= a) {
            continue;
        }
        if scan.before_line.is_some_and(|b| line_num >= b) {
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
        if !is_error_classified(&entry.category, &entry.level) {
            continue;
        }
        if !screen.matches(&mut entry, Some(&index)) {
            continue;
        }

        report.error_count += 1;
        if report.errors.len() < scan.max_details {
            report.errors.push(ErrorDetail {
                line: entry.line_num,
                timestamp: entry.timestamp,
                message: entry.message,
                category: entry.category,
                level: entry.level,
                context: entry.run_context.unwrap_or_default(),
            });
        }
    }

    report.has_error = report.error_count > 0;
    tracing::debug!(
        path = %path.display(),
        scanned = line_num,
        errors = report.error_count,
        "Error scan complete"
    );
    report
}
