// studiolog - util/constants.rs
//
// Single source of truth for named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "studiolog";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Reverse reader
// =============================================================================

/// Chunk size in bytes for backward file reads.
pub const DEFAULT_REVERSE_CHUNK_SIZE: usize = 8 * 1024; // 8 KiB

// =============================================================================
// Retrieval limits
// =============================================================================

/// Maximum encoded size of the `logs` text in a single retrieval response.
/// Matches remain counted past this point; they are just not emitted.
pub const DEFAULT_BYTE_BUDGET: usize = 32_000;

/// Default number of entries returned by a tail-scan ("most recent N") call.
pub const DEFAULT_RECENT_LIMIT: usize = 100;

/// Log categories consulted when the caller does not supply a set.
/// User script output (print/warn) lands in FLog::Output.
pub const DEFAULT_CATEGORIES: &[&str] = &["FLog::Output"];

// =============================================================================
// Run-context indexing
// =============================================================================

/// Substring present on every execution-mode transition line.  Used as a
/// cheap reject before the capture regex runs.
pub const CONTEXT_MARKER: &str = "GameStateType";

/// Capture pattern applied to marker lines to extract the mode name
/// (e.g. `Edit`, `PlayClient`, `PlayServer`).
pub const CONTEXT_MODE_PATTERN: &str = r"GameStateType:\s*(\w+)";

/// Label of the implicit interval covering the file before the first marker.
pub const INITIAL_CONTEXT_LABEL: &str = "edit";

// =============================================================================
// Error aggregation
// =============================================================================

/// Categories whose entries are error-classified regardless of level.
pub const ERROR_CATEGORIES: &[&str] =
    &["FLog::Error", "FLog::ScriptContext", "DFLog::HttpTraceError"];

/// Default cap on detail records in an error report.  The total count
/// keeps accumulating past the cap.
pub const DEFAULT_MAX_ERROR_DETAILS: usize = 100;

// =============================================================================
// Logging
// =============================================================================

/// Default log level for the tracing subscriber.
pub const DEFAULT_LOG_LEVEL: &str = "info";
