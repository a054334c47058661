// studiolog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
//
// Almost nothing in this crate is allowed to fail loudly: a missing log
// file yields an empty result, malformed lines are dropped, decode glitches
// are substituted, and a mid-scan I/O fault ends the scan at the last good
// line. The variants below cover the cases that ARE surfaced: a search
// pattern that fails to compile, and an unparseable noise rule table.

use std::fmt;
use std::path::PathBuf;

/// Top-level error type for studiolog operations.
#[derive(Debug)]
pub enum EngineError {
    /// User-supplied search pattern failed to compile.  The scan is not
    /// attempted; this is the only error a caller-facing operation returns.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// Noise rule table could not be parsed.
    RuleTable {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid regex pattern '{pattern}': {source}")
            }
            Self::RuleTable { path, source } => {
                write!(
                    f,
                    "Failed to parse noise rules '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::RuleTable { source, .. } => Some(source),
        }
    }
}

/// Convenience type alias for studiolog results.
pub type Result<T> = std::result::Result<T, EngineError>;
