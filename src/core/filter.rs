// studiolog - core/filter.rs
//
// The filter chain shared by windowed retrieval, search, and the error
// aggregator. All active filters are AND-combined and evaluated in
// increasing cost order: category membership, level equality, noise
// denylist, date range, run context, then the user search pattern.
//
// Both the range-scan and tail-scan paths go through `matches`, so a search
// pattern always targets the parsed message in either direction, never the
// raw line.

use crate::core::context::ContextIndex;
use crate::core::model::{LogEntry, RunContext};
use crate::core::noise::NoiseRuleSet;
use crate::core::time::TimeRange;
use crate::util::constants::DEFAULT_CATEGORIES;
use crate::util::error::{EngineError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Filter state applied to every parsed entry. Empty/absent members filter
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Categories to include. Empty = no category filtering.
    pub categories: HashSet<String>,

    /// Only entries whose level token equals this, case-insensitively.
    pub level: Option<String>,

    /// Whether the noise denylist excludes internal Studio chatter.
    pub exclude_noise: bool,

    /// Override rule table; the built-in table is used when None.
    pub rules: Option<NoiseRuleSet>,

    /// Inclusive date-range bounds.
    pub time_range: TimeRange,

    /// Only entries emitted in this execution mode.
    pub context: Option<RunContext>,

    /// Case-insensitive search pattern, matched against the message.
    pub pattern: Option<Regex>,
}

impl EntryFilter {
    /// Compile and install a user-supplied search pattern.
    ///
    /// The only error this crate surfaces to callers: an invalid pattern is
    /// rejected here, before any scanning starts.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<()> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| EngineError::InvalidPattern {
                pattern: pattern.to_string(),
                source: e,
            })?;
        self.pattern = Some(regex);
        Ok(())
    }

    /// Apply the chain to one entry. When `index` is supplied the entry's
    /// `run_context` is assigned from it as a side effect, so survivors
    /// carry their context for tagging and reporting.
    pub fn matches(&self, entry: &mut LogEntry, index: Option<&ContextIndex>) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&entry.category) {
            return false;
        }

        if let Some(ref level) = self.level {
            if !entry.level.eq_ignore_ascii_case(level) {
                return false;
            }
        }

        if self.exclude_noise {
            let rules = self.rules.as_ref().unwrap_or_else(|| NoiseRuleSet::builtin());
            if rules.is_noise(&entry.message) {
                return false;
            }
        }

        if !self.time_range.contains(&entry.timestamp) {
            return false;
        }

        if let Some(index) = index {
            entry.run_context = Some(index.context_at(entry.line_num));
        }
        if let Some(wanted) = self.context {
            if entry.run_context != Some(wanted) {
                return false;
            }
        }

        if let Some(ref pattern) = self.pattern {
            if !pattern.is_match(&entry.message) {
                return false;
            }
        }

        true
    }
}

/// The default category set: user script output.
pub fn default_categories() -> HashSet<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_line;

    fn entry(category: &str, message: &str) -> LogEntry {
        parse_line(
            &format!("2026-02-03T08:00:01.000Z,1.0,abc,2 [{category}] {message}"),
            2,
        )
        .expect("valid test line")
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EntryFilter::default();
        assert!(filter.matches(&mut entry("FLog::Anything", "text"), None));
        assert!(filter.matches(&mut entry("Other", "Studio Version: 1"), None));
    }

    #[test]
    fn test_category_membership() {
        let filter = EntryFilter {
            categories: default_categories(),
            ..Default::default()
        };
        assert!(filter.matches(&mut entry("FLog::Output", "Hello from script"), None));
        assert!(!filter.matches(&mut entry("FLog::Warning", "Hello from script"), None));
    }

    #[test]
    fn test_noise_exclusion() {
        let filter = EntryFilter {
            exclude_noise: true,
            ..Default::default()
        };
        assert!(!filter.matches(&mut entry("FLog::Output", "Studio Version: 1.2.3"), None));
        assert!(!filter.matches(&mut entry("FLog::Output", ""), None));
    }

    /// Level comparison is case-insensitive equality on the level token.
    #[test]
    fn test_level_filter_case_insensitive_equality() {
        let filter = EntryFilter {
            level: Some("warning".to_string()),
            ..Default::default()
        };
        let warn = "2026-02-03T08:00:02.000Z,2.0,abc,3,Warning [FLog::Warning] something odd";
        assert!(filter.matches(&mut parse_line(warn, 3).expect("valid test line"), None));
        // Default-level entries are "Info" and do not match.
        assert!(!filter.matches(&mut entry("FLog::Output", "Hello from script"), None));
    }

    #[test]
    fn test_time_range_filter() {
        let filter = EntryFilter {
            time_range: TimeRange::parse(Some("2026-02-04"), None),
            ..Default::default()
        };
        assert!(!filter.matches(&mut entry("FLog::Output", "too early"), None));
    }

    #[test]
    fn test_pattern_is_case_insensitive_and_targets_message() {
        let mut filter = EntryFilter::default();
        filter.set_pattern("^hello").expect("valid pattern");
        assert!(filter.matches(&mut entry("FLog::Output", "Hello from script"), None));
        // The raw line starts with the timestamp, not "Hello"; a raw-line
        // match target would reject this entry.
        assert!(!filter.matches(&mut entry("FLog::Output", "say Hello"), None));
    }

    #[test]
    fn test_invalid_pattern_is_rejected_up_front() {
        let mut filter = EntryFilter::default();
        let result = filter.set_pattern("(unclosed");
        assert!(matches!(
            result,
            Err(EngineError::InvalidPattern { .. })
        ));
        assert!(filter.pattern.is_none());
    }

    #[test]
    fn test_custom_rule_table_override() {
        let rules = NoiseRuleSet::from_toml_str(
            "prefixes = [\"Hello\"]\ncontains = []\n",
            std::path::Path::new("custom.toml"),
        )
        .expect("valid table");
        let filter = EntryFilter {
            exclude_noise: true,
            rules: Some(rules),
            ..Default::default()
        };
        assert!(!filter.matches(&mut entry("FLog::Output", "Hello from script"), None));
        assert!(filter.matches(&mut entry("FLog::Output", "Studio Version: 1"), None));
    }
}
