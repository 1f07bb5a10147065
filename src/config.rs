use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::EngineError;

/// Toggle names the search consults. Anything else in `feature_set.txt` is
/// read but silently ignored.
pub const SKIP_GUESS_MOVE: &str = "skip_guess_move";
pub const SKIP_NULL_MOVE_PRUNING: &str = "skip_null_move_pruning";
pub const SKIP_ID_SORT: &str = "skip_id_sort";

/// A once-read, read-many set of enabled feature toggles, mirroring the
/// lazily-initialized toggle set this engine's search consults on every node.
#[derive(Debug, Default, Clone)]
pub struct FeatureToggles {
    enabled: HashSet<String>,
}

impl FeatureToggles {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Parses `name=true|false` lines. A missing file yields an all-false
    /// toggle set. A line without `=` is wrapped in `EngineError::FeatureToggle`,
    /// logged, and skipped; parsing continues with the remaining lines.
    /// Unknown names are kept in the set (so `is_enabled` on a typo'd name is
    /// simply false) without error.
    fn parse(contents: &str) -> Self {
        let mut enabled = HashSet::new();
        for raw_line in contents.lines() {
            let line = raw_line.trim().to_lowercase();
            if line.is_empty() {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                let err = EngineError::FeatureToggle(raw_line.to_string());
                tracing::warn!(%err, "skipping malformed feature toggle line");
                continue;
            };
            let name = name.trim();
            let value = value.trim();
            if value == "true" {
                enabled.insert(name.to_string());
            }
        }
        Self { enabled }
    }

    fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(_) => Self::default(),
        }
    }
}

static TOGGLES: OnceLock<FeatureToggles> = OnceLock::new();

/// Reads `./feature_set.txt` once and caches the result for the life of the process.
pub fn feature_toggles() -> &'static FeatureToggles {
    TOGGLES.get_or_init(|| FeatureToggles::load_from(Path::new("feature_set.txt")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_toggle_name_is_harmless() {
        let toggles = FeatureToggles::parse("totally_unknown=true\n");
        assert!(!toggles.is_enabled(SKIP_NULL_MOVE_PRUNING));
    }

    #[test]
    fn malformed_line_does_not_abort_the_rest() {
        let toggles = FeatureToggles::parse("not_a_toggle_line\nskip_id_sort=true\n");
        assert!(toggles.is_enabled(SKIP_ID_SORT));
    }

    #[test]
    fn false_value_is_not_enabled() {
        let toggles = FeatureToggles::parse("skip_guess_move=false\n");
        assert!(!toggles.is_enabled(SKIP_GUESS_MOVE));
    }

    #[test]
    fn case_and_whitespace_are_normalized() {
        let toggles = FeatureToggles::parse("  Skip_Null_Move_Pruning = TRUE  \n");
        assert!(toggles.is_enabled(SKIP_NULL_MOVE_PRUNING));
    }

    #[test]
    fn missing_file_yields_all_false() {
        let toggles = FeatureToggles::load_from(Path::new("/nonexistent/feature_set.txt"));
        assert!(!toggles.is_enabled(SKIP_GUESS_MOVE));
        assert!(!toggles.is_enabled(SKIP_NULL_MOVE_PRUNING));
        assert!(!toggles.is_enabled(SKIP_ID_SORT));
    }
}
