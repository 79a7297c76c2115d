//! Tunables for producer resolution and notice deduplication.
//!
//! Defaults reproduce the library's historical behavior. The binary maps its
//! command-line flags onto these structs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Window inside which an identical notice is suppressed.
pub const DEFAULT_NOTICE_WINDOW: Duration = Duration::from_millis(1500);

/// Which matcher turns a filename into producer ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Candidate tokens from `(...)` groups, exact then partial matching.
    #[default]
    Parenthetical,
    /// Whole-filename scan, longest term first, no overlapping claims.
    Scan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolveOptions {
    pub mode: MatchMode,
    /// Containment matching after the exact pass (parenthetical mode only).
    pub partial_matching: bool,
    /// Candidates shorter than this (in chars) skip partial matching.
    /// 0 disables the guard.
    pub min_partial_len: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            mode: MatchMode::Parenthetical,
            partial_matching: true,
            min_partial_len: 0,
        }
    }
}

impl ResolveOptions {
    /// Whether `candidate` is eligible for the partial pass.
    pub fn allows_partial(&self, candidate: &str) -> bool {
        self.partial_matching && candidate.chars().count() >= self.min_partial_len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoticeConfig {
    #[serde(with = "millis")]
    pub window: Duration,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_NOTICE_WINDOW,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_partial_matching_unguarded() {
        let opts = ResolveOptions::default();
        assert_eq!(opts.mode, MatchMode::Parenthetical);
        assert!(opts.allows_partial("b"));
    }

    #[test]
    fn test_min_partial_len_counts_chars() {
        let opts = ResolveOptions {
            min_partial_len: 3,
            ..Default::default()
        };
        assert!(!opts.allows_partial("dj"));
        assert!(opts.allows_partial("ñño"));
    }

    #[test]
    fn test_options_deserialize_with_partial_fields() {
        let opts: ResolveOptions = serde_json::from_str(r#"{"mode": "scan"}"#).unwrap();
        assert_eq!(opts.mode, MatchMode::Scan);
        assert!(opts.partial_matching);

        let notice: NoticeConfig = serde_json::from_str(r#"{"window": 250}"#).unwrap();
        assert_eq!(notice.window, Duration::from_millis(250));
    }
}
