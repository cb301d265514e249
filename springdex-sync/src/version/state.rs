//! Release-state classification
//!
//! Indicator precedence when a version string matches several markers:
//! SNAPSHOT, then RC, then "M followed by a digit". An upstream status
//! token only decides when the string itself carries no indicator.
//! The fallback is always GA, favoring visibility over hiding data.

use serde::{Deserialize, Serialize};

/// Release state of a version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionState {
    Ga,
    Rc,
    Milestone,
    Snapshot,
}

impl VersionState {
    /// Classify from the version string, with an optional upstream status
    /// token breaking ties when the string is ambiguous
    pub fn classify(version: &str, status_token: Option<&str>) -> Self {
        if version.contains("SNAPSHOT") {
            return VersionState::Snapshot;
        }
        if version.contains("RC") {
            return VersionState::Rc;
        }
        if has_milestone_marker(version) {
            return VersionState::Milestone;
        }

        match status_token {
            Some("SNAPSHOT") => VersionState::Snapshot,
            Some("PRERELEASE") => VersionState::Rc,
            // GENERAL_AVAILABILITY, unknown tokens, and no token at all
            _ => VersionState::Ga,
        }
    }

    /// Database / API representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionState::Ga => "GA",
            VersionState::Rc => "RC",
            VersionState::Milestone => "MILESTONE",
            VersionState::Snapshot => "SNAPSHOT",
        }
    }

    /// Parse the database representation, defaulting to GA
    pub fn from_db(value: &str) -> Self {
        match value {
            "SNAPSHOT" => VersionState::Snapshot,
            "RC" => VersionState::Rc,
            "MILESTONE" => VersionState::Milestone,
            _ => VersionState::Ga,
        }
    }
}

/// "M" immediately followed by a digit, e.g. `3.5.0-M1`
fn has_milestone_marker(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.windows(2).any(|w| w[0] == b'M' && w[1].is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_string() {
        assert_eq!(
            VersionState::classify("4.0.0-SNAPSHOT", None),
            VersionState::Snapshot
        );
        assert_eq!(
            VersionState::classify("1.5.22.BUILD-SNAPSHOT", None),
            VersionState::Snapshot
        );
    }

    #[test]
    fn test_rc_from_string() {
        assert_eq!(VersionState::classify("3.4.0-RC2", None), VersionState::Rc);
    }

    #[test]
    fn test_milestone_from_string() {
        assert_eq!(
            VersionState::classify("3.5.0-M1", None),
            VersionState::Milestone
        );
    }

    #[test]
    fn test_plain_version_is_ga() {
        assert_eq!(VersionState::classify("3.5.7", None), VersionState::Ga);
    }

    #[test]
    fn test_precedence_snapshot_over_rc() {
        // A string carrying both markers classifies by the first rule
        assert_eq!(
            VersionState::classify("3.0.0-RC1-SNAPSHOT", None),
            VersionState::Snapshot
        );
    }

    #[test]
    fn test_precedence_rc_over_milestone() {
        assert_eq!(
            VersionState::classify("3.0.0-M1-RC2", None),
            VersionState::Rc
        );
    }

    #[test]
    fn test_status_token_used_when_string_ambiguous() {
        assert_eq!(
            VersionState::classify("3.5.0", Some("PRERELEASE")),
            VersionState::Rc
        );
        assert_eq!(
            VersionState::classify("3.5.0", Some("SNAPSHOT")),
            VersionState::Snapshot
        );
        assert_eq!(
            VersionState::classify("3.5.0", Some("GENERAL_AVAILABILITY")),
            VersionState::Ga
        );
    }

    #[test]
    fn test_string_indicator_beats_status_token() {
        assert_eq!(
            VersionState::classify("3.5.0-RC1", Some("GENERAL_AVAILABILITY")),
            VersionState::Rc
        );
    }

    #[test]
    fn test_unknown_token_defaults_ga() {
        assert_eq!(
            VersionState::classify("3.5.0", Some("SOMETHING_NEW")),
            VersionState::Ga
        );
    }

    #[test]
    fn test_milestone_needs_digit() {
        // "M" not followed by a digit is no milestone marker
        assert_eq!(VersionState::classify("3.5.0.MARK", None), VersionState::Ga);
    }

    #[test]
    fn test_db_round_trip() {
        for state in [
            VersionState::Ga,
            VersionState::Rc,
            VersionState::Milestone,
            VersionState::Snapshot,
        ] {
            assert_eq!(VersionState::from_db(state.as_str()), state);
        }
        assert_eq!(VersionState::from_db("garbage"), VersionState::Ga);
    }
}
