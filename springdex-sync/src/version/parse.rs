//! Version string parsing
//!
//! Upstream version strings arrive in many shapes: `3.5.7`,
//! `4.0.0-SNAPSHOT`, `3.5.0-M1`, `2.7.18.RELEASE`, generation patterns
//! like `3.5.x`. Parsing strips the known suffixes and extracts the
//! numeric triple. Malformed input degrades to (0, 0, None) with a
//! warning; a bad version string from upstream must never abort a sync.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_TRIPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex"));

static KNOWN_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\.RELEASE|\.BUILD-SNAPSHOT|-?SNAPSHOT|-?RC\d+|-?M\d+|\.x)$")
        .expect("valid suffix regex")
});

/// Structured version numbers extracted from a raw version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParsedVersion {
    pub major: i64,
    pub minor: i64,
    pub patch: Option<i64>,
}

impl ParsedVersion {
    /// True when this version shares a major.minor generation with `other`
    pub fn same_generation(&self, other: &ParsedVersion) -> bool {
        self.major == other.major && self.minor == other.minor
    }
}

/// Parse a raw version string into its numeric components
///
/// Known suffixes are stripped repeatedly (a string like
/// `2.7.18.RELEASE` or `3.5.0-M1` reduces to its numeric core) before
/// matching `major.minor[.patch]`. Returns (0, 0, None) when nothing
/// numeric can be extracted.
pub fn parse_version(raw: &str) -> ParsedVersion {
    let mut stripped = raw.trim().to_string();
    loop {
        let next = KNOWN_SUFFIX.replace(&stripped, "").into_owned();
        if next == stripped {
            break;
        }
        stripped = next;
    }

    match NUMERIC_TRIPLE.captures(&stripped) {
        Some(caps) => ParsedVersion {
            major: caps[1].parse().unwrap_or(0),
            minor: caps[2].parse().unwrap_or(0),
            patch: caps.get(3).map(|m| m.as_str().parse().unwrap_or(0)),
        },
        None => {
            tracing::warn!(version = %raw, "Unparseable version string, degrading to 0.0");
            ParsedVersion {
                major: 0,
                minor: 0,
                patch: None,
            }
        }
    }
}
