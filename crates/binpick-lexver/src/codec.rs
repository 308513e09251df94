//! Lexically sortable version keys.
//!
//! A [`LexVer`] re-encodes an arbitrary version string so that plain string
//! comparison orders releases the way a release manager would:
//!
//! ```text
//! 1.991.1-rc9      => 0001.0991.0001.0000-rc09
//! 1.991.1-rc10     => 0001.0991.0001.0000-rc10
//! 1.991.1          => 0001.0991.0001.0000@
//! 1.991.1+hotfix1  => 0001.0991.0001.0000@hotfix01
//! 1.2beta-3        => 0001.0002.0000.0000-beta-03
//! ```
//!
//! Pre-releases sort below the stable marker; build metadata and hotfixes
//! share it and therefore sort above the plain release. Encoding never fails:
//! inconsistent upstream versions still produce a reproducible key.

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Release channels in ascending maturity. `hotfix` is post-release.
pub const CHANNELS: [&str; 7] = ["alpha", "beta", "dev", "pre", "preview", "rc", "hotfix"];

/// Separates the numeric release from a pre-release tail. Sorts below
/// [`STABLE_MARKER`].
pub const PRE_RELEASE_MARKER: char = '-';

/// Terminates a stable release key.
pub const STABLE_MARKER: char = '@';

/// Introduces build metadata. Shares the stable marker so builds sort after
/// the release they patch.
pub const BUILD_MARKER: char = '@';

/// Number of numeric segments in a full (non-prefix) key.
pub const SEGMENTS: usize = 4;

const SEGMENT_WIDTH: usize = 4;
const ORDINAL_WIDTH: usize = 2;

// 1.2beta1 => 1.2-beta1
static CHANNEL_IN_RELEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(\d)[.\-+]?({})", CHANNELS.join("|"))).expect("channel regex")
});

// rc1 => rc01
static CHANNEL_ORDINAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({})([.\-+]?)(\d+)", CHANNELS.join("|"))).expect("ordinal regex")
});

// 1.2b1 => 1.2-beta1
static BETA_SHORTHAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(\d+)b(\d+)$").expect("beta shorthand regex"));

static STANDALONE_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("digits regex"));

static STRAY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?@").expect("marker regex"));

/// Four numeric segments followed directly by the stable marker.
pub(crate) static STABLE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+@").expect("stable key regex"));

/// A version re-encoded for plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexVer(String);

impl LexVer {
    /// Encode a semver or non-standard version string.
    pub fn parse(version: &str) -> Self {
        LexVer(encode(version, false))
    }

    /// Wrap a string that is already an encoded key.
    pub fn from_key(key: impl Into<String>) -> Self {
        LexVer(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is a full release (possibly with build metadata)
    /// rather than a pre-release.
    pub fn is_stable(&self) -> bool {
        STABLE_KEY_RE.is_match(&self.0)
    }
}

impl fmt::Display for LexVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LexVer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A version family query: a key built without padding, matched by string
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexPrefix(String);

impl LexPrefix {
    /// Encode a version prefix such as `v1.3` (=> `0001.0003`).
    pub fn parse(version: &str) -> Self {
        LexPrefix(encode(version, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `key` belongs to this version family.
    pub fn matches(&self, key: &LexVer) -> bool {
        key.as_str().starts_with(&self.0)
    }
}

impl fmt::Display for LexPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode a full version. Shorthand for [`LexVer::parse`].
pub fn parse_version(version: &str) -> LexVer {
    LexVer::parse(version)
}

/// Encode a version prefix. Shorthand for [`LexPrefix::parse`].
pub fn parse_prefix(version: &str) -> LexPrefix {
    LexPrefix::parse(version)
}

fn encode(version: &str, as_prefix: bool) -> String {
    let version = version.strip_prefix('v').unwrap_or(version);

    // 1.0-beta-3 => 1.0, [beta, 3]
    let mut parts = version.split(PRE_RELEASE_MARKER);
    let mut release = parts.next().unwrap_or_default().to_string();
    let mut tail: Vec<String> = parts.map(str::to_string).collect();

    // 1.0+build.5 => 1.0, [@build.5]
    if let Some(at) = release.find('+') {
        let build = release[at + 1..].replace('+', &BUILD_MARKER.to_string());
        tail.insert(0, format!("{BUILD_MARKER}{build}"));
        release.truncate(at);
    }

    let release = split_bundled_channel(&release);
    let (numeric, bundled) = match release.split_once(PRE_RELEASE_MARKER) {
        Some((numeric, bundled)) => (numeric, bundled),
        None => (release.as_str(), ""),
    };
    if !bundled.is_empty() {
        tail.insert(0, bundled.to_string());
    }

    // 1.0.x86 => [1, 0], [x86]
    let mut levels = numeric.split('.').peekable();
    let mut segments: Vec<String> = Vec::with_capacity(SEGMENTS);
    while let Some(level) = levels.next_if(|level| is_digits(level)) {
        segments.push(pad(level, SEGMENT_WIDTH));
    }
    let rest: Vec<&str> = levels.collect();
    let rest = rest.join(".");
    if !rest.is_empty() {
        tail.insert(0, rest);
    }

    if !as_prefix {
        while segments.len() < SEGMENTS {
            segments.push(pad("0", SEGMENT_WIDTH));
        }
    }

    for part in tail.iter_mut() {
        *part = pad_ordinals(part);
    }

    if tail.is_empty() && !as_prefix {
        tail.push(STABLE_MARKER.to_string());
    }

    let mut key = segments.join(".");
    let rel = tail.join(&PRE_RELEASE_MARKER.to_string());
    if !rel.is_empty() {
        key.push(PRE_RELEASE_MARKER);
        key.push_str(&rel);
    }

    // hotfixes patch a release, they don't precede it
    let key = key.replacen(
        &format!("{PRE_RELEASE_MARKER}hotfix"),
        &format!("{BUILD_MARKER}hotfix"),
        1,
    );
    let key = STRAY_MARKER_RE
        .replace(&key, STABLE_MARKER.to_string().as_str())
        .into_owned();

    tracing::trace!(version, as_prefix, %key, "encoded version");
    key
}

/// Move a channel glued onto the numeric release into the tail position.
fn split_bundled_channel(release: &str) -> String {
    let release = CHANNEL_IN_RELEASE_RE.replace(release, "${1}-${2}");
    BETA_SHORTHAND_RE
        .replace(&release, ".${1}-beta${2}")
        .into_owned()
}

/// Zero-pad channel ordinals and bare numbers so `rc9` sorts before `rc10`.
fn pad_ordinals(part: &str) -> String {
    let part = CHANNEL_ORDINAL_RE.replace(part, |caps: &Captures| {
        format!("{}{}{}", &caps[1], &caps[2], pad(&caps[3], ORDINAL_WIDTH))
    });
    STANDALONE_DIGITS_RE
        .replace_all(&part, |caps: &Captures| pad(&caps[1], ORDINAL_WIDTH))
        .into_owned()
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn pad(digits: &str, width: usize) -> String {
    format!("{digits:0>width$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: &str) -> String {
        parse_version(v).to_string()
    }

    #[test]
    fn pads_release_to_four_segments() {
        assert_eq!(key("1.2"), "0001.0002.0000.0000@");
        assert_eq!(key("v1.991.1"), "0001.0991.0001.0000@");
        assert_eq!(key("10.0.3.1"), "0010.0000.0003.0001@");
    }

    #[test]
    fn pads_channel_ordinals() {
        assert_eq!(key("1.991.1-rc9"), "0001.0991.0001.0000-rc09");
        assert_eq!(key("1.991.1-rc10"), "0001.0991.0001.0000-rc10");
        assert_eq!(key("1.0.0-beta.2"), "0001.0000.0000.0000-beta.02");
    }

    #[test]
    fn hotfix_moves_onto_build_marker() {
        assert_eq!(key("1.991.1+hotfix1"), "0001.0991.0001.0000@hotfix01");
        assert_eq!(key("1.0-hotfix2"), "0001.0000.0000.0000@hotfix02");
    }

    #[test]
    fn build_metadata_uses_build_marker() {
        assert_eq!(key("1.0.0+exp.sha"), "0001.0000.0000.0000@exp.sha");
    }

    #[test]
    fn bundled_channel_is_split() {
        assert_eq!(key("1.2beta-3"), "0001.0002.0000.0000-beta-03");
        assert_eq!(key("1.2beta1"), "0001.0002.0000.0000-beta01");
        assert_eq!(key("1.0.rc1"), "0001.0000.0000.0000-rc01");
    }

    #[test]
    fn b_shorthand_means_beta() {
        assert_eq!(key("1.2b1"), key("1.2beta1"));
        assert_eq!(key("0.9b12"), "0000.0009.0000.0000-beta12");
    }

    #[test]
    fn non_numeric_segment_goes_to_tail() {
        assert_eq!(key("1.0.x"), "0001.0000.0000.0000-x");
    }

    #[test]
    fn prefix_mode_does_not_pad() {
        assert_eq!(parse_prefix("v1.991").as_str(), "0001.0991");
        assert_eq!(parse_prefix("2").as_str(), "0002");
        assert_eq!(parse_prefix("").as_str(), "");
    }

    #[test]
    fn malformed_input_still_encodes() {
        assert_eq!(key(""), "0000.0000.0000.0000@");
        assert_eq!(key("nightly"), "0000.0000.0000.0000-nightly");
        // encoding is a pure function of its input
        assert_eq!(key("--++.."), key("--++.."));
    }

    #[test]
    fn stable_shape() {
        assert!(parse_version("1.0").is_stable());
        assert!(parse_version("1.0+hotfix1").is_stable());
        assert!(!parse_version("1.0-rc1").is_stable());
    }

    #[test]
    fn prefix_matches_family_only() {
        let prefix = parse_prefix("1");
        assert!(prefix.matches(&parse_version("1.9.9")));
        assert!(!prefix.matches(&parse_version("10.0.0")));
    }
}
