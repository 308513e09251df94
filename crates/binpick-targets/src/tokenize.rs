//! Turning asset patterns and user agents into terms.
//!
//! Asset patterns (`{NAME}-{VER}-Linux-x86_64.tar`) go through a fixed list
//! of named normalization rules, then split on `.`:
//!
//! - lowercase everything (except the `{NAME}` sentinel)
//! - `_ / . -` separate terms
//! - `_` is put back inside terms that need it (`x86_64`, `darwin_10_15`)
//! - `{VER}` and all but one `{NAME}` are dropped

use std::sync::LazyLock;

use regex::Regex;

use crate::pattern::to_pattern;
use crate::record::{Build, Project};

const NAME: &str = "{NAME}";
const VER: &str = "{VER}";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("normalization regex")
}

static PIN_OS_MINOR_RE: LazyLock<Regex> = LazyLock::new(|| regex(r"(macos|darwin|osx)-?(1\d)\.(\d+)"));
static PIN_OS_MAJOR_RE: LazyLock<Regex> =
    LazyLock::new(|| regex(r"(macos|darwin|osx|freebsd|solaris)-?(1\d)"));
static SEPARATORS_RE: LazyLock<Regex> = LazyLock::new(|| regex(r"[_/.\-]+"));
static UNPIN_OS_MINOR_RE: LazyLock<Regex> = LazyLock::new(|| regex(r"(\w)\^(\d+)\^(\d+)"));
static UNPIN_OS_MAJOR_RE: LazyLock<Regex> = LazyLock::new(|| regex(r"(\w)\^(\d+)"));
static ARCH_REVISION_RE: LazyLock<Regex> = LazyLock::new(|| regex(r"(arm|x86_64|amd64)\.?v?(\d)"));

/// One step of asset pattern normalization.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeRule {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Normalization rules for asset patterns, in the order they run.
pub const PATTERN_RULES: &[NormalizeRule] = &[
    NormalizeRule {
        name: "drop-version",
        apply: drop_version,
    },
    NormalizeRule {
        name: "collapse-names",
        apply: collapse_names,
    },
    NormalizeRule {
        name: "isolate-name",
        apply: isolate_name,
    },
    NormalizeRule {
        name: "lowercase",
        apply: lowercase,
    },
    // darwin-10.15 => darwin^10^15, so the split below keeps it together
    NormalizeRule {
        name: "pin-os-minor",
        apply: pin_os_minor,
    },
    // freebsd12 => freebsd^12, solaris11-64 => solaris^11-64
    NormalizeRule {
        name: "pin-os-major",
        apply: pin_os_major,
    },
    NormalizeRule {
        name: "split-separators",
        apply: split_separators,
    },
    NormalizeRule {
        name: "unpin-os-minor",
        apply: unpin_os_minor,
    },
    NormalizeRule {
        name: "unpin-os-major",
        apply: unpin_os_major,
    },
    NormalizeRule {
        name: "join-bit-width",
        apply: join_bit_width,
    },
    // armv7 => armv7, arm.6 => armv6, amd64.v2 => amd64_v2
    NormalizeRule {
        name: "arch-revision",
        apply: arch_revision,
    },
];

fn drop_version(s: &str) -> String {
    s.replace(VER, "")
}

fn collapse_names(s: &str) -> String {
    let mut s = s.to_string();
    while s.matches(NAME).count() > 1 {
        s = s.replacen(NAME, ".", 1);
    }
    s
}

fn isolate_name(s: &str) -> String {
    s.replacen(NAME, ".{NAME}.", 1)
}

fn lowercase(s: &str) -> String {
    s.to_lowercase().replace("{name}", NAME)
}

fn pin_os_minor(s: &str) -> String {
    PIN_OS_MINOR_RE.replace(s, "${1}^${2}^${3}").into_owned()
}

fn pin_os_major(s: &str) -> String {
    PIN_OS_MAJOR_RE.replace(s, "${1}^${2}").into_owned()
}

fn split_separators(s: &str) -> String {
    SEPARATORS_RE.replace_all(s, ".").into_owned()
}

fn unpin_os_minor(s: &str) -> String {
    UNPIN_OS_MINOR_RE.replace(s, "${1}_${2}_${3}").into_owned()
}

fn unpin_os_major(s: &str) -> String {
    UNPIN_OS_MAJOR_RE.replace(s, "${1}_${2}").into_owned()
}

// only split spellings; `32bit` and `64bit` are dictionary terms
fn join_bit_width(s: &str) -> String {
    s.replace("x86.64", "x86_64")
        .replace("32.bit", "x86")
        .replace("64.bit", "x86_64")
}

fn arch_revision(s: &str) -> String {
    ARCH_REVISION_RE
        .replace_all(s, "${1}_v${2}")
        .replace("arm_", "arm")
        .replace("armv32", "arm32")
        .replace("armv64", "arm64")
}

/// Split an asset pattern into normalized terms.
pub fn pattern_to_terms(pattern: &str) -> Vec<String> {
    let mut s = pattern.to_string();
    for rule in PATTERN_RULES {
        let next = (rule.apply)(&s);
        if next != s {
            tracing::trace!(rule = rule.name, from = %s, to = %next, "normalized pattern");
        }
        s = next;
    }
    s.split('.')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// The terms of a build's asset name or download URL.
pub fn tokenize(project: &Project, build: &Build) -> Vec<String> {
    pattern_to_terms(&to_pattern(project, build))
}

/// Split a user agent on whitespace and `/`. Case is kept.
///
/// `curl/8.4.0 Linux/6.2.0-1014-aws x86_64 GNU/Linux` gives
/// `[curl, 8.4.0, Linux, 6.2.0-1014-aws, x86_64, GNU, Linux]`.
pub fn user_agent_terms(ua: &str) -> Vec<String> {
    ua.split_whitespace()
        .flat_map(|word| word.split('/'))
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}
