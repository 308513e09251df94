//! Partial platform facts asserted by a single term.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A triplet field that terms can assert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Os,
    Arch,
    Vendor,
    Libc,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Os, Field::Arch, Field::Vendor, Field::Libc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Os => "os",
            Field::Arch => "arch",
            Field::Vendor => "vendor",
            Field::Libc => "libc",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a term constrains one field.
///
/// In TOML either a bare string (`arch = "armhf"`) or a table
/// (`arch = { preferred = "armhf", accepted = ["armv7", "armhf"] }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMatch {
    /// The field must be exactly this value.
    Exact(String),
    /// Any of `accepted` is compatible; `preferred` fills an empty field.
    OneOf {
        preferred: String,
        accepted: Vec<String>,
    },
}

impl FieldMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        FieldMatch::Exact(value.into())
    }

    pub fn one_of(preferred: &str, accepted: &[&str]) -> Self {
        let mut accepted: Vec<String> = accepted.iter().map(|v| v.to_string()).collect();
        if !accepted.iter().any(|v| v == preferred) {
            accepted.insert(0, preferred.to_string());
        }
        FieldMatch::OneOf {
            preferred: preferred.to_string(),
            accepted,
        }
    }

    /// The value written into an empty field.
    pub fn preferred(&self) -> &str {
        match self {
            FieldMatch::Exact(value) => value,
            FieldMatch::OneOf { preferred, .. } => preferred,
        }
    }

    /// Whether an already established value is compatible with this match.
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            FieldMatch::Exact(expected) => expected == value,
            FieldMatch::OneOf {
                preferred,
                accepted,
            } => preferred == value || accepted.iter().any(|v| v == value),
        }
    }
}

/// What a single term says about the platform. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformFact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<FieldMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<FieldMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<FieldMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libc: Option<FieldMatch>,
    /// Release channel named by the term (`stable`, `beta`, `lts`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// The term identifies an Android build.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub android: bool,
}

impl PlatformFact {
    /// A fact asserting nothing: the term is known but uninformative.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn field(&self, field: Field) -> Option<&FieldMatch> {
        match field {
            Field::Os => self.os.as_ref(),
            Field::Arch => self.arch.as_ref(),
            Field::Vendor => self.vendor.as_ref(),
            Field::Libc => self.libc.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.field(*f).is_none())
            && self.channel.is_none()
            && !self.android
    }

    pub fn os(mut self, os: &str) -> Self {
        self.os = Some(FieldMatch::exact(os));
        self
    }

    pub fn arch(mut self, arch: &str) -> Self {
        self.arch = Some(FieldMatch::exact(arch));
        self
    }

    pub fn arch_one_of(mut self, preferred: &str, accepted: &[&str]) -> Self {
        self.arch = Some(FieldMatch::one_of(preferred, accepted));
        self
    }

    pub fn vendor(mut self, vendor: &str) -> Self {
        self.vendor = Some(FieldMatch::exact(vendor));
        self
    }

    pub fn libc(mut self, libc: &str) -> Self {
        self.libc = Some(FieldMatch::exact(libc));
        self
    }

    pub fn libc_one_of(mut self, preferred: &str, accepted: &[&str]) -> Self {
        self.libc = Some(FieldMatch::one_of(preferred, accepted));
        self
    }

    pub fn channel(mut self, channel: &str) -> Self {
        self.channel = Some(channel.to_string());
        self
    }

    pub fn android(mut self) -> Self {
        self.android = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_accepts_only_itself() {
        let m = FieldMatch::exact("linux");
        assert_eq!(m.preferred(), "linux");
        assert!(m.accepts("linux"));
        assert!(!m.accepts("windows"));
    }

    #[test]
    fn one_of_always_accepts_preferred() {
        let m = FieldMatch::one_of("armhf", &["armv7"]);
        assert!(m.accepts("armhf"));
        assert!(m.accepts("armv7"));
        assert!(!m.accepts("aarch64"));
    }

    #[test]
    fn empty_fact() {
        assert!(PlatformFact::none().is_empty());
        assert!(!PlatformFact::none().channel("lts").is_empty());
        assert!(!PlatformFact::none().android().is_empty());
    }

    #[test]
    fn deserializes_both_match_shapes() {
        let fact: PlatformFact = toml::from_str(
            r#"
os = "linux"
libc = { preferred = "musl", accepted = ["musl", "none"] }
"#,
        )
        .unwrap();
        assert_eq!(fact.os, Some(FieldMatch::exact("linux")));
        assert_eq!(fact.libc, Some(FieldMatch::one_of("musl", &["musl", "none"])));
        assert!(!fact.android);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(toml::from_str::<PlatformFact>(r#"kernel = "linux""#).is_err());
    }
}
