//! Resolved target triplets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};
use crate::fact::Field;

/// Vendor written when no term names one.
pub const DEFAULT_VENDOR: &str = "unknown";
/// Libc written when no term names one.
pub const DEFAULT_LIBC: &str = "none";

/// A fully resolved platform.
///
/// `android` is derived: it is true exactly when os is `android` and libc is
/// `bionic`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetTriplet {
    pub os: String,
    pub arch: String,
    pub vendor: String,
    pub libc: String,
    pub android: bool,
}

impl TargetTriplet {
    pub fn new(os: &str, arch: &str, vendor: &str, libc: &str) -> Self {
        TargetTriplet {
            os: os.to_string(),
            arch: arch.to_string(),
            vendor: vendor.to_string(),
            libc: libc.to_string(),
            android: os == "android" && libc == "bionic",
        }
    }

    /// Same os, arch and libc. Vendors are cosmetic.
    pub fn same_platform(&self, other: &TargetTriplet) -> bool {
        self.os == other.os && self.arch == other.arch && self.libc == other.libc
    }
}

impl fmt::Display for TargetTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}-{}", self.arch, self.vendor, self.os, self.libc)
    }
}

/// The result of resolving one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub triplet: TargetTriplet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Terms no table or rule recognised.
    #[serde(default)]
    pub unknown_terms: Vec<String>,
}

/// What a user agent says about its host. Absent fields stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libc: Option<String>,
    pub android: bool,
    #[serde(default)]
    pub unknown_terms: Vec<String>,
    /// Every term of the user agent.
    #[serde(default)]
    pub terms: Vec<String>,
}

impl HostTarget {
    /// Apply the vendor and libc defaults and require os and arch.
    pub fn into_triplet(self) -> Result<TargetTriplet> {
        let missing = |field| TargetError::MissingField {
            subject: "user agent".into(),
            field,
            terms: self.terms.clone(),
        };
        let os = self.os.as_deref().ok_or_else(|| missing(Field::Os))?;
        let arch = self.arch.as_deref().ok_or_else(|| missing(Field::Arch))?;
        Ok(TargetTriplet::new(
            os,
            arch,
            self.vendor.as_deref().unwrap_or(DEFAULT_VENDOR),
            self.libc.as_deref().unwrap_or(DEFAULT_LIBC),
        ))
    }
}
