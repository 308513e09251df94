//! Compatibility waterfalls: what else runs on a host.
//!
//! An aarch64 linux host can run armv7 binaries, an x86_64_v3 host can run
//! plain x86_64, a gnu host is happiest with a static build. Each table maps
//! a requested value to its substitutes, best first.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::fact::Field;
use crate::tables;
use crate::triplet::TargetTriplet;

/// Table key for entries that apply to every os.
pub const ANY_OS: &str = "ANYOS";

static BUILTIN: LazyLock<Waterfall> = LazyLock::new(tables::waterfall);

/// How sure we are that a substitute actually runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    #[default]
    Certain,
    /// Works on most hosts; depends on something we can't see from here.
    Uncertain,
}

/// Ordered substitutes for one requested value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    pub candidates: Vec<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// `os -> requested value -> fallback`, per field.
pub type FallbackTable = BTreeMap<String, BTreeMap<String, Fallback>>;

/// Arch and libc compatibility tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waterfall {
    pub arch: FallbackTable,
    pub libc: FallbackTable,
}

impl Waterfall {
    /// The built-in tables.
    pub fn builtin() -> &'static Waterfall {
        &BUILTIN
    }

    fn table(&self, field: Field) -> Option<&FallbackTable> {
        match field {
            Field::Arch => Some(&self.arch),
            Field::Libc => Some(&self.libc),
            Field::Os | Field::Vendor => None,
        }
    }

    /// The entry for `value` on `os`, falling back to the [`ANY_OS`] table.
    pub fn fallback(&self, field: Field, os: &str, value: &str) -> Option<&Fallback> {
        let table = self.table(field)?;
        table
            .get(os)
            .and_then(|entries| entries.get(value))
            .or_else(|| table.get(ANY_OS).and_then(|entries| entries.get(value)))
    }

    fn candidates<'a>(&'a self, field: Field, os: &str, value: &'a str) -> Vec<&'a str> {
        match self.fallback(field, os, value) {
            Some(fallback) => fallback.candidates.iter().map(String::as_str).collect(),
            None => vec![value],
        }
    }

    /// Arches that run on `os`/`arch`, best first.
    pub fn arches<'a>(&'a self, os: &str, arch: &'a str) -> Vec<&'a str> {
        self.candidates(Field::Arch, os, arch)
    }

    /// Libcs that work on `os`/`libc`, best first.
    pub fn libcs<'a>(&'a self, os: &str, libc: &'a str) -> Vec<&'a str> {
        self.candidates(Field::Libc, os, libc)
    }

    /// Every triplet that runs on `host`, best first.
    ///
    /// Arch takes precedence: all libcs of the best arch come before any
    /// libc of the next arch. The host's vendor is kept.
    pub fn substitutes(&self, host: &TargetTriplet) -> Vec<TargetTriplet> {
        let libcs = self.libcs(&host.os, &host.libc);
        let mut out = Vec::new();
        for arch in self.arches(&host.os, &host.arch) {
            for libc in &libcs {
                let candidate = TargetTriplet::new(&host.os, arch, &host.vendor, libc);
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// The first substitute for which `available` returns true.
    pub fn first_available<F>(&self, host: &TargetTriplet, mut available: F) -> Option<TargetTriplet>
    where
        F: FnMut(&TargetTriplet) -> bool,
    {
        self.substitutes(host).into_iter().find(|t| available(t))
    }

    /// Overlay entries replace built-in entries with the same os and value.
    pub fn merge(&mut self, overlay: Waterfall) {
        for (mine, theirs) in [(&mut self.arch, overlay.arch), (&mut self.libc, overlay.libc)] {
            for (os, entries) in theirs {
                mine.entry(os).or_default().extend(entries);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_armv7a() {
        let w = Waterfall::builtin();
        assert_eq!(w.arches("linux", "armv7a"), vec!["armv7a", "armv7", "armhf"]);
    }

    #[test]
    fn os_table_before_any_os() {
        let w = Waterfall::builtin();
        assert_eq!(
            w.arches("linux", "aarch64"),
            vec!["aarch64", "armv7a", "armv7", "armhf"]
        );
        assert_eq!(w.arches("darwin", "aarch64"), vec!["aarch64", "x86_64"]);
        assert_eq!(
            w.arches("freebsd", "x86_64_v3"),
            vec!["x86_64_v3", "x86_64_v2", "x86_64"]
        );
        assert_eq!(
            w.arches("windows", "x86_64_v3"),
            vec!["x86_64_v3", "x86_64_v2", "x86_64", "x86"]
        );
    }

    #[test]
    fn unknown_value_is_its_own_fallback() {
        let w = Waterfall::builtin();
        assert_eq!(w.arches("linux", "riscv64"), vec!["riscv64"]);
        assert_eq!(w.libcs("linux", "none"), vec!["none"]);
    }

    #[test]
    fn doubtful_entries_are_uncertain() {
        let w = Waterfall::builtin();
        let musl = w.fallback(Field::Libc, "linux", "musl").unwrap();
        assert_eq!(musl.confidence, Confidence::Uncertain);
        assert_eq!(w.libcs("linux", "gnu"), vec!["none", "gnu"]);
        let arm = w.fallback(Field::Arch, "linux", "aarch64").unwrap();
        assert_eq!(arm.confidence, Confidence::Uncertain);
        assert!(arm.note.is_some());
        assert!(w.fallback(Field::Os, "linux", "linux").is_none());
    }

    #[test]
    fn substitutes_are_arch_major() {
        let w = Waterfall::builtin();
        let host = TargetTriplet::new("linux", "armv7a", "unknown", "gnu");
        let subs: Vec<String> = w.substitutes(&host).iter().map(|t| t.to_string()).collect();
        assert_eq!(
            subs,
            vec![
                "armv7a-unknown-linux-none",
                "armv7a-unknown-linux-gnu",
                "armv7-unknown-linux-none",
                "armv7-unknown-linux-gnu",
                "armhf-unknown-linux-none",
                "armhf-unknown-linux-gnu",
            ]
        );
    }

    #[test]
    fn first_available_walks_substitutes() {
        let w = Waterfall::builtin();
        let host = TargetTriplet::new("darwin", "aarch64", "apple", "none");
        let found = w.first_available(&host, |t| t.arch == "x86_64").unwrap();
        assert_eq!(found.arch, "x86_64");
        assert!(w.first_available(&host, |t| t.arch == "riscv64").is_none());
    }

    #[test]
    fn merge_replaces_entries() {
        let mut w = Waterfall::builtin().clone();
        let mut overlay = Waterfall::default();
        overlay.arch.entry("linux".into()).or_default().insert(
            "riscv64".into(),
            Fallback {
                candidates: vec!["riscv64".into(), "riscv64gc".into()],
                confidence: Confidence::Certain,
                note: None,
            },
        );
        w.merge(overlay);
        assert_eq!(w.arches("linux", "riscv64"), vec!["riscv64", "riscv64gc"]);
        // untouched entries survive
        assert_eq!(w.arches("linux", "armv7a"), vec!["armv7a", "armv7", "armhf"]);
    }
}
