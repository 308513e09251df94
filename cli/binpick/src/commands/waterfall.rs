//! `binpick waterfall`: list substitutes for a platform.

use anyhow::Result;
use binpick_targets::{Confidence, Field, TargetTriplet};

use crate::tables::Tables;

pub fn report(tables: &Tables, os: &str, arch: &str, vendor: &str, libc: &str) -> String {
    let waterfall = &tables.waterfall;
    let mut out = String::new();

    for (field, value) in [(Field::Arch, arch), (Field::Libc, libc)] {
        let candidates = match field {
            Field::Arch => waterfall.arches(os, value),
            _ => waterfall.libcs(os, value),
        };
        out.push_str(&format!("{field}: {}", candidates.join(" > ")));
        if let Some(fallback) = waterfall.fallback(field, os, value) {
            if fallback.confidence == Confidence::Uncertain {
                out.push_str(" (uncertain");
                if let Some(note) = &fallback.note {
                    out.push_str(&format!(": {note}"));
                }
                out.push(')');
            }
        }
        out.push('\n');
    }

    let host = TargetTriplet::new(os, arch, vendor, libc);
    out.push_str("substitutes:\n");
    for (i, triplet) in waterfall.substitutes(&host).iter().enumerate() {
        out.push_str(&format!("  {:>2}. {triplet}\n", i + 1));
    }
    out
}

pub fn run(tables: &Tables, os: &str, arch: &str, vendor: &str, libc: &str) -> Result<()> {
    print!("{}", report(tables, os, arch, vendor, libc));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_armv7a() {
        let out = report(&Tables::builtin(), "linux", "armv7a", "unknown", "none");
        assert!(out.starts_with("arch: armv7a > armv7 > armhf\nlibc: none\n"), "{out}");
        assert!(out.contains("   3. armhf-unknown-linux-none\n"), "{out}");
    }

    #[test]
    fn uncertain_entries_are_flagged() {
        let out = report(&Tables::builtin(), "linux", "x86_64", "unknown", "musl");
        assert!(out.contains("libc: none > musl (uncertain"), "{out}");
    }
}
