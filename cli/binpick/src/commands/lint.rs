//! `binpick lint-versions` and `binpick lint-hosts`: batch checks over
//! files with one entry per line. Blank lines and `#` comments are skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use binpick_lexver::{parse_version, Catalog};
use binpick_targets::{user_agent_terms, Field, Resolver, TargetError};

use crate::commands::select::Selection;
use crate::tables::Tables;

fn read_entries(path: &Path) -> Result<Vec<String>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn versions_report(entries: &[String], prefix: Option<&str>) -> String {
    let mut out = String::new();
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for version in entries {
        let key = parse_version(version);
        out.push_str(&format!("{key}\t{version}\n"));
        match seen.get(key.as_str()) {
            Some(first) if *first != version.as_str() => {
                out.push_str(&format!("  warning: '{version}' has the same key as '{first}'\n"));
            }
            Some(_) => {}
            None => {
                seen.insert(key.to_string(), version);
            }
        }
    }

    let catalog = Catalog::new(entries.iter().cloned());
    let tags = catalog.tags();
    let raw = |key: Option<&binpick_lexver::LexVer>| {
        key.and_then(|k| catalog.original(k)).unwrap_or("-").to_string()
    };
    out.push_str(&format!(
        "\n{} versions, latest {}, stable {}, default {}\n",
        catalog.len(),
        raw(tags.latest.as_ref()),
        raw(tags.stable.as_ref()),
        raw(tags.default.as_ref()),
    ));

    if let Some(prefix) = prefix {
        let selection = Selection::new(&catalog, &catalog.select(prefix));
        out.push_str(&format!("\nselect {prefix}:\n"));
        for (label, value) in [
            ("default", &selection.default),
            ("latest", &selection.latest),
            ("stable", &selection.stable),
            ("next", &selection.next),
            ("next-step", &selection.next_step),
            ("previous-step", &selection.previous_step),
            ("previous", &selection.previous),
        ] {
            out.push_str(&format!("  {label:<14}{}\n", value.as_deref().unwrap_or("-")));
        }
    }
    out
}

pub fn versions(path: &Path, prefix: Option<&str>) -> Result<()> {
    let entries = read_entries(path)?;
    print!("{}", versions_report(&entries, prefix));
    Ok(())
}

/// What a batch of user agents resolved to.
#[derive(Debug, Default)]
pub struct HostLint {
    /// Pieces of unknown terms, with counts.
    pub partial_terms: BTreeMap<String, usize>,
    /// Every primary dictionary term, with how many agents used it verbatim.
    pub known_terms: BTreeMap<String, usize>,
    pub triplets: BTreeSet<String>,
    /// Multi-word agents missing os or arch.
    pub incomplete: Vec<String>,
    pub errors: Vec<String>,
}

pub fn lint_hosts(tables: &Tables, entries: &[String]) -> HostLint {
    let resolver = Resolver::new(&tables.agents);
    let mut lint = HostLint {
        known_terms: tables.agents.terms().keys().map(|term| (term.clone(), 0)).collect(),
        ..Default::default()
    };

    for ua in entries {
        let terms = user_agent_terms(ua);
        // pattern matches (ab1234ABCD, android12-qgki, MINGW64_NT) aren't counted
        for term in &terms {
            if let Some(count) = lint.known_terms.get_mut(term) {
                *count += 1;
            }
        }
        let host = match resolver.resolve_host(&terms) {
            Ok(host) => host,
            Err(e) => {
                lint.errors.push(e.to_string());
                continue;
            }
        };
        for term in &host.unknown_terms {
            for piece in term.split('.').filter(|p| !p.is_empty()) {
                *lint.partial_terms.entry(piece.to_string()).or_default() += 1;
            }
        }

        // single words ('Wget', 'MS', 'curl/8.4.0') aren't expected to say much
        let single_word = ua.split_whitespace().count() == 1;
        match host.into_triplet() {
            Ok(triplet) => {
                lint.triplets.insert(triplet.to_string());
            }
            Err(TargetError::MissingField { field, .. }) if !single_word => {
                let missing = if field == Field::Os { "os" } else { "arch" };
                lint.incomplete.push(format!("'{missing}' not detected for '{ua}'"));
            }
            Err(_) => {}
        }
    }
    lint
}

pub fn hosts(tables: &Tables, path: &Path) -> Result<()> {
    let entries = read_entries(path)?;
    let lint = lint_hosts(tables, &entries);

    println!("Partial terms:");
    for (piece, count) in &lint.partial_terms {
        println!("  {piece:<24}{count}");
    }
    println!();
    println!("Known terms:");
    for (term, count) in &lint.known_terms {
        println!("  {term:<24}{count}");
    }
    println!();
    println!("Triplets:");
    for triplet in &lint.triplets {
        println!("  {triplet}");
    }
    for line in &lint.incomplete {
        eprintln!("warning: {line}");
    }
    for line in &lint.errors {
        eprintln!("error: {line}");
    }

    if !lint.errors.is_empty() {
        bail!("{} of {} user agents failed to resolve", lint.errors.len(), entries.len());
    }
    Ok(())
}
