//! Term dictionaries: which platform fact each term asserts.
//!
//! A dictionary has three parts, consulted in this order by the resolver:
//!
//! - **terms**: the primary map. A hit here is authoritative and is checked
//!   for conflicts against what is already known.
//! - **rules**: ordered pattern rules for terms the primary map doesn't
//!   know (`android12`, `6.2.0-1014-aws`, `darwin_10_15`).
//! - **tiers**: low-confidence maps used only to fill fields that are still
//!   empty after the primary pass (`linux` alone most likely means x86_64).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::fact::PlatformFact;
use crate::parse::DictionaryOverlay;
use crate::tables;

/// A term → fact table.
pub type TermMap = BTreeMap<String, PlatformFact>;

static RELEASE_ASSETS: LazyLock<TermDictionary> = LazyLock::new(|| {
    TermDictionary::new(
        tables::release_asset_terms(),
        tables::release_asset_tiers(),
        tables::release_asset_rules(),
    )
});

static USER_AGENTS: LazyLock<TermDictionary> = LazyLock::new(|| {
    TermDictionary::new(
        tables::user_agent_terms(),
        Vec::new(),
        tables::user_agent_rules(),
    )
});

/// What a rule does with a term it matches.
#[derive(Debug, Clone)]
pub enum RuleAction {
    /// The term is noise.
    Skip,
    /// The term asserts this fact.
    Assert(PlatformFact),
    /// The term suggests this fact for fields no other term sets.
    Fill(PlatformFact),
    /// Rewrite the term (regex replacement syntax) and keep classifying.
    Rewrite(String),
}

/// A named pattern rule for terms missing from the primary map.
#[derive(Debug, Clone)]
pub struct TermRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub action: RuleAction,
}

impl TermRule {
    pub(crate) fn new(name: &'static str, pattern: &str, action: RuleAction) -> Self {
        TermRule {
            name,
            pattern: Regex::new(pattern).expect("built-in term rule pattern"),
            action,
        }
    }
}

/// How a dictionary classifies one term.
#[derive(Debug, Clone, PartialEq)]
pub enum TermClass<'a> {
    /// The term asserts a fact.
    Fact(&'a PlatformFact),
    /// The term only fills fields the other terms leave empty.
    Fill(&'a PlatformFact),
    /// The term is recognised noise.
    Ignored,
    /// The term is not recognised. Carries the term after any rewrites.
    Unknown(String),
}

/// Term tables for one kind of input.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: TermMap,
    tiers: Vec<TermMap>,
    rules: Vec<TermRule>,
}

impl TermDictionary {
    pub fn new(terms: TermMap, tiers: Vec<TermMap>, rules: Vec<TermRule>) -> Self {
        TermDictionary {
            terms,
            tiers,
            rules,
        }
    }

    /// The built-in dictionary for release asset file names and URLs.
    pub fn release_assets() -> &'static TermDictionary {
        &RELEASE_ASSETS
    }

    /// The built-in dictionary for `uname`-style user agent strings.
    pub fn user_agents() -> &'static TermDictionary {
        &USER_AGENTS
    }

    /// A copy of this dictionary with `overlay` applied: overlay terms
    /// replace existing entries, overlay tiers are consulted after the
    /// existing ones.
    pub fn with_overlay(&self, overlay: DictionaryOverlay) -> TermDictionary {
        let mut merged = self.clone();
        merged.terms.extend(overlay.terms);
        merged.tiers.extend(overlay.tiers);
        merged
    }

    pub fn lookup(&self, term: &str) -> Option<&PlatformFact> {
        self.terms.get(term)
    }

    pub fn terms(&self) -> &TermMap {
        &self.terms
    }

    pub fn tiers(&self) -> &[TermMap] {
        &self.tiers
    }

    pub fn rules(&self) -> &[TermRule] {
        &self.rules
    }

    /// Classify a term against the primary map, then the rules.
    ///
    /// A rewritten term is looked up in the primary map again before the
    /// remaining rules run.
    pub fn classify(&self, term: &str) -> TermClass<'_> {
        if let Some(fact) = self.terms.get(term) {
            return TermClass::Fact(fact);
        }

        let mut term = term.to_string();
        for rule in &self.rules {
            if !rule.pattern.is_match(&term) {
                continue;
            }
            match &rule.action {
                RuleAction::Skip => return TermClass::Ignored,
                RuleAction::Assert(fact) => return TermClass::Fact(fact),
                RuleAction::Fill(fact) => return TermClass::Fill(fact),
                RuleAction::Rewrite(replacement) => {
                    let rewritten = rule.pattern.replace(&term, replacement.as_str()).into_owned();
                    tracing::trace!(rule = rule.name, from = %term, to = %rewritten, "rewrote term");
                    if rewritten.is_empty() {
                        return TermClass::Ignored;
                    }
                    if let Some(fact) = self.terms.get(&rewritten) {
                        return TermClass::Fact(fact);
                    }
                    term = rewritten;
                }
            }
        }

        TermClass::Unknown(term)
    }
}
