//! Prefix selection over descending version keys.
//!
//! Given keys sorted greatest-first and a [`LexPrefix`], [`select`] names the
//! useful reference points around the matching family in one pass: the
//! newest match, the newest stable match, the releases immediately around the
//! stable one, and the nearest non-matching neighbours on either side.

use std::collections::HashMap;

use serde::Serialize;

use crate::codec::{LexPrefix, LexVer};

/// Named pointers into a descending key list relative to a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBundle {
    /// Every matching key, in input order.
    pub matches: Vec<LexVer>,
    /// The first (greatest) matching key.
    pub latest: Option<LexVer>,
    /// The greatest matching stable release.
    pub stable: Option<LexVer>,
    /// The first match after `stable`.
    pub previous_step: Option<LexVer>,
    /// The last pre-release match before `stable`.
    pub next_step: Option<LexVer>,
    /// The first non-matching key after the match run.
    pub previous: Option<LexVer>,
    /// The last non-matching key before the match run.
    pub next: Option<LexVer>,
    /// `stable` if there is one, else `latest`.
    pub default: Option<LexVer>,
}

/// Select reference points for `prefix` from keys sorted greatest-first.
///
/// The input is not sorted here; see [`sort_descending`].
pub fn select(descending: &[LexVer], prefix: &LexPrefix) -> SelectionBundle {
    let mut bundle = SelectionBundle::default();

    for key in descending {
        if !prefix.matches(key) {
            if bundle.latest.is_some() {
                bundle.previous = Some(key.clone());
                break;
            }
            bundle.next = Some(key.clone());
            continue;
        }

        bundle.matches.push(key.clone());
        if bundle.latest.is_none() {
            bundle.latest = Some(key.clone());
        }

        if bundle.stable.is_some() {
            if bundle.previous_step.is_none() {
                bundle.previous_step = Some(key.clone());
            }
        } else if key.is_stable() {
            bundle.stable = Some(key.clone());
        } else {
            bundle.next_step = Some(key.clone());
        }
    }

    bundle.default = bundle.stable.clone().or_else(|| bundle.latest.clone());
    bundle
}

/// Sort keys greatest-first.
pub fn sort_descending(keys: &mut [LexVer]) {
    keys.sort_by(|a, b| b.cmp(a));
}

/// The headline tags of a whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags {
    pub latest: Option<LexVer>,
    pub stable: Option<LexVer>,
    pub default: Option<LexVer>,
}

/// Tags from keys already sorted greatest-first.
pub fn sorted_to_tags(descending: &[LexVer]) -> Tags {
    let latest = descending.first().cloned();
    let stable = descending.iter().find(|key| key.is_stable()).cloned();
    let default = stable.clone().or_else(|| latest.clone());
    Tags {
        latest,
        stable,
        default,
    }
}

/// Tags from unsorted keys.
pub fn to_tags(mut keys: Vec<LexVer>) -> Tags {
    sort_descending(&mut keys);
    sorted_to_tags(&keys)
}

/// Raw release versions indexed by their keys, kept greatest-first.
///
/// When two spellings encode to the same key the first one added wins.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    keys: Vec<LexVer>,
    originals: HashMap<LexVer, String>,
}

impl Catalog {
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys = Vec::new();
        let mut originals = HashMap::new();
        for version in versions {
            let version = version.into();
            let key = LexVer::parse(&version);
            if originals.contains_key(&key) {
                continue;
            }
            keys.push(key.clone());
            originals.insert(key, version);
        }
        sort_descending(&mut keys);
        Catalog { keys, originals }
    }

    /// Keys, greatest first.
    pub fn keys(&self) -> &[LexVer] {
        &self.keys
    }

    /// The raw version a key was built from.
    pub fn original(&self, key: &LexVer) -> Option<&str> {
        self.originals.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Select against a raw version query such as `v1.991`.
    pub fn select(&self, query: &str) -> SelectionBundle {
        select(&self.keys, &LexPrefix::parse(query))
    }

    pub fn tags(&self) -> Tags {
        sorted_to_tags(&self.keys)
    }
}
