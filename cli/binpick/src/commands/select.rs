//! `binpick select`: prefix selection over raw versions.

use anyhow::Result;
use binpick_lexver::{Catalog, LexVer, SelectionBundle};
use serde::Serialize;

/// A [`SelectionBundle`] spelled with the versions as given.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub matches: Vec<String>,
    pub latest: Option<String>,
    pub stable: Option<String>,
    pub previous_step: Option<String>,
    pub next_step: Option<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub default: Option<String>,
}

impl Selection {
    pub fn new(catalog: &Catalog, bundle: &SelectionBundle) -> Self {
        let raw = |key: &Option<LexVer>| {
            key.as_ref()
                .and_then(|k| catalog.original(k))
                .map(str::to_string)
        };
        Selection {
            matches: bundle
                .matches
                .iter()
                .filter_map(|k| catalog.original(k))
                .map(str::to_string)
                .collect(),
            latest: raw(&bundle.latest),
            stable: raw(&bundle.stable),
            previous_step: raw(&bundle.previous_step),
            next_step: raw(&bundle.next_step),
            previous: raw(&bundle.previous),
            next: raw(&bundle.next),
            default: raw(&bundle.default),
        }
    }

    fn render(&self) -> String {
        let line = |label: &str, value: &Option<String>| {
            format!("{label:<14}{}\n", value.as_deref().unwrap_or("-"))
        };
        let mut out = String::new();
        out.push_str(&line("default", &self.default));
        out.push_str(&line("latest", &self.latest));
        out.push_str(&line("stable", &self.stable));
        out.push_str(&line("next", &self.next));
        out.push_str(&line("next-step", &self.next_step));
        out.push_str(&line("previous-step", &self.previous_step));
        out.push_str(&line("previous", &self.previous));
        out.push_str(&format!("{:<14}{}\n", "matches", self.matches.join(" ")));
        out
    }
}

pub fn report(prefix: &str, versions: &[String], json: bool) -> Result<String> {
    let catalog = Catalog::new(versions.iter().cloned());
    let selection = Selection::new(&catalog, &catalog.select(prefix));
    if json {
        Ok(serde_json::to_string_pretty(&selection)? + "\n")
    } else {
        Ok(selection.render())
    }
}

pub fn run(prefix: &str, versions: &[String], json: bool) -> Result<()> {
    print!("{}", report(prefix, versions, json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn selection_uses_raw_spellings() {
        let versions = versions(&["v1.990.0", "v1.991.0-rc1", "v1.991.0", "v1.992.0-rc1"]);
        let catalog = Catalog::new(versions.iter().cloned());
        let selection = Selection::new(&catalog, &catalog.select("v1.991"));
        assert_eq!(selection.matches, vec!["v1.991.0", "v1.991.0-rc1"]);
        assert_eq!(selection.stable.as_deref(), Some("v1.991.0"));
        assert_eq!(selection.previous_step.as_deref(), Some("v1.991.0-rc1"));
        assert_eq!(selection.next.as_deref(), Some("v1.992.0-rc1"));
        assert_eq!(selection.previous.as_deref(), Some("v1.990.0"));
        assert_eq!(selection.default.as_deref(), Some("v1.991.0"));
    }

    #[test]
    fn json_is_camel_case() {
        let out = report("1", &versions(&["1.0.0", "1.1.0-rc1"]), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["nextStep"], "1.1.0-rc1");
        assert_eq!(value["stable"], "1.0.0");
        assert!(value["previous"].is_null());
    }

    #[test]
    fn text_output_marks_missing_entries() {
        let out = report("2", &versions(&["1.0.0"]), false).unwrap();
        assert!(out.contains("default       -\n"), "{out}");
        assert!(out.contains("next          1.0.0\n"), "{out}");
    }
}
