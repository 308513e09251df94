//! TOML parsing, validation, and discovery for table overlays.
//!
//! Overlays extend the built-in tables without a rebuild. A term overlay
//! (`.terms.toml`) adds or replaces dictionary terms and appends tiers:
//!
//! ```toml
//! [terms.linuxmusl]
//! os = "linux"
//! libc = { preferred = "musl", accepted = ["musl", "none"] }
//!
//! [[tiers]]
//! x64 = { arch = "x86_64" }
//! ```
//!
//! A waterfall overlay (`.waterfall.toml`) replaces waterfall entries:
//!
//! ```toml
//! [arch.linux.riscv64]
//! candidates = ["riscv64", "riscv64gc"]
//! confidence = "uncertain"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dictionary::{TermDictionary, TermMap};
use crate::error::{Result, TargetError};
use crate::fact::{Field, FieldMatch};
use crate::waterfall::Waterfall;

/// Terms and tiers to merge into a [`TermDictionary`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DictionaryOverlay {
    pub terms: TermMap,
    pub tiers: Vec<TermMap>,
}

/// Entries to merge into a [`Waterfall`].
pub type WaterfallOverlay = Waterfall;

/// A validation issue found in a table.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

fn load(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a term overlay from a TOML string.
pub fn parse_dictionary_toml(toml_str: &str) -> Result<DictionaryOverlay> {
    let overlay: DictionaryOverlay = toml::from_str(toml_str)?;
    Ok(overlay)
}

/// Load a term overlay from a `.terms.toml` file.
pub fn load_dictionary_toml(path: &Path) -> Result<DictionaryOverlay> {
    parse_dictionary_toml(&load(path)?)
}

/// Parse a waterfall overlay from a TOML string.
pub fn parse_waterfall_toml(toml_str: &str) -> Result<WaterfallOverlay> {
    let overlay: WaterfallOverlay = toml::from_str(toml_str)?;
    Ok(overlay)
}

/// Load a waterfall overlay from a `.waterfall.toml` file.
pub fn load_waterfall_toml(path: &Path) -> Result<WaterfallOverlay> {
    parse_waterfall_toml(&load(path)?)
}

fn check_terms(label: &str, terms: &TermMap, issues: &mut Vec<ValidationIssue>) {
    for (term, fact) in terms {
        // the tokenizer splits on these, so such a term can never match
        if term.is_empty() || term.contains(|c: char| c == '/' || c.is_whitespace()) {
            issues.push(ValidationIssue {
                severity: "warning",
                message: format!("{label} term '{term}' can never be produced by the tokenizer"),
            });
        }

        for field in Field::ALL {
            match fact.field(field) {
                Some(FieldMatch::Exact(value)) if value.is_empty() => {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("{label} term '{term}' has an empty {field}"),
                    });
                }
                Some(FieldMatch::OneOf {
                    preferred,
                    accepted,
                }) => {
                    if preferred.is_empty() {
                        issues.push(ValidationIssue {
                            severity: "error",
                            message: format!("{label} term '{term}' has an empty preferred {field}"),
                        });
                    }
                    if !accepted.contains(preferred) {
                        issues.push(ValidationIssue {
                            severity: "warning",
                            message: format!(
                                "{label} term '{term}': preferred {field} '{preferred}' is not in accepted {accepted:?}"
                            ),
                        });
                    }
                }
                _ => {}
            }
        }

        if fact.android {
            if let Some(os) = &fact.os {
                if !matches!(os.preferred(), "linux" | "android") {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!(
                            "{label} term '{term}' is android but asserts os '{}'",
                            os.preferred()
                        ),
                    });
                }
            }
        }
    }
}

/// Validate a dictionary's terms and tiers.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_dictionary(dictionary: &TermDictionary) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    check_terms("primary", dictionary.terms(), &mut issues);
    for (i, tier) in dictionary.tiers().iter().enumerate() {
        check_terms(&format!("tier {i}"), tier, &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Validate waterfall entries.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_waterfall(waterfall: &Waterfall) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    for (field, table) in [(Field::Arch, &waterfall.arch), (Field::Libc, &waterfall.libc)] {
        for (os, entries) in table {
            for (value, fallback) in entries {
                if fallback.candidates.is_empty() {
                    issues.push(ValidationIssue {
                        severity: "error",
                        message: format!("{field} waterfall {os}/{value} has no candidates"),
                    });
                } else if !fallback.candidates.contains(value) {
                    issues.push(ValidationIssue {
                        severity: "warning",
                        message: format!(
                            "{field} waterfall {os}/{value} never offers '{value}' itself: {:?}",
                            fallback.candidates
                        ),
                    });
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Fail on error-severity issues; hand back the warnings.
pub fn reject_errors(
    checked: std::result::Result<(), Vec<ValidationIssue>>,
) -> Result<Vec<ValidationIssue>> {
    let issues = match checked {
        Ok(()) => return Ok(Vec::new()),
        Err(issues) => issues,
    };
    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity == "error")
        .map(|i| i.message.as_str())
        .collect();
    if errors.is_empty() {
        Ok(issues)
    } else {
        Err(TargetError::Validation {
            detail: errors.join("; "),
        })
    }
}

/// Discover overlay files in a directory.
///
/// Returns `(terms, waterfalls)`: the `.terms.toml` and `.waterfall.toml`
/// files, each sorted by path.
pub fn discover_overlays(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut terms = Vec::new();
    let mut waterfalls = Vec::new();
    if !dir.is_dir() {
        return Ok((terms, waterfalls));
    }

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.ends_with(".terms.toml") {
            terms.push(path);
        } else if file_name.ends_with(".waterfall.toml") {
            waterfalls.push(path);
        }
    }
    terms.sort();
    waterfalls.sort();
    Ok((terms, waterfalls))
}
