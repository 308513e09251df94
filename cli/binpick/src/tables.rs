//! Built-in tables plus any overlays named on the command line.

use std::path::Path;

use anyhow::{Context, Result};
use binpick_targets::parse::{
    discover_overlays, load_dictionary_toml, load_waterfall_toml, reject_errors,
    validate_dictionary, validate_waterfall,
};
use binpick_targets::{TermDictionary, Waterfall};

/// The dictionaries and waterfall every command resolves against.
pub struct Tables {
    pub assets: TermDictionary,
    pub agents: TermDictionary,
    pub waterfall: Waterfall,
}

impl Tables {
    /// The built-in tables, unmodified.
    pub fn builtin() -> Self {
        Tables {
            assets: TermDictionary::release_assets().clone(),
            agents: TermDictionary::user_agents().clone(),
            waterfall: Waterfall::builtin().clone(),
        }
    }

    /// The built-in tables with overlays applied.
    ///
    /// `terms` may be a directory, in which case every `.terms.toml` and
    /// `.waterfall.toml` in it is applied in path order.
    pub fn load(
        terms: Option<&Path>,
        agent_terms: Option<&Path>,
        waterfall: Option<&Path>,
    ) -> Result<Self> {
        let mut tables = Tables::builtin();

        if let Some(path) = terms {
            if path.is_dir() {
                let (term_files, waterfall_files) = discover_overlays(path)?;
                for file in &term_files {
                    tables.apply_terms(file)?;
                }
                for file in &waterfall_files {
                    tables.apply_waterfall(file)?;
                }
            } else {
                tables.apply_terms(path)?;
            }
        }
        if let Some(path) = agent_terms {
            let overlay = load_dictionary_toml(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tables.agents = tables.agents.with_overlay(overlay);
            reject_errors(validate_dictionary(&tables.agents))
                .with_context(|| format!("invalid terms in {}", path.display()))?;
        }
        if let Some(path) = waterfall {
            tables.apply_waterfall(path)?;
        }

        Ok(tables)
    }

    fn apply_terms(&mut self, path: &Path) -> Result<()> {
        let overlay =
            load_dictionary_toml(path).with_context(|| format!("loading {}", path.display()))?;
        self.assets = self.assets.with_overlay(overlay);
        reject_errors(validate_dictionary(&self.assets))
            .with_context(|| format!("invalid terms in {}", path.display()))?;
        tracing::debug!(path = %path.display(), "applied term overlay");
        Ok(())
    }

    fn apply_waterfall(&mut self, path: &Path) -> Result<()> {
        let overlay =
            load_waterfall_toml(path).with_context(|| format!("loading {}", path.display()))?;
        reject_errors(validate_waterfall(&overlay))
            .with_context(|| format!("invalid waterfall in {}", path.display()))?;
        self.waterfall.merge(overlay);
        tracing::debug!(path = %path.display(), "applied waterfall overlay");
        Ok(())
    }

    /// Report every validation issue in the loaded tables.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("release asset terms", validate_dictionary(&self.assets)),
            ("user agent terms", validate_dictionary(&self.agents)),
            ("waterfall", validate_waterfall(&self.waterfall)),
        ];

        let mut errors = 0;
        for (label, checked) in checks {
            match checked {
                Ok(()) => println!("{label}: ok"),
                Err(issues) => {
                    for issue in &issues {
                        println!("{label}: {}: {}", issue.severity, issue.message);
                    }
                    errors += issues.iter().filter(|i| i.severity == "error").count();
                }
            }
        }

        if errors > 0 {
            anyhow::bail!("{errors} validation error(s)");
        }
        Ok(())
    }
}
