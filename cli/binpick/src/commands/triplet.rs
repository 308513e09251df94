//! `binpick triplet`: classify release assets.

use anyhow::Result;
use binpick_targets::{
    build_to_package_type, installability, pattern_to_terms, to_pattern, Build, Installability,
    Project, Resolution, Resolver,
};
use serde::Serialize;

use crate::tables::Tables;

/// Everything we can say about one asset.
#[derive(Debug, Serialize)]
pub struct AssetReport {
    pub download: String,
    pub pattern: String,
    pub terms: Vec<String>,
    pub package: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The asset file name of a download URL.
fn file_name(download: &str) -> &str {
    let path = download.split(['?', '#']).next().unwrap_or(download);
    path.rsplit('/').next().unwrap_or(path)
}

pub fn classify(tables: &Tables, project: &Project, version: &str, download: &str) -> AssetReport {
    let mut build = Build::new(download, version);
    build.name = Some(file_name(download).to_string());

    let pattern = to_pattern(project, &build);
    let terms = pattern_to_terms(&pattern);
    let status = match installability(project, &build) {
        Installability::Installable => "installable".to_string(),
        Installability::SourceArchive => "source archive".to_string(),
        Installability::NotABuild { reason } => format!("not a build: {reason}"),
    };
    let (resolution, error) = match Resolver::new(&tables.assets).resolve(project, &build, &terms) {
        Ok(resolution) => (Some(resolution), None),
        Err(e) => (None, Some(e.to_string())),
    };

    AssetReport {
        download: download.to_string(),
        pattern,
        terms,
        package: build_to_package_type(&build),
        status,
        resolution,
        error,
    }
}

fn render(report: &AssetReport) -> String {
    let mut out = format!("{}\n", report.download);
    out.push_str(&format!("  pattern:  {}\n", report.pattern));
    out.push_str(&format!("  terms:    {}\n", report.terms.join(" ")));
    let package = if report.package.is_empty() {
        "(bare)"
    } else {
        &report.package
    };
    out.push_str(&format!("  package:  {package}\n"));
    out.push_str(&format!("  status:   {}\n", report.status));
    if let Some(resolution) = &report.resolution {
        out.push_str(&format!("  target:   {}\n", resolution.triplet));
        if let Some(channel) = &resolution.channel {
            out.push_str(&format!("  channel:  {channel}\n"));
        }
        if !resolution.unknown_terms.is_empty() {
            out.push_str(&format!("  unknown:  {}\n", resolution.unknown_terms.join(" ")));
        }
    }
    if let Some(error) = &report.error {
        out.push_str(&format!("  error:    {error}\n"));
    }
    out
}

pub fn report(
    tables: &Tables,
    name: &str,
    aliases: &[String],
    version: &str,
    downloads: &[String],
    json: bool,
) -> Result<String> {
    let mut project = Project::new(name);
    if !aliases.is_empty() {
        project = project.with_names(std::iter::once(name).chain(aliases.iter().map(String::as_str)));
    }

    let reports: Vec<AssetReport> = downloads
        .iter()
        .map(|download| classify(tables, &project, version, download))
        .collect();

    if json {
        return Ok(serde_json::to_string_pretty(&reports)? + "\n");
    }
    Ok(reports.iter().map(render).collect::<Vec<_>>().join("\n"))
}

pub fn run(
    tables: &Tables,
    name: &str,
    aliases: &[String],
    version: &str,
    downloads: &[String],
    json: bool,
) -> Result<()> {
    print!("{}", report(tables, name, aliases, version, downloads, json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_an_asset() {
        let tables = Tables::builtin();
        let report = classify(
            &tables,
            &Project::new("myapp"),
            "1.2.3",
            "https://github.com/acme/myapp/releases/download/v1.2.3/myapp-v1.2.3-linux-armv7a-musl.tar.gz",
        );
        assert_eq!(report.pattern, "{NAME}-{VER}-linux-armv7a-musl");
        assert_eq!(report.terms, vec!["{NAME}", "linux", "armv7a", "musl"]);
        assert_eq!(report.package, ".tar.gz");
        assert_eq!(report.status, "installable");
        let triplet = report.resolution.unwrap().triplet;
        assert_eq!(triplet.to_string(), "armv7a-unknown-linux-musl");
    }

    #[test]
    fn conflicts_are_reported_per_asset() {
        let tables = Tables::builtin();
        let out = report(
            &tables,
            "tool",
            &[],
            "1.0.0",
            &["tool-1.0.0-windows-linux.zip".to_string(), "tool-1.0.0-SHA256SUMS".to_string()],
            false,
        )
        .unwrap();
        assert!(out.contains("error:    tool tool-1.0.0-windows-linux.zip: conflicting os"), "{out}");
        assert!(out.contains("status:   not a build: checksum file (SHA256SUMS)"), "{out}");
    }

    #[test]
    fn aliases_are_matched() {
        let tables = Tables::builtin();
        let out = report(
            &tables,
            "ripgrep",
            &["rg".to_string()],
            "14.1.0",
            &["rg-14.1.0-aarch64-apple-darwin.tar.gz".to_string()],
            true,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["pattern"], "{NAME}-{VER}-aarch64-apple-darwin");
        assert_eq!(value[0]["resolution"]["triplet"]["os"], "darwin");
    }

    #[test]
    fn file_name_of_url() {
        assert_eq!(file_name("https://example.com/a/b.tar.gz?x=1"), "b.tar.gz");
        assert_eq!(file_name("b.zip"), "b.zip");
    }
}
