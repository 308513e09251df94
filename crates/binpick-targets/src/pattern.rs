//! Asset patterns, package types and installability.
//!
//! A pattern is an asset name with the project name and version replaced
//! by `{NAME}` and `{VER}`, so the same asset of two releases has the same
//! pattern:
//!
//! ```
//! use binpick_targets::{to_pattern, Build, Project};
//!
//! let project = Project::new("myapp");
//! let build = Build::new("myapp-v1.2.3-linux-armv7a-musl.tar.gz", "1.2.3");
//! assert_eq!(to_pattern(&project, &build), "{NAME}-{VER}-linux-armv7a-musl");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{Build, Project};

/// Release channels that aren't versions.
const CHANNEL_VERSIONS: &[&str] = &["master", "nightly"];

const CHECKSUM_FILES: &[&str] = &[
    "B3SUMS",
    "checksum",
    "MD5SUMS",
    "SHA1SUMS",
    "SHA256SUMS",
    "SHA512SUMS",
];

const NON_BUILD_TERMS: &[&str] = &[
    "bootstrap",
    "debug",
    "setup",
    "source",
    "src",
    "symbols",
    // a build, but not one you'd use given the alternative
    "unsigned",
    "vendor",
];

const NON_BUILD_EXTS: &[&str] = &[
    ".1",
    ".asc",
    ".b3",
    ".json",
    ".md5",
    ".pem",
    ".sbom",
    ".sha256",
    ".sha256sum",
    ".sha512",
    ".sig",
    ".txt",
    ".apk",
    ".deb",
    ".rpm",
    ".msixbundle",
];

/// Container (and installer) extensions, by os.
pub const PACKAGE_EXTS: &[&str] = &[
    ".exe",
    ".msi",
    ".msixbundle",
    ".app",
    ".dmg",
    ".pkg",
    ".rpm",
    ".deb",
    ".apk",
    ".tar",
    ".sh",
    ".git",
];

/// Compression extensions.
pub const COMPRESSION_EXTS: &[&str] = &[".bz2", ".gz", ".xz", ".zip", ".zst", ".7z"];

// .tar must come after the extensions that wrap it
const NON_INFORMATIVE_EXTS: &[&str] = &[".gz", ".xz", ".zst", ".zip", ".tar", ".7z"];

const SOURCE_EXTS: &[&str] = &[".zip", ".tar.gz", ".tar.xz", ".tar.zst"];

static GITHUB_RELEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https:..github.com.[^/]+.[^/]+.releases.download.[^/]+.(.*)").expect("asset regex")
});
static SOURCEFORGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https:..sourceforge.net.projects.([^/]+).files.([^/]+).download").expect("asset regex")
});
// ex: https://codeload.github.com/acme/tool.sh/legacy.zip/refs/tags/v1.0.2
static CODELOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https:..codeload.github.com/([^/]+)/([^/]+)/([^/]+)/refs/tags/([^/]+)").expect("asset regex")
});
static GIT_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https|http|git):.*/(.*).git$").expect("asset regex"));
static URL_HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://[^/]+/([^?]+)\??.*").expect("asset regex"));
static LEADING_PATH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^{}]+/").expect("asset regex"));
static NON_BUILD_TERM_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NON_BUILD_TERMS
        .iter()
        .map(|term| Regex::new(&format!(r"(\b|_)({term})(\b|_)")).expect("asset regex"))
        .collect()
});

/// Replace the version and project names of a build's asset with `{VER}`
/// and `{NAME}`, and drop what says nothing about the platform.
pub fn to_pattern(project: &Project, build: &Build) -> String {
    let mut download = build.source_text().to_string();

    // generic sources that benefit most from dynamic matching
    if let Some(caps) = GITHUB_RELEASE_RE.captures(&download) {
        download = caps[1].to_string();
    }
    if let Some(caps) = SOURCEFORGE_RE.captures(&download) {
        download = format!("{}_{}", &caps[1], &caps[2]);
    }

    // sources that don't
    if let Some(caps) = CODELOAD_RE.captures(&download) {
        download = format!("{}/{}/{}", &caps[2], &caps[4], &caps[3]);
    }
    download = GIT_URL_RE.replace(&download, "${2}.git").into_owned();
    download = URL_HOST_RE.replace(&download, "${1}").into_owned();

    // watchexec tags look like cli-v1.20.3
    let version = build.file_version();
    let version = version.strip_prefix("cli-").unwrap_or(version);
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version);
    if !version.is_empty() {
        let version_re = format!(r"(?i)(\b|\D)v?{}", regex::escape(version));
        match Regex::new(&version_re) {
            Ok(re) => download = re.replace_all(&download, "${1}{VER}").into_owned(),
            Err(e) => tracing::warn!(version, error = %e, "unusable version pattern"),
        }
    }

    for name in project.file_names() {
        let name_re = format!(r"(?i)(\b|_){}(\b|_|\d|[A-Z])", name_pattern(name));
        match Regex::new(&name_re) {
            Ok(re) => download = re.replace_all(&download, "{NAME}${2}").into_owned(),
            Err(e) => tracing::warn!(name, error = %e, "unusable name pattern"),
        }
    }

    // trim URLs up to the first {FOO}
    download = LEADING_PATH_RE.replace(&download, "").into_owned();

    for ext in NON_INFORMATIVE_EXTS {
        if let Some(stripped) = download.strip_suffix(ext) {
            download = stripped.to_string();
        }
    }

    download
}

/// `rip-grep` matches `rip_grep`, `rip.grep` and so on.
fn name_pattern(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '_' | '-' | '+' => ".".to_string(),
            c => regex::escape(c.encode_utf8(&mut [0; 4])),
        })
        .collect()
}

fn strip_any<'a>(filename: &'a str, exts: &[&'static str]) -> Option<(&'a str, &'static str)> {
    exts.iter()
        .find_map(|ext| filename.strip_suffix(ext).map(|rest| (rest, *ext)))
}

/// The package type of a file name: compression plus up to two container
/// extensions (`.tar.gz`, `.app.zip`, `.pkg.tar.zst`). Empty for bare
/// binaries.
pub fn filename_to_package_type(filename: &str) -> String {
    let mut rest = filename;
    let mut pkg = String::new();

    if let Some((stripped, ext)) = strip_any(rest, COMPRESSION_EXTS) {
        rest = stripped;
        pkg.push_str(ext);
    }

    // twice, for things like goreleaser's .pkg.tar.gz
    for _ in 0..2 {
        if let Some((stripped, ext)) = strip_any(rest, PACKAGE_EXTS) {
            rest = stripped;
            pkg.insert_str(0, ext);
        }
    }

    if let Some((_, ext)) = strip_any(rest, PACKAGE_EXTS) {
        tracing::warn!(filename, "package type nested more than two containers deep");
        pkg.insert_str(0, ext);
    }

    pkg
}

/// The package type from a build's name, else its download URL.
pub fn build_to_package_type(build: &Build) -> String {
    build
        .name
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(build.download.as_str()))
        .filter(|filename| !filename.is_empty())
        .map(filename_to_package_type)
        .find(|pkg| !pkg.is_empty())
        .unwrap_or_default()
}

/// Whether an asset is worth classifying at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installability {
    /// Probably a build. Platform matching decides the rest.
    Installable,
    /// Checksums, signatures, debug symbols, nightly tips and the like.
    NotABuild { reason: String },
    /// The project's plain source archive.
    SourceArchive,
}

impl Installability {
    pub fn is_installable(&self) -> bool {
        matches!(self, Installability::Installable)
    }
}

/// Rule out assets that are obviously not installable builds.
pub fn installability(project: &Project, build: &Build) -> Installability {
    let download = build.download.as_str();
    let not_a_build = |reason: String| Installability::NotABuild { reason };

    if let Some(sums) = CHECKSUM_FILES.iter().find(|sums| download.contains(*sums)) {
        return not_a_build(format!("checksum file ({sums})"));
    }
    if let Some(ext) = NON_BUILD_EXTS.iter().find(|ext| download.ends_with(*ext)) {
        return not_a_build(format!("non-build extension {ext}"));
    }
    if let Some(i) = NON_BUILD_TERM_RES.iter().position(|re| re.is_match(download)) {
        return not_a_build(format!("non-build term '{}'", NON_BUILD_TERMS[i]));
    }
    // tip commits aren't versions
    if CHANNEL_VERSIONS.contains(&build.version.as_str()) {
        return not_a_build(format!("channel '{}' is not a version", build.version));
    }

    if let Some(filename) = build.name.as_deref() {
        let version = build.file_version();
        for name in project.file_names() {
            let stem = format!("{name}-{version}");
            let is_source = SOURCE_EXTS
                .iter()
                .any(|ext| filename.strip_suffix(ext) == Some(stem.as_str()));
            if is_source {
                return Installability::SourceArchive;
            }
        }
    }

    Installability::Installable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(name: &str, download: &str, version: &str) -> String {
        to_pattern(&Project::new(name), &Build::new(download, version))
    }

    #[test]
    fn pattern_is_stable_across_versions() {
        let a = pattern("myapp", "myapp-v1.2.3-linux-armv7a-musl.tar.gz", "1.2.3");
        let b = pattern("myapp", "myapp-v1.2.4-linux-armv7a-musl.tar.gz", "1.2.4");
        assert_eq!(a, "{NAME}-{VER}-linux-armv7a-musl");
        assert_eq!(a, b);
    }

    #[test]
    fn github_release_url() {
        assert_eq!(
            pattern(
                "ripgrep",
                "https://github.com/BurntSushi/ripgrep/releases/download/14.1.0/ripgrep-14.1.0-x86_64-apple-darwin.tar.gz",
                "14.1.0",
            ),
            "{NAME}-{VER}-x86_64-apple-darwin"
        );
    }

    #[test]
    fn alternate_names_and_separators() {
        let project = Project::new("rip-grep").with_names(["rip-grep", "rg"]);
        let build = Build::new("rip_grep-1.0.0-linux.zip", "1.0.0");
        assert_eq!(to_pattern(&project, &build), "{NAME}-{VER}-linux");
        let build = Build::new("rg-1.0.0-linux.zip", "1.0.0");
        assert_eq!(to_pattern(&project, &build), "{NAME}-{VER}-linux");
    }

    #[test]
    fn cli_tags_and_raw_versions() {
        let mut build = Build::new("watchexec-1.20.3-aarch64-apple-darwin.tar.xz", "1.20.3");
        build.raw_version = Some("cli-v1.20.3".into());
        assert_eq!(
            to_pattern(&Project::new("watchexec"), &build),
            "{NAME}-{VER}-aarch64-apple-darwin"
        );
    }

    #[test]
    fn filename_overrides_opaque_download() {
        let mut build = Build::new("https://example.com/dl/8b1e6a0c", "2.0.0");
        build.filename = Some("tool-2.0.0-windows-amd64.exe".into());
        assert_eq!(
            to_pattern(&Project::new("tool"), &build),
            "{NAME}-{VER}-windows-amd64.exe"
        );
    }

    #[test]
    fn source_and_git_urls() {
        assert_eq!(
            pattern(
                "duckdns.sh",
                "https://codeload.github.com/acme/DuckDNS.sh/legacy.zip/refs/tags/v1.0.2",
                "1.0.2",
            ),
            "{NAME}/{VER}/legacy"
        );
        assert_eq!(
            pattern("vim-zig", "https://github.com/ziglang/zig.vim.git", "0.1.0"),
            "zig.vim.git"
        );
    }

    #[test]
    fn empty_version_is_left_alone() {
        assert_eq!(pattern("tool", "tool-linux-amd64", ""), "{NAME}-linux-amd64");
    }

    #[test]
    fn package_types() {
        assert_eq!(filename_to_package_type("myapp-v1.2.3-linux-armv7a-musl.tar.gz"), ".tar.gz");
        assert_eq!(filename_to_package_type("tool.app.zip"), ".app.zip");
        assert_eq!(filename_to_package_type("tool.exe"), ".exe");
        assert_eq!(filename_to_package_type("tool-x86_64.pkg.tar.zst"), ".pkg.tar.zst");
        assert_eq!(filename_to_package_type("tool-linux-amd64"), "");
    }

    #[test]
    fn triple_nesting_is_kept() {
        assert_eq!(filename_to_package_type("a.sh.pkg.tar.gz"), ".sh.pkg.tar.gz");
    }

    #[test]
    fn package_type_prefers_name() {
        let mut build = Build::new("https://example.com/download?id=3", "1.0.0");
        assert_eq!(build_to_package_type(&build), "");
        build.name = Some("tool.dmg".into());
        assert_eq!(build_to_package_type(&build), ".dmg");
    }

    #[test]
    fn not_builds() {
        let project = Project::new("tool");
        for download in [
            "tool-1.0.0-SHA256SUMS",
            "tool-1.0.0-linux.tar.gz.sig",
            "tool-1.0.0-linux-debug.tar.gz",
            "tool_src_1.0.0.tar.gz",
        ] {
            let verdict = installability(&project, &Build::new(download, "1.0.0"));
            assert!(
                matches!(verdict, Installability::NotABuild { .. }),
                "{download}: {verdict:?}"
            );
        }
        let nightly = installability(&project, &Build::new("tool-linux.tar.gz", "nightly"));
        assert!(!nightly.is_installable());
    }

    #[test]
    fn source_archives() {
        let project = Project::new("tool");
        let mut build = Build::new("https://example.com/tool-1.0.0.tar.gz", "1.0.0");
        build.name = Some("tool-1.0.0.tar.gz".into());
        assert_eq!(installability(&project, &build), Installability::SourceArchive);

        build.name = Some("tool-1.0.0-linux-amd64.tar.gz".into());
        assert!(installability(&project, &build).is_installable());
    }
}
