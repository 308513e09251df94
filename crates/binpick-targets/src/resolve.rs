//! Resolving terms into a target triplet.
//!
//! Resolution runs in passes over the terms:
//!
//! 1. the build record's os/arch/vendor/libc hints seed the fields
//! 2. every known term writes empty fields and is checked against set ones;
//!    a libc of `none` from an earlier term gives way to a more specific
//!    libc the later term prefers (`static` then `musl` is musl)
//! 3. fill-only terms (`MINGW64_NT-10.0`) write fields still empty
//! 4. android builds are normalized onto os `android`, libc `bionic`
//! 5. the dictionary's tiers fill whatever is still empty, never conflicting
//! 6. vendor and libc get defaults, os and arch are required

use crate::dictionary::{TermClass, TermDictionary};
use crate::error::{Result, TargetError};
use crate::fact::{Field, PlatformFact};
use crate::record::{Build, Project};
use crate::triplet::{HostTarget, Resolution, TargetTriplet, DEFAULT_LIBC, DEFAULT_VENDOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Set fields must accept the fact.
    Strict,
    /// Only empty fields are written.
    FillOnly,
}

/// Who is being resolved, for error messages.
struct Subject<'a> {
    name: String,
    terms: &'a [String],
}

impl Subject<'_> {
    fn conflict(&self, field: Field, existing: &str, proposed: &str, term: &str) -> TargetError {
        TargetError::Conflict {
            subject: self.name.clone(),
            field,
            existing: existing.to_string(),
            proposed: proposed.to_string(),
            term: term.to_string(),
            terms: self.terms.to_vec(),
        }
    }

    fn missing(&self, field: Field) -> TargetError {
        TargetError::MissingField {
            subject: self.name.clone(),
            field,
            terms: self.terms.to_vec(),
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    os: Option<String>,
    arch: Option<String>,
    vendor: Option<String>,
    libc: Option<String>,
    hinted_vendor: bool,
    hinted_libc: bool,
    android: bool,
    channel: Option<String>,
    unknown_terms: Vec<String>,
}

impl Draft {
    fn seeded(build: &Build) -> Self {
        let hint = |field| build.hint(field).map(str::to_string);
        Draft {
            os: hint(Field::Os),
            arch: hint(Field::Arch),
            vendor: hint(Field::Vendor),
            libc: hint(Field::Libc),
            hinted_vendor: build.hint(Field::Vendor).is_some(),
            hinted_libc: build.hint(Field::Libc).is_some(),
            ..Default::default()
        }
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Os => &mut self.os,
            Field::Arch => &mut self.arch,
            Field::Vendor => &mut self.vendor,
            Field::Libc => &mut self.libc,
        }
    }

    fn is_complete(&self) -> bool {
        self.os.is_some() && self.arch.is_some() && self.vendor.is_some() && self.libc.is_some()
    }

    fn apply(&mut self, term: &str, fact: &PlatformFact, mode: Mode, subject: &Subject<'_>) -> Result<()> {
        // vendor spellings in file names are noise unless the caller named one
        let hinted_vendor = self.hinted_vendor;
        let hinted_libc = self.hinted_libc;
        for field in Field::ALL {
            let Some(m) = fact.field(field) else {
                continue;
            };
            let check = mode == Mode::Strict && (field != Field::Vendor || hinted_vendor);
            let slot = self.slot(field);
            if let Some(existing) = slot.as_deref() {
                if check && !m.accepts(existing) {
                    return Err(subject.conflict(field, existing, m.preferred(), term));
                }
                let refine = check
                    && field == Field::Libc
                    && !hinted_libc
                    && existing == DEFAULT_LIBC
                    && m.preferred() != DEFAULT_LIBC;
                if refine {
                    *slot = Some(m.preferred().to_string());
                }
                continue;
            }
            if mode == Mode::FillOnly {
                tracing::debug!(term, %field, value = m.preferred(), "filled from tier");
            }
            *slot = Some(m.preferred().to_string());
        }

        if mode == Mode::Strict {
            self.android |= fact.android;
            if let Some(channel) = &fact.channel {
                self.channel.get_or_insert_with(|| channel.clone());
            }
        }
        Ok(())
    }

    fn primary_pass(&mut self, dictionary: &TermDictionary, subject: &Subject<'_>) -> Result<()> {
        for term in subject.terms {
            match dictionary.classify(term) {
                TermClass::Fact(fact) => self.apply(term, fact, Mode::Strict, subject)?,
                TermClass::Fill(_) | TermClass::Ignored => {}
                TermClass::Unknown(stem) => {
                    tracing::debug!(term = %term, stem = %stem, "unknown term");
                    self.unknown_terms.push(stem);
                }
            }
        }
        Ok(())
    }

    fn fill_pass(&mut self, dictionary: &TermDictionary, subject: &Subject<'_>) -> Result<()> {
        for term in subject.terms {
            if let TermClass::Fill(fact) = dictionary.classify(term) {
                self.apply(term, fact, Mode::FillOnly, subject)?;
            }
        }
        Ok(())
    }

    fn normalize_android(&mut self, subject: &Subject<'_>) -> Result<()> {
        if !self.android && self.os.as_deref() != Some("android") {
            return Ok(());
        }
        self.android = true;

        match self.os.as_deref() {
            None | Some("linux") | Some("android") => self.os = Some("android".into()),
            Some(other) => return Err(subject.conflict(Field::Os, other, "android", "android")),
        }
        match self.libc.as_deref() {
            None | Some("gnu") | Some("bionic") => self.libc = Some("bionic".into()),
            Some(other) => return Err(subject.conflict(Field::Libc, other, "bionic", "android")),
        }
        Ok(())
    }

    fn tier_pass(&mut self, dictionary: &TermDictionary, subject: &Subject<'_>) -> Result<()> {
        for tier in dictionary.tiers() {
            for term in subject.terms {
                if self.is_complete() {
                    return Ok(());
                }
                if let Some(fact) = tier.get(term) {
                    self.apply(term, fact, Mode::FillOnly, subject)?;
                }
            }
        }
        Ok(())
    }
}

/// Resolves terms against one dictionary.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'d> {
    dictionary: &'d TermDictionary,
}

impl<'d> Resolver<'d> {
    pub fn new(dictionary: &'d TermDictionary) -> Self {
        Resolver { dictionary }
    }

    /// Resolve the terms of one build.
    ///
    /// Fails with [`TargetError::Conflict`] when two terms (or a term and a
    /// hint) disagree, and with [`TargetError::MissingField`] when os or arch
    /// can't be determined.
    pub fn resolve(&self, project: &Project, build: &Build, terms: &[String]) -> Result<Resolution> {
        let subject = Subject {
            name: build.subject(project),
            terms,
        };
        let mut draft = Draft::seeded(build);
        draft.primary_pass(self.dictionary, &subject)?;
        draft.fill_pass(self.dictionary, &subject)?;
        draft.normalize_android(&subject)?;
        draft.tier_pass(self.dictionary, &subject)?;

        let os = draft.os.as_deref().ok_or_else(|| subject.missing(Field::Os))?;
        let arch = draft.arch.as_deref().ok_or_else(|| subject.missing(Field::Arch))?;
        let triplet = TargetTriplet::new(
            os,
            arch,
            draft.vendor.as_deref().unwrap_or(DEFAULT_VENDOR),
            draft.libc.as_deref().unwrap_or(DEFAULT_LIBC),
        );

        Ok(Resolution {
            triplet,
            channel: draft.channel,
            unknown_terms: draft.unknown_terms,
        })
    }

    /// Resolve the terms of a user agent. Nothing is defaulted or required;
    /// see [`HostTarget::into_triplet`].
    pub fn resolve_host(&self, terms: &[String]) -> Result<HostTarget> {
        let subject = Subject {
            name: "user agent".into(),
            terms,
        };
        let mut draft = Draft::default();
        draft.primary_pass(self.dictionary, &subject)?;
        draft.fill_pass(self.dictionary, &subject)?;
        draft.normalize_android(&subject)?;

        Ok(HostTarget {
            os: draft.os,
            arch: draft.arch,
            vendor: draft.vendor,
            libc: draft.libc,
            android: draft.android,
            unknown_terms: draft.unknown_terms,
            terms: terms.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{tokenize, user_agent_terms};

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn assets() -> Resolver<'static> {
        Resolver::new(TermDictionary::release_assets())
    }

    fn agents() -> Resolver<'static> {
        Resolver::new(TermDictionary::user_agents())
    }

    fn resolve(list: &[&str]) -> Result<Resolution> {
        assets().resolve(&Project::new("tool"), &Build::new("tool.tar.gz", "1.0.0"), &terms(list))
    }

    fn triplet(list: &[&str]) -> String {
        resolve(list).unwrap().triplet.to_string()
    }

    #[test]
    fn two_oses_conflict() {
        match resolve(&["windows", "linux"]) {
            Err(TargetError::Conflict {
                field,
                existing,
                proposed,
                term,
                terms,
                ..
            }) => {
                assert_eq!(field, Field::Os);
                assert_eq!(existing, "windows");
                assert_eq!(proposed, "linux");
                assert_eq!(term, "linux");
                assert_eq!(terms, vec!["windows", "linux"]);
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn end_to_end_musl_asset() {
        let project = Project::new("myapp");
        let build = Build::new("myapp-v1.2.3-linux-armv7a-musl.tar.gz", "1.2.3");
        let terms = tokenize(&project, &build);
        let resolution = assets().resolve(&project, &build, &terms).unwrap();
        assert_eq!(
            resolution.triplet,
            TargetTriplet::new("linux", "armv7a", "unknown", "musl")
        );
        assert!(resolution.unknown_terms.is_empty());
    }

    #[test]
    fn tiers_fill_ambiguous_terms() {
        assert_eq!(triplet(&["{NAME}", "linux"]), "x86_64-unknown-linux-none");
        assert_eq!(triplet(&["{NAME}", "windows"]), "x86_64-pc-windows-none");
        assert_eq!(triplet(&["{NAME}", "win32"]), "x86-pc-windows-none");
        assert_eq!(triplet(&["{NAME}", "macos", "arm64"]), "aarch64-apple-darwin-none");
        assert_eq!(triplet(&["{NAME}", "js"]), "wasm32-unknown-wasi-none");
        assert_eq!(triplet(&["{NAME}", "linux", "64bit"]), "x86_64-unknown-linux-none");
        assert_eq!(triplet(&["{NAME}", "windows", "32bit"]), "x86-pc-windows-none");
    }

    #[test]
    fn accepted_alternatives_dont_conflict() {
        // gnueabihf accepts an explicit armv7
        assert_eq!(triplet(&["linux", "armv7", "gnueabihf"]), "armv7-unknown-linux-gnu");
        // a musl build is also a static build
        assert_eq!(triplet(&["linux", "x86_64", "musl", "static"]), "x86_64-unknown-linux-musl");
        assert!(resolve(&["linux", "x86_64", "gnu", "musl"]).is_err());
    }

    #[test]
    fn static_musl_in_either_order() {
        let project = Project::new("myapp");
        for download in [
            "myapp-1.0.0-linux-x86_64-musl-static.tar.gz",
            "myapp-1.0.0-linux-x86_64-static-musl.tar.gz",
        ] {
            let build = Build::new(download, "1.0.0");
            let terms = tokenize(&project, &build);
            let resolution = assets().resolve(&project, &build, &terms).unwrap();
            assert_eq!(resolution.triplet.to_string(), "x86_64-unknown-linux-musl", "{download}");
        }
        assert_eq!(triplet(&["static", "linux", "x86_64"]), "x86_64-unknown-linux-none");
        assert!(resolve(&["static", "gnu", "linux", "x86_64"]).is_err());
    }

    #[test]
    fn libc_hint_is_not_refined() {
        let mut build = Build::new("tool-linux-x86_64-musl", "1.0.0");
        build.libc = Some("none".into());
        let r = assets()
            .resolve(&Project::new("tool"), &build, &terms(&["linux", "x86_64", "musl"]))
            .unwrap();
        assert_eq!(r.triplet.libc, "none");
    }

    #[test]
    fn vendor_is_only_checked_against_hints() {
        assert_eq!(triplet(&["linux", "x86_64", "pc"]), "x86_64-unknown-linux-none");

        let mut build = Build::new("tool-linux-x86_64.tar.gz", "1.0.0");
        build.vendor = Some("unknown".into());
        let err = assets()
            .resolve(&Project::new("tool"), &build, &terms(&["linux", "x86_64", "pc"]))
            .unwrap_err();
        assert!(matches!(err, TargetError::Conflict { field: Field::Vendor, .. }));
    }

    #[test]
    fn hints_seed_and_are_authoritative() {
        let mut build = Build::new("tool-static", "1.0.0");
        build.os = Some("linux".into());
        build.arch = Some("riscv64".into());
        let project = Project::new("tool");
        let r = assets().resolve(&project, &build, &terms(&["{NAME}", "static"])).unwrap();
        assert_eq!(r.triplet.to_string(), "riscv64-unknown-linux-none");

        let err = assets()
            .resolve(&project, &build, &terms(&["darwin"]))
            .unwrap_err();
        assert!(err.to_string().contains("tool tool-static"), "{err}");
    }

    #[test]
    fn android_assets() {
        let r = resolve(&["{NAME}", "aarch64", "linux", "android"]).unwrap();
        assert_eq!(r.triplet.to_string(), "aarch64-unknown-android-bionic");
        assert!(r.triplet.android);

        // gnu is rewritten, other libcs are not
        assert_eq!(triplet(&["android", "arm64", "gnu"]), "aarch64-unknown-android-bionic");
        assert!(resolve(&["android", "arm64", "musl"]).is_err());
        assert!(resolve(&["android", "windows"]).is_err());

        // android alone falls back to aarch64
        assert_eq!(triplet(&["android"]), "aarch64-unknown-android-bionic");
        assert_eq!(triplet(&["androideabi"]), "armv7-unknown-android-bionic");
    }

    #[test]
    fn missing_arch() {
        let err = resolve(&["{NAME}", "freebsd"]).unwrap_err();
        match err {
            TargetError::MissingField { field, terms, .. } => {
                assert_eq!(field, Field::Arch);
                assert_eq!(terms, vec!["{NAME}", "freebsd"]);
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
        assert!(matches!(
            resolve(&["x86_64"]),
            Err(TargetError::MissingField { field: Field::Os, .. })
        ));
    }

    #[test]
    fn channel_and_unknown_terms() {
        let r = resolve(&["{NAME}", "linux", "amd64", "lts", "installer"]).unwrap();
        assert_eq!(r.channel.as_deref(), Some("lts"));
        assert_eq!(r.unknown_terms, vec!["installer"]);
    }

    #[test]
    fn android_build_hash_alone() {
        let host = agents().resolve_host(&terms(&["ab1234ABCD"])).unwrap();
        assert_eq!(host.os.as_deref(), Some("android"));
        assert_eq!(host.libc.as_deref(), Some("bionic"));
        assert!(host.android);
        assert!(host.arch.is_none());
    }

    #[test]
    fn user_agents() {
        let host = |ua: &str| {
            agents()
                .resolve_host(&user_agent_terms(ua))
                .and_then(HostTarget::into_triplet)
                .map(|t| t.to_string())
        };
        assert_eq!(
            host("curl/8.4.0 Linux/6.2.0-1014-aws x86_64 GNU/Linux").unwrap(),
            "x86_64-unknown-linux-gnu"
        );
        assert_eq!(
            host("curl/8.1.2 Darwin/23.1.0 arm64").unwrap(),
            "aarch64-apple-darwin-none"
        );
        assert_eq!(
            host("PowerShell/7.4 Windows/10.0.22631 AMD64 msvc").unwrap(),
            "x86_64-pc-windows-msvc"
        );
        assert_eq!(
            host("curl/8.4.0 Linux/5.10.177-android12-9-00001-ab1234ABCD aarch64 Android").unwrap(),
            "aarch64-unknown-android-bionic"
        );
        assert_eq!(
            host("curl/7.81 FreeBSD/13.2-RELEASE amd64").unwrap(),
            "x86_64-unknown-freebsd-none"
        );
        assert!(host("curl/8.4.0").is_err());
    }

    #[test]
    fn mingw_defers_to_windows() {
        let host = |ua: &str| agents().resolve_host(&user_agent_terms(ua)).unwrap();

        let git_bash = host("curl/8.4.0 MINGW64_NT-10.0-19045 x86_64");
        assert_eq!(git_bash.os.as_deref(), Some("linux"));
        assert_eq!(git_bash.vendor.as_deref(), Some("unknown"));

        for ua in [
            "curl/8.4.0 MINGW64_NT-10.0-19045 x86_64 Windows",
            "curl/8.4.0 Windows MINGW64_NT-10.0-19045 x86_64",
        ] {
            let host = host(ua);
            assert_eq!(host.os.as_deref(), Some("windows"), "{ua}");
            assert_eq!(host.vendor.as_deref(), Some("pc"), "{ua}");
        }
        assert_eq!(host("MINGW64_NT-10.0 MS").os.as_deref(), Some("windows"));
    }

    #[test]
    fn user_agent_unknown_stems() {
        let host = agents()
            .resolve_host(&user_agent_terms("curl/8.4.0 Linux/6.2.0-1014-aws x86_64 fc39"))
            .unwrap();
        assert_eq!(host.os.as_deref(), Some("linux"));
        assert_eq!(host.unknown_terms, vec!["aws", "fc"]);
    }
}
