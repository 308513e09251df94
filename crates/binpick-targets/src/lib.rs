//! Target triplet resolution for release assets and user agents.
//!
//! Release asset names and `uname`-style user agents are tokenized into
//! terms, and each term is looked up in a dictionary of partial platform
//! facts. The facts are merged into one triplet:
//!
//! - **os**: `linux`, `darwin`, `windows`, `android`, `freebsd`, ...
//! - **arch**: `x86_64`, `aarch64`, `armv7`, `armhf`, ...
//! - **vendor**: `unknown`, `apple`, `pc`
//! - **libc**: `gnu`, `musl`, `msvc`, `bionic`, `none`
//!
//! Two terms that disagree are an error. A host that can't find an exact
//! match can walk the compatibility [`Waterfall`].
//!
//! ```
//! use binpick_targets::{resolve_build, Build, Project};
//!
//! let build = Build::new("myapp-v1.2.3-linux-armv7a-musl.tar.gz", "1.2.3");
//! let resolution = resolve_build(&Project::new("myapp"), &build).unwrap();
//! assert_eq!(resolution.triplet.to_string(), "armv7a-unknown-linux-musl");
//! ```

pub mod dictionary;
pub mod error;
pub mod fact;
pub mod parse;
pub mod pattern;
pub mod record;
pub mod resolve;
mod tables;
pub mod tokenize;
pub mod triplet;
pub mod waterfall;

pub use dictionary::{RuleAction, TermClass, TermDictionary, TermMap, TermRule};
pub use error::{Result, TargetError};
pub use fact::{Field, FieldMatch, PlatformFact};
pub use pattern::{
    build_to_package_type, filename_to_package_type, installability, to_pattern, Installability,
};
pub use record::{Build, Project};
pub use resolve::Resolver;
pub use tokenize::{pattern_to_terms, tokenize, user_agent_terms};
pub use triplet::{HostTarget, Resolution, TargetTriplet};
pub use waterfall::{Confidence, Fallback, Waterfall, ANY_OS};

/// Resolve a build against the built-in release asset dictionary.
pub fn resolve_build(project: &Project, build: &Build) -> Result<Resolution> {
    let terms = tokenize(project, build);
    Resolver::new(TermDictionary::release_assets()).resolve(project, build, &terms)
}

/// Resolve a user agent against the built-in user agent dictionary.
pub fn resolve_user_agent(ua: &str) -> Result<HostTarget> {
    Resolver::new(TermDictionary::user_agents()).resolve_host(&user_agent_terms(ua))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_to_substitutes() {
        let host = resolve_user_agent("curl/8.4.0 Linux/6.1.21-v8+ aarch64 GNU/Linux")
            .and_then(HostTarget::into_triplet)
            .unwrap();
        assert_eq!(host.to_string(), "aarch64-unknown-linux-gnu");

        let arches: Vec<String> = Waterfall::builtin()
            .substitutes(&host)
            .into_iter()
            .filter(|t| t.libc == "none")
            .map(|t| t.arch)
            .collect();
        assert_eq!(arches, vec!["aarch64", "armv7a", "armv7", "armhf"]);
    }

    #[test]
    fn pick_an_asset_for_a_host() {
        let project = Project::new("myapp");
        let assets = [
            "myapp-1.0.0-SHA256SUMS",
            "myapp-1.0.0-darwin-universal.tar.gz",
            "myapp-1.0.0-linux-armv7.tar.gz",
            "myapp-1.0.0-linux-x86_64-musl.tar.gz",
            "myapp-1.0.0-windows-amd64.zip",
        ];
        let builds: Vec<(Build, TargetTriplet)> = assets
            .iter()
            .map(|download| Build::new(*download, "1.0.0"))
            .filter(|build| installability(&project, build).is_installable())
            .map(|build| {
                let triplet = resolve_build(&project, &build).unwrap().triplet;
                (build, triplet)
            })
            .collect();
        assert_eq!(builds.len(), 4);

        let host = TargetTriplet::new("linux", "aarch64", "unknown", "gnu");
        let pick = Waterfall::builtin()
            .first_available(&host, |t| builds.iter().any(|(_, b)| b.same_platform(t)))
            .unwrap();
        assert_eq!(pick.arch, "armv7");
        assert_eq!(pick.libc, "none");
    }
}
