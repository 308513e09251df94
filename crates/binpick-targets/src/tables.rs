//! Built-in term tables and compatibility waterfalls.
//!
//! Pure data. Anything here can be extended or overridden at runtime with a
//! TOML overlay (see [`crate::parse`]).

use std::collections::BTreeMap;

use crate::dictionary::{RuleAction, TermMap, TermRule};
use crate::fact::PlatformFact as Fact;
use crate::waterfall::{Confidence, Fallback, Waterfall, ANY_OS};

fn insert(map: &mut TermMap, terms: &[&str], fact: Fact) {
    for term in terms {
        map.insert(term.to_string(), fact.clone());
    }
}

// Apple
fn apple() -> Fact {
    Fact::none().os("darwin").vendor("apple").libc("none")
}

fn apple_x86_64() -> Fact {
    apple().arch("x86_64")
}

// Linux
fn linux() -> Fact {
    Fact::none().os("linux").vendor("unknown")
}

fn linux_armhf_gnu() -> Fact {
    Fact::none()
        .os("linux")
        .arch_one_of("armhf", &["armv7", "armv7a", "armhf"])
        .libc("gnu")
}

// Windows 10+
fn win_pc() -> Fact {
    Fact::none().os("windows").vendor("pc")
}

// musl builds are usually static, so either libc is a match
fn musl() -> Fact {
    Fact::none().libc_one_of("musl", &["musl", "none"])
}

/// Primary terms for release asset names, after tokenization (lowercase).
pub(crate) fn release_asset_terms() -> TermMap {
    let mut t = TermMap::new();

    // placeholders
    insert(
        &mut t,
        &[
            "{NAME}", "{os}", "{arch}", "{libc}", "{vendor}", "{ext}", "anyarch", "anyos",
        ],
        Fact::none(),
    );

    // channels
    for channel in ["stable", "preview", "lts", "beta", "dev", "debug"] {
        t.insert(channel.into(), Fact::none().channel(channel));
    }

    // OS
    insert(
        &mut t,
        &[
            "apple",
            "darwin",
            "darwin_10_12",
            "macos",
            "macos_10_10",
            "osx",
            "osx_10_6",
            "osx_10_8",
            "mac",
        ],
        apple(),
    );
    insert(&mut t, &["windows", "win"], win_pc());
    insert(&mut t, &["linux"], linux());
    insert(&mut t, &["aix"], Fact::none().os("aix"));
    insert(&mut t, &["dragonfly"], Fact::none().os("dragonfly"));
    insert(&mut t, &["freebsd", "freebsd_12"], Fact::none().os("freebsd"));
    insert(&mut t, &["openbsd"], Fact::none().os("openbsd"));
    insert(&mut t, &["netbsd"], Fact::none().os("netbsd"));
    insert(&mut t, &["plan9"], Fact::none().os("plan9"));
    insert(&mut t, &["illumos"], Fact::none().os("illumos"));
    insert(&mut t, &["sunos"], Fact::none().os("sunos"));
    insert(&mut t, &["solaris", "solaris_11"], Fact::none().os("solaris"));
    insert(
        &mut t,
        &["posix", "posix_2017"],
        Fact::none().os("posix_2017").arch("ANYARCH").vendor("unknown"),
    );
    insert(&mut t, &["wasi"], Fact::none().os("wasi").vendor("unknown"));

    // OS + arch
    insert(&mut t, &["windowsx86"], win_pc().arch("x86"));
    insert(&mut t, &["win64"], win_pc().arch("x86_64"));
    insert(&mut t, &["linux64"], linux().arch("x86_64"));
    insert(&mut t, &["linux32"], linux().arch("x86"));
    insert(&mut t, &["osx64", "universal", "all"], apple_x86_64());
    insert(&mut t, &["mac32"], apple().arch("x86"));
    insert(
        &mut t,
        &["m1"],
        Fact::none().os("darwin").vendor("apple").arch("aarch64"),
    );
    // ambiguous: the arch comes from the tiers if nothing better shows up
    insert(&mut t, &["win32"], win_pc());
    insert(&mut t, &["mac64"], apple());

    // arch
    insert(&mut t, &["x86_64", "x86_64_v1", "amd64", "amd64_v1", "x64", "64", "64bit"], Fact::none().arch("x86_64"));
    insert(&mut t, &["x86_64_v2", "amd64_v2"], Fact::none().arch("x86_64_v2"));
    insert(&mut t, &["x86_64_v3", "amd64_v3"], Fact::none().arch("x86_64_v3"));
    insert(&mut t, &["aarch64", "arm64"], Fact::none().arch("aarch64"));
    // armv[567](e|l|a|hf|kz): "a" is the best of v7, "hf" carried over from
    // v5/v6, "e"/"el" is old v5
    insert(&mut t, &["armv7a"], Fact::none().arch("armv7a"));
    insert(
        &mut t,
        &["armv7", "armv7l", "armv7h", "armv7hl", "arm32"],
        Fact::none().arch("armv7"),
    );
    // armv6hf runs on armv7 and armv6hf, not on armv6 or armv5
    insert(&mut t, &["armhf", "armv6hf"], Fact::none().arch("armhf"));
    insert(&mut t, &["armv6", "armv6l"], Fact::none().arch("armv6"));
    insert(&mut t, &["armv5", "armel"], Fact::none().arch("armel"));
    insert(
        &mut t,
        &["i386", "386", "i686", "686", "x86", "ia32", "32", "32bit"],
        Fact::none().arch("x86"),
    );
    for (terms, arch) in [
        (&["loong64"][..], "loong64"),
        (&["mips"], "mips"),
        (&["mipsel", "mipsle"], "mipsel"),
        (&["mips64"], "mips64"),
        (&["mips64el", "mips64le"], "mips64el"),
        (&["mipsr6"], "mipsr6"),
        (&["mipsr6el"], "mipsr6el"),
        (&["mips64r6"], "mips64r6"),
        (&["mips64r6el", "mips64r6le"], "mips64r6el"),
        (&["powerpc", "ppc"], "ppc"),
        (&["powerpc64", "ppc64"], "ppc64"),
        (&["powerpc64el", "powerpc64le", "ppc64el", "ppc64le"], "ppc64le"),
        (&["riscv64"], "riscv64"),
        (&["s390x"], "s390x"),
        (&["wasm", "wasm32"], "wasm32"),
    ] {
        insert(&mut t, terms, Fact::none().arch(arch));
    }

    // libc
    insert(&mut t, &["static"], Fact::none().libc_one_of("none", &["none", "musl"]));
    insert(&mut t, &["musl", "musleabihf", "musleabi"], musl());
    insert(
        &mut t,
        &["alpine"],
        linux().libc_one_of("musl", &["musl", "none"]),
    );
    insert(&mut t, &["gnu"], Fact::none().libc("gnu"));
    insert(&mut t, &["gnueabihf"], linux_armhf_gnu());
    insert(&mut t, &["eabihf"], Fact::none().os("linux").arch("armhf"));
    insert(&mut t, &["msvc"], win_pc().libc("msvc"));
    insert(&mut t, &["bionic", "none"], Fact::none());
    insert(
        &mut t,
        &["android"],
        Fact::none().os("linux").android(),
    );
    insert(
        &mut t,
        &["androideabi"],
        Fact::none()
            .os("linux")
            .arch_one_of("armv7", &["armv7", "armv7a"])
            .android(),
    );

    // vendors
    insert(&mut t, &["unknown"], Fact::none().vendor("unknown"));
    insert(&mut t, &["pc"], Fact::none().vendor("pc"));

    // extensions, last resort
    insert(&mut t, &["exe", "msi"], win_pc());
    insert(&mut t, &["app", "pkg"], apple());
    insert(&mut t, &["git"], Fact::none().os("ANYOS").arch("ANYARCH"));
    insert(&mut t, &["dmg", "sh", "arm", "js"], Fact::none());

    t
}

/// Fallback tiers for release asset names. These terms are ambiguous
/// ("win32-x86", "mac64-arm64") so their guesses only fill empty fields.
pub(crate) fn release_asset_tiers() -> Vec<TermMap> {
    let mut t = TermMap::new();

    insert(&mut t, &["windows", "exe", "msi"], win_pc().arch("x86_64"));
    insert(&mut t, &["win32"], win_pc().arch("x86"));
    insert(
        &mut t,
        &["macos", "mac64", "darwin", "app", "dmg", "pkg"],
        apple_x86_64(),
    );
    insert(&mut t, &["linux"], linux().arch("x86_64"));
    insert(&mut t, &["android"], Fact::none().arch("aarch64"));
    insert(&mut t, &["arm"], Fact::none().arch("armhf"));
    insert(&mut t, &["gnu"], win_pc());
    insert(
        &mut t,
        &["musleabihf"],
        Fact::none()
            .os("linux")
            .arch("armhf")
            .libc_one_of("musl", &["musl", "none"]),
    );
    insert(
        &mut t,
        &["musleabi"],
        Fact::none()
            .os("linux")
            .arch("armel")
            .libc_one_of("musl", &["musl", "none"]),
    );
    insert(
        &mut t,
        &["js"],
        Fact::none().os("wasi").arch("wasm32").vendor("unknown"),
    );

    vec![t]
}

pub(crate) fn release_asset_rules() -> Vec<TermRule> {
    vec![TermRule::new(
        "os-version",
        r"^(macos|darwin|osx|freebsd|solaris)_\d+(_\d+)?$",
        RuleAction::Rewrite("${1}".into()),
    )]
}

/// Terms from `uname -srm`-style user agents. Case-sensitive.
pub(crate) fn user_agent_terms() -> TermMap {
    let mut t = TermMap::new();

    // agents
    insert(
        &mut t,
        &[
            "webi",
            "curl",
            "Wget",
            "wget",
            "wget+curl",
            "curl+wget",
            "PowerShell",
            "PowerShell+curl",
            "unknown",
            "test",
        ],
        Fact::none(),
    );

    // OS
    insert(
        &mut t,
        &["Android"],
        Fact::none().vendor("unknown").android(),
    );
    insert(&mut t, &["Linux"], linux());
    insert(&mut t, &["Darwin"], Fact::none().os("darwin").vendor("apple"));
    insert(&mut t, &["Windows"], win_pc());
    insert(&mut t, &["MS"], Fact::none().os("windows"));
    for (term, os) in [
        ("DragonFly", "dragonfly"),
        ("NetBSD", "netbsd"),
        ("OpenBSD", "openbsd"),
        ("FreeBSD", "freebsd"),
        ("illumos", "illumos"),
    ] {
        insert(&mut t, &[term], Fact::none().os(os).vendor("unknown"));
    }
    insert(&mut t, &["SunOS"], Fact::none());

    // arch
    insert(&mut t, &["AMD64", "amd64", "x86_64"], Fact::none().arch("x86_64"));
    insert(&mut t, &["ARM64", "arm64", "aarch64"], Fact::none().arch("aarch64"));
    insert(&mut t, &["armv7l"], Fact::none().arch("armv7"));
    insert(&mut t, &["earmv6hf"], Fact::none().arch("armhf"));
    insert(&mut t, &["i86pc", "i386"], Fact::none().arch("x86"));
    insert(&mut t, &["arm", "evbarm"], Fact::none());

    // libc
    insert(&mut t, &["gnu", "GNU"], Fact::none().libc("gnu"));
    for libc in ["libc", "msvc", "bionic", "musl"] {
        insert(&mut t, &[libc], Fact::none().libc(libc));
    }

    t
}

pub(crate) fn user_agent_rules() -> Vec<TermRule> {
    vec![
        TermRule::new("version-only", r"^[\d.]+(-RELEASE)?$", RuleAction::Skip),
        // an android kernel build hash
        TermRule::new(
            "android-build",
            r"^ab[0-9A-Z]+$",
            RuleAction::Assert(Fact::none().android()),
        ),
        // ex: MINGW64_NT-10.0-19045 (git bash). Defers to Windows or MS.
        TermRule::new("mingw", r"MINGW", RuleAction::Fill(linux())),
        // el = enterprise linux, fc = fedora core, amzn = amazon
        TermRule::new(
            "distro-release",
            r"^(android|amzn|el|fc)\d+$",
            RuleAction::Rewrite("${1}".into()),
        ),
        // ex: 6.2.0-1014-aws => aws
        TermRule::new(
            "leading-version",
            r"^\d[\d.\-+_]+",
            RuleAction::Rewrite(String::new()),
        ),
        // ex: android12-qgki (qgki = Qualcomm generic kernel image)
        TermRule::new(
            "android-stem",
            r"^android",
            RuleAction::Assert(Fact::none().android()),
        ),
    ]
}

fn fallback(candidates: &[&str]) -> Fallback {
    Fallback {
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
        confidence: Confidence::Certain,
        note: None,
    }
}

fn uncertain(candidates: &[&str], note: &str) -> Fallback {
    Fallback {
        confidence: Confidence::Uncertain,
        note: Some(note.to_string()),
        ..fallback(candidates)
    }
}

fn table(entries: Vec<(&str, Fallback)>) -> BTreeMap<String, Fallback> {
    entries
        .into_iter()
        .map(|(key, fallback)| (key.to_string(), fallback))
        .collect()
}

/// Built-in compatibility waterfalls.
pub(crate) fn waterfall() -> Waterfall {
    let x86_64_v3 = || fallback(&["x86_64_v3", "x86_64_v2", "x86_64", "x86"]);
    let x86_64_v2 = || fallback(&["x86_64_v2", "x86_64", "x86"]);

    let mut arch = BTreeMap::new();
    arch.insert(
        "darwin".to_string(),
        table(vec![(
            "aarch64",
            uncertain(&["aarch64", "x86_64"], "x86_64 requires Rosetta 2"),
        )]),
    );
    arch.insert(
        "windows".to_string(),
        table(vec![
            ("aarch64", fallback(&["aarch64", "x86_64"])),
            ("x86_64_v3", x86_64_v3()),
            ("x86_64_v2", x86_64_v2()),
        ]),
    );
    arch.insert(
        "linux".to_string(),
        table(vec![
            (
                "aarch64",
                uncertain(
                    &["aarch64", "armv7a", "armv7", "armhf"],
                    "armhf binaries need the armhf libc installed",
                ),
            ),
            ("armv7a", fallback(&["armv7a", "armv7", "armhf"])),
            ("x86_64_v3", x86_64_v3()),
            ("x86_64_v2", x86_64_v2()),
        ]),
    );
    arch.insert(
        ANY_OS.to_string(),
        table(vec![
            ("x86_64_v3", fallback(&["x86_64_v3", "x86_64_v2", "x86_64"])),
            ("x86_64_v2", fallback(&["x86_64_v2", "x86_64"])),
            ("x86_64", fallback(&["x86_64", "x86"])),
            (
                "armv7",
                fallback(&["armv7a", "armv7", "armhf", "armv6", "armel", "armv5"]),
            ),
            ("armv6", fallback(&["armv6", "armel", "armv5"])),
            ("armv5", fallback(&["armv5", "armel"])),
        ]),
    );

    let mut libc = BTreeMap::new();
    libc.insert(
        ANY_OS.to_string(),
        table(vec![
            // prefer 'none', dynamic deps are a gamble
            ("gnu", fallback(&["none", "gnu"])),
            ("libc", fallback(&["none", "libc"])),
            (
                "musl",
                uncertain(&["none", "musl"], "assumes musl builds are statically linked"),
            ),
            // prefer 'msvc', its runtime install is automated
            (
                "msvc",
                uncertain(&["msvc", "none", "gnu"], "msvc on a foreign arch is untested"),
            ),
            // prefer 'bionic', it's built in
            (
                "bionic",
                uncertain(&["bionic", "none"], "static linux builds on android are untested"),
            ),
        ]),
    );

    Waterfall { arch, libc }
}
