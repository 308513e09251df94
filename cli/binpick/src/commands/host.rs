//! `binpick host`: resolve a user agent.

use anyhow::{Context, Result};
use binpick_targets::{user_agent_terms, HostTarget, Resolver};

use crate::tables::Tables;

pub fn resolve(tables: &Tables, user_agent: &str) -> Result<HostTarget> {
    let terms = user_agent_terms(user_agent);
    let host = Resolver::new(&tables.agents)
        .resolve_host(&terms)
        .with_context(|| format!("resolving '{user_agent}'"))?;
    Ok(host)
}

pub fn report(tables: &Tables, user_agent: &str) -> Result<String> {
    let host = resolve(tables, user_agent)?;
    let mut out = String::new();
    for (label, value) in [
        ("os", &host.os),
        ("arch", &host.arch),
        ("vendor", &host.vendor),
        ("libc", &host.libc),
    ] {
        out.push_str(&format!("{label:<8}{}\n", value.as_deref().unwrap_or("-")));
    }
    if !host.unknown_terms.is_empty() {
        out.push_str(&format!("{:<8}{}\n", "unknown", host.unknown_terms.join(" ")));
    }

    let triplet = host.into_triplet()?;
    out.push_str(&format!("{:<8}{triplet}\n", "target"));
    Ok(out)
}

pub fn run(tables: &Tables, user_agent: &str) -> Result<()> {
    print!("{}", report(tables, user_agent)?);
    Ok(())
}
