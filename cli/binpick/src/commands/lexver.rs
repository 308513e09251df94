//! `binpick lexver`: print version keys.

use anyhow::Result;
use binpick_lexver::{parse_prefix, parse_version};

/// `key<TAB>version` for each version.
pub fn report(versions: &[String], prefix: bool) -> String {
    let mut out = String::new();
    for version in versions {
        let key = if prefix {
            parse_prefix(version).to_string()
        } else {
            parse_version(version).to_string()
        };
        out.push_str(&format!("{key}\t{version}\n"));
    }
    out
}

pub fn run(versions: &[String], prefix: bool) -> Result<()> {
    print!("{}", report(versions, prefix));
    Ok(())
}
