//! Lexical version keys for release catalogs.
//!
//! Release catalogs are full of versions that are not valid semver
//! (`1.2beta1`, `v0.9b3`, `1.991.1+hotfix2`). This crate turns each one into
//! a fixed-width key whose plain string order is the release order, then
//! answers prefix queries ("the newest 1.991.x, and what's around it") over
//! a sorted list of keys.
//!
//! # Example
//!
//! ```
//! use binpick_lexver::{parse_prefix, parse_version, select, sort_descending};
//!
//! let mut keys: Vec<_> = ["1.0.0", "1.1.0-rc1", "1.1.0", "1.2.0-beta1"]
//!     .iter()
//!     .map(|v| parse_version(v))
//!     .collect();
//! sort_descending(&mut keys);
//!
//! let bundle = select(&keys, &parse_prefix("1.1"));
//! assert_eq!(bundle.stable, Some(parse_version("1.1.0")));
//! assert_eq!(bundle.next, Some(parse_version("1.2.0-beta1")));
//! ```

pub mod codec;
pub mod select;

pub use codec::{parse_prefix, parse_version, LexPrefix, LexVer, CHANNELS};
pub use select::{select, sort_descending, sorted_to_tags, to_tags, Catalog, SelectionBundle, Tags};
