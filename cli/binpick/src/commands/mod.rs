//! CLI command implementations.

pub mod host;
pub mod lexver;
pub mod lint;
pub mod select;
pub mod triplet;
pub mod waterfall;
