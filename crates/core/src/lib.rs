//! Periodic note resolution for markdown vaults.

pub mod config;
pub mod frontmatter;
pub mod periodic;
pub mod vault;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
