//! YAML frontmatter extraction from markdown documents.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::Frontmatter;
