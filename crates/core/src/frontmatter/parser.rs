//! Frontmatter parsing from markdown documents.

use super::types::Frontmatter;
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// The raw YAML between the opening and closing `---` lines.
///
/// Returns `None` when the document does not start with a complete block.
fn yaml_block(content: &str) -> Option<&str> {
    let after_open = content.trim_start().strip_prefix("---")?;
    let yaml = after_open.strip_prefix('\n').or_else(|| after_open.strip_prefix("\r\n"))?;

    let mut offset = 0;
    for line in yaml.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(&yaml[..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parse the frontmatter of a markdown document, if it has one.
///
/// An empty block yields empty frontmatter rather than `None`.
pub fn parse(content: &str) -> Result<Option<Frontmatter>, FrontmatterParseError> {
    let Some(yaml) = yaml_block(content) else {
        return Ok(None);
    };
    if yaml.trim().is_empty() {
        return Ok(Some(Frontmatter::default()));
    }
    Ok(Some(serde_yaml::from_str(yaml)?))
}
