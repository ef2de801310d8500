//! File store collaborator.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::walker::{VaultWalker, VaultWalkerError, relative_to_vault_path};
use crate::frontmatter::{self, Frontmatter, FrontmatterParseError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Walker(#[from] VaultWalkerError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterParseError,
    },
}

/// A markdown file in the store, identified by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VaultFile {
    /// `/`-separated path relative to the vault root.
    pub path: String,
    /// Size in bytes; zero for freshly created notes.
    pub size: u64,
}

impl VaultFile {
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self { path: path.into(), size }
    }

    /// Filename without directory and extension.
    pub fn basename(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        name.rsplit_once('.').map_or(name, |(stem, _)| stem)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Read access to the notes the index classifies.
pub trait NoteStore {
    /// All markdown files currently in the store.
    fn list_files(&self) -> Result<Vec<VaultFile>, StoreError>;

    /// Frontmatter of `file`, or `None` when it has none.
    fn read_frontmatter(&self, file: &VaultFile) -> Result<Option<Frontmatter>, StoreError>;
}

/// A store backed by a vault directory.
#[derive(Debug, Clone)]
pub struct FsNoteStore {
    walker: VaultWalker,
}

impl FsNoteStore {
    pub fn open(root: &Path, excluded_folders: Vec<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self { walker: VaultWalker::with_exclusions(root, excluded_folders)? })
    }

    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Absolute location of a vault-relative path.
    pub fn absolute_path(&self, vault_path: &str) -> PathBuf {
        self.root().join(vault_path)
    }

    /// Describe a file on disk as a [`VaultFile`], if it is inside the vault.
    pub fn vault_file(&self, absolute: &Path) -> Option<VaultFile> {
        let relative = absolute.strip_prefix(self.root()).ok()?;
        let path = relative_to_vault_path(relative);
        let size = fs::metadata(absolute).map(|m| m.len()).unwrap_or(0);
        Some(VaultFile::new(path, size))
    }
}

impl NoteStore for FsNoteStore {
    fn list_files(&self) -> Result<Vec<VaultFile>, StoreError> {
        Ok(self.walker.walk()?)
    }

    fn read_frontmatter(&self, file: &VaultFile) -> Result<Option<Frontmatter>, StoreError> {
        let content = fs::read_to_string(self.absolute_path(&file.path))
            .map_err(|source| StoreError::Read { path: file.path.clone(), source })?;
        frontmatter::parse(&content)
            .map_err(|source| StoreError::Frontmatter { path: file.path.clone(), source })
    }
}
