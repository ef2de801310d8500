//! The file store the periodic index reads from.
//!
//! This module provides:
//! - [`NoteStore`], the collaborator interface the index scans through
//! - [`FsNoteStore`], a store backed by a vault directory on disk
//! - [`VaultWalker`], the directory walker used to list markdown files

pub mod store;
pub mod walker;

pub use store::{FsNoteStore, NoteStore, StoreError, VaultFile};
pub use walker::{VaultWalker, VaultWalkerError};
