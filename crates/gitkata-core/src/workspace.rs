//! Workspace file access for learner sessions.
//!
//! The only blocking boundary in this crate is reading a file's bytes
//! while handling `add`. [`WorkspaceFiles`] isolates it, so the validator
//! can run against real directories with [`DiskWorkspace`] or entirely in
//! memory with [`MemoryWorkspace`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::KataError;

// ============================================================================
// WorkspaceFiles
// ============================================================================

/// Read access to the learner's workspace files.
///
/// Paths are relative to the workspace root. Ordinary absence is reported
/// through `exists`; a `read_bytes` failure is treated as an
/// infrastructure fault, not a learner mistake.
pub trait WorkspaceFiles: Send + Sync {
    /// Whether a regular file exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Read the raw bytes of the file at `path`.
    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>>;
}

// ============================================================================
// DiskWorkspace
// ============================================================================

/// Workspace files on the real filesystem, rooted at a directory.
#[derive(Debug, Clone)]
pub struct DiskWorkspace {
    root: PathBuf,
}

impl DiskWorkspace {
    /// Open a workspace rooted at `root`, creating the directory if it
    /// does not exist yet.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, KataError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "workspace directory ready");
        Ok(Self { root })
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WorkspaceFiles for DiskWorkspace {
    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        Ok(fs::read(self.root.join(path))?)
    }
}

// ============================================================================
// MemoryWorkspace
// ============================================================================

/// In-memory workspace files for tests and disk-free embedding.
///
/// # Example
///
/// ```
/// use gitkata_core::workspace::{MemoryWorkspace, WorkspaceFiles};
///
/// let workspace = MemoryWorkspace::new().with_file("notes.txt", "hello");
/// assert!(workspace.exists("notes.txt"));
/// assert!(!workspace.exists("missing.txt"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryWorkspace {
    /// Empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file, builder style.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// Insert or replace a file.
    pub fn put(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }
}

impl WorkspaceFiles for MemoryWorkspace {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such workspace file: {path}"))
    }
}

// ============================================================================
// Tests
// ============================================================================
