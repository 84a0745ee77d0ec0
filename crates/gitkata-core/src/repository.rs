//! The simulated repository: a content-addressed commit/branch graph.
//!
//! [`VirtualRepository`] holds the complete mutable state of one learner
//! session: working tree, staging area, append-only commit store, branch
//! table and the current-branch pointer. Operations implement the
//! simplified semantics exercises are graded against, not real
//! version-control behavior; each method documents its simplifications.
//!
//! ## Key Types
//!
//! - [`VirtualRepository`] - state aggregate plus all repository operations
//! - [`MergeOutcome`] - how a merge advanced the current branch

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::errors::KataError;
use crate::types::{Branch, Commit, HookKind, ObjectHash, Snapshot, WorkingFile, DEFAULT_BRANCH};

// ============================================================================
// MergeOutcome
// ============================================================================

/// Result of a successful [`VirtualRepository::merge_branch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// The commit the current branch now points at.
    pub head: ObjectHash,
    /// True when the branch pointer advanced without a new commit object.
    pub fast_forward: bool,
}

// ============================================================================
// VirtualRepository
// ============================================================================

/// In-memory simulated repository for one learner session.
///
/// All fields are private: the commit store only grows, and every mutation
/// goes through an operation that upholds the documented invariants. Reads
/// go through the accessors or [`VirtualRepository::status`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRepository {
    initialized: bool,
    current_branch: String,
    working_tree: BTreeMap<String, WorkingFile>,
    staging_area: BTreeMap<String, WorkingFile>,
    commits: BTreeMap<ObjectHash, Commit>,
    branches: BTreeMap<String, Branch>,
    /// Hook scripts by kind. Stored only, never executed.
    hooks: BTreeMap<HookKind, String>,
    /// Conflict markers: path to competing content versions.
    conflicts: BTreeMap<String, Vec<String>>,
}

impl VirtualRepository {
    /// Create an empty, uninitialized repository.
    pub fn new() -> Self {
        Self {
            initialized: false,
            current_branch: DEFAULT_BRANCH.to_string(),
            working_tree: BTreeMap::new(),
            staging_area: BTreeMap::new(),
            commits: BTreeMap::new(),
            branches: BTreeMap::new(),
            hooks: BTreeMap::new(),
            conflicts: BTreeMap::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Name of the current branch. Defaults to `main` before `init`.
    pub fn current_branch(&self) -> &str {
        &self.current_branch
    }

    /// The working tree, keyed by path.
    pub fn working_tree(&self) -> &BTreeMap<String, WorkingFile> {
        &self.working_tree
    }

    /// The staging area, keyed by path.
    pub fn staging_area(&self) -> &BTreeMap<String, WorkingFile> {
        &self.staging_area
    }

    /// The commit store, keyed by commit id.
    pub fn commits(&self) -> &BTreeMap<ObjectHash, Commit> {
        &self.commits
    }

    /// The branch table, keyed by branch name.
    pub fn branches(&self) -> &BTreeMap<String, Branch> {
        &self.branches
    }

    /// Configured hook scripts.
    pub fn hooks(&self) -> &BTreeMap<HookKind, String> {
        &self.hooks
    }

    /// Head of the current branch, absent while the branch is unborn.
    pub fn head(&self) -> Option<&ObjectHash> {
        self.branches
            .get(&self.current_branch)
            .and_then(|branch| branch.head.as_ref())
    }

    // ------------------------------------------------------------------------
    // Repository operations
    // ------------------------------------------------------------------------

    /// Initialize the repository.
    ///
    /// Creates the unborn default branch and switches to it. The first
    /// call succeeds; repeated calls fail and change nothing.
    pub fn init(&mut self) -> Result<(), KataError> {
        if self.initialized {
            return Err(KataError::AlreadyInitialized);
        }
        self.branches
            .insert(DEFAULT_BRANCH.to_string(), Branch::unborn(DEFAULT_BRANCH));
        self.current_branch = DEFAULT_BRANCH.to_string();
        self.initialized = true;
        tracing::info!(branch = DEFAULT_BRANCH, "repository initialized");
        Ok(())
    }

    /// Add or replace a file in the working tree.
    ///
    /// Always succeeds and needs no initialization: writing into the
    /// working tree models editing files, which is possible before `init`.
    /// Re-adding a path replaces the entry with its staged flag cleared;
    /// a staging-area entry for the same path keeps the content captured
    /// when it was staged.
    pub fn add_file(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let path = path.into();
        tracing::debug!(path = %path, "working tree updated");
        self.working_tree
            .insert(path.clone(), WorkingFile::new(path, content));
    }

    /// Stage a working-tree file for the next commit.
    ///
    /// Marks the working-tree entry staged and copies it into the staging
    /// area. Any conflict marker on the path is cleared, which is how
    /// seeded conflicts get resolved.
    pub fn stage_file(&mut self, path: &str) -> Result<(), KataError> {
        if !self.initialized {
            return Err(KataError::NotInitialized);
        }
        let file = self
            .working_tree
            .get_mut(path)
            .ok_or_else(|| KataError::PathNotFound(path.to_string()))?;
        file.staged = true;
        let staged = file.clone();
        self.staging_area.insert(path.to_string(), staged);
        self.conflicts.remove(path);
        tracing::debug!(path = %path, "staged");
        Ok(())
    }

    /// Create a commit from the staging area.
    ///
    /// Atomic: on failure nothing changes. On success the snapshot maps
    /// each staged path to its content hash, the parent is the current
    /// branch head, the head advances to the new commit and the staging
    /// area empties. Staged flags in the working tree are left as they
    /// are.
    ///
    /// The commit id hashes only `(timestamp, message, parent)`; see
    /// [`crate::hashing::derive_commit_id`].
    pub fn commit(&mut self, message: &str) -> Result<ObjectHash, KataError> {
        if !self.initialized {
            return Err(KataError::NotInitialized);
        }
        if self.staging_area.is_empty() {
            return Err(KataError::NothingToCommit);
        }

        let snapshot: Snapshot = self
            .staging_area
            .iter()
            .map(|(path, file)| (path.clone(), file.content_hash()))
            .collect();

        let parent = self.head().cloned();
        let commit = Commit::new(message, Utc::now(), parent, snapshot);
        let id = commit.id.clone();

        self.commits.insert(id.clone(), commit);
        if let Some(branch) = self.branches.get_mut(&self.current_branch) {
            branch.head = Some(id.clone());
        }
        self.staging_area.clear();

        tracing::info!(commit = %id, branch = %self.current_branch, "created commit");
        Ok(id)
    }

    /// Create a branch at the current tip.
    ///
    /// The new branch starts at the current branch's head, including the
    /// unborn case where that head is still absent.
    pub fn create_branch(&mut self, name: &str) -> Result<(), KataError> {
        if !self.initialized {
            return Err(KataError::NotInitialized);
        }
        if self.branches.contains_key(name) {
            return Err(KataError::BranchExists(name.to_string()));
        }
        let head = self.head().cloned();
        self.branches.insert(name.to_string(), Branch::new(name, head));
        tracing::info!(branch = %name, "created branch");
        Ok(())
    }

    /// Switch the current branch pointer.
    ///
    /// Working tree and staging area are left untouched; this models only
    /// the pointer move, not a checkout of the target's snapshot.
    pub fn switch_branch(&mut self, name: &str) -> Result<(), KataError> {
        if !self.branches.contains_key(name) {
            return Err(KataError::BranchNotFound(name.to_string()));
        }
        self.current_branch = name.to_string();
        tracing::info!(branch = %name, "switched branch");
        Ok(())
    }

    /// Merge `source` into the current branch.
    ///
    /// When the current branch is unborn the pointer fast-forwards to the
    /// source head and no commit object is created. Otherwise exactly one
    /// single-parent commit is synthesized whose snapshot is the union of
    /// both tips, the source hash winning path collisions. Two-parent
    /// ancestry and content-level conflict detection are not modeled.
    pub fn merge_branch(&mut self, source: &str) -> Result<MergeOutcome, KataError> {
        let source_branch = self
            .branches
            .get(source)
            .ok_or_else(|| KataError::BranchNotFound(source.to_string()))?;
        if source == self.current_branch {
            return Err(KataError::MergeIntoSelf(source.to_string()));
        }
        let source_head = source_branch
            .head
            .clone()
            .ok_or_else(|| KataError::UnbornBranch(source.to_string()))?;

        match self.head().cloned() {
            None => {
                if let Some(branch) = self.branches.get_mut(&self.current_branch) {
                    branch.head = Some(source_head.clone());
                }
                tracing::info!(
                    source = %source,
                    branch = %self.current_branch,
                    head = %source_head,
                    "fast-forward merge"
                );
                Ok(MergeOutcome {
                    head: source_head,
                    fast_forward: true,
                })
            }
            Some(current_head) => {
                let mut snapshot = self.tip_snapshot(&current_head);
                for (path, hash) in self.tip_snapshot(&source_head) {
                    snapshot.insert(path, hash);
                }

                let message = format!(
                    "Merge branch '{}' into {}",
                    source, self.current_branch
                );
                let commit = Commit::new(message, Utc::now(), Some(current_head), snapshot);
                let id = commit.id.clone();
                self.commits.insert(id.clone(), commit);
                if let Some(branch) = self.branches.get_mut(&self.current_branch) {
                    branch.head = Some(id.clone());
                }

                tracing::info!(
                    source = %source,
                    branch = %self.current_branch,
                    commit = %id,
                    "merge commit"
                );
                Ok(MergeOutcome {
                    head: id,
                    fast_forward: false,
                })
            }
        }
    }

    /// Rebase the current branch onto `target`.
    ///
    /// Synthesizes exactly one commit parented on the target head whose
    /// snapshot is the union of both tips, the current branch winning
    /// path collisions, then moves the current head to it. Commits are
    /// not replayed individually; the original chain stays in the store.
    pub fn rebase(&mut self, target: &str) -> Result<ObjectHash, KataError> {
        let target_head = self
            .branches
            .get(target)
            .ok_or_else(|| KataError::BranchNotFound(target.to_string()))?
            .head
            .clone()
            .ok_or_else(|| KataError::UnbornBranch(target.to_string()))?;
        let current_head = self
            .head()
            .cloned()
            .ok_or_else(|| KataError::UnbornBranch(self.current_branch.clone()))?;

        let mut snapshot = self.tip_snapshot(&target_head);
        for (path, hash) in self.tip_snapshot(&current_head) {
            snapshot.insert(path, hash);
        }

        let message = format!("Rebase {} onto {}", self.current_branch, target);
        let commit = Commit::new(message, Utc::now(), Some(target_head), snapshot);
        let id = commit.id.clone();
        self.commits.insert(id.clone(), commit);
        if let Some(branch) = self.branches.get_mut(&self.current_branch) {
            branch.head = Some(id.clone());
        }

        tracing::info!(target = %target, branch = %self.current_branch, commit = %id, "rebased");
        Ok(id)
    }

    /// Record a hook script for one of the accepted hook kinds.
    ///
    /// Pure acceptance plus storage; nothing ever executes the script.
    pub fn configure_hook(&mut self, name: &str, script: &str) -> Result<HookKind, KataError> {
        if !self.initialized {
            return Err(KataError::NotInitialized);
        }
        let kind: HookKind = name.parse()?;
        self.hooks.insert(kind, script.to_string());
        tracing::info!(hook = %kind, "configured hook");
        Ok(kind)
    }

    /// Commits reachable from the current head, most recent first.
    ///
    /// Follows parent links until a root commit. Empty while the current
    /// branch is unborn or the repository has no branches yet.
    pub fn history(&self) -> Vec<&Commit> {
        let mut history = Vec::new();
        let mut cursor = self.head();
        while let Some(id) = cursor {
            match self.commits.get(id) {
                Some(commit) => {
                    history.push(commit);
                    cursor = commit.parent.as_ref();
                }
                None => break,
            }
        }
        history
    }

    // ------------------------------------------------------------------------
    // Conflict markers
    // ------------------------------------------------------------------------

    /// Record competing versions for a path, marking it conflicted.
    ///
    /// Exercise scenarios use this to seed a conflict for the learner to
    /// resolve; staging the path clears the marker.
    pub fn simulate_conflict(&mut self, path: impl Into<String>, versions: Vec<String>) {
        let path = path.into();
        tracing::debug!(path = %path, versions = versions.len(), "conflict marker set");
        self.conflicts.insert(path, versions);
    }

    /// True while any conflict marker remains.
    pub fn is_in_conflict(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Paths currently marked conflicted.
    pub fn conflicted_paths(&self) -> impl Iterator<Item = &str> {
        self.conflicts.keys().map(String::as_str)
    }

    /// Snapshot of the commit at `head`, empty if the id is unknown.
    fn tip_snapshot(&self, head: &ObjectHash) -> Snapshot {
        self.commits
            .get(head)
            .map(|commit| commit.snapshot.clone())
            .unwrap_or_default()
    }
}

impl Default for VirtualRepository {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
