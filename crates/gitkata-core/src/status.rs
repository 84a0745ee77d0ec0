//! Read-only status snapshots of the simulated repository.
//!
//! Outer layers never reach into repository internals; they read a
//! [`RepositoryStatus`] captured at a point in time and render or
//! serialize it as camelCase JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::VirtualRepository;
use crate::types::{ObjectHash, DEFAULT_BRANCH};

// ============================================================================
// HeadInfo
// ============================================================================

/// Metadata of the current branch tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadInfo {
    /// Tip commit id.
    pub id: ObjectHash,
    /// Tip commit message.
    pub message: String,
    /// Tip commit creation time.
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// RepositoryStatus
// ============================================================================

/// Point-in-time snapshot of a repository for read-only consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryStatus {
    /// Whether `init` has run.
    pub initialized: bool,
    /// Current branch name.
    pub current_branch: String,
    /// Tip of the current branch, absent while it is unborn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<HeadInfo>,
    /// Branch name to head id (`None` for unborn branches).
    pub branches: BTreeMap<String, Option<ObjectHash>>,
    /// Paths currently staged.
    pub staged_paths: Vec<String>,
    /// Paths in the working tree.
    pub working_paths: Vec<String>,
    /// Total commits in the store, across all branches.
    pub commit_count: usize,
    /// Paths carrying an unresolved conflict marker.
    pub conflicted_paths: Vec<String>,
}

impl RepositoryStatus {
    /// Status of a session with no repository bound yet.
    pub fn unbound() -> Self {
        Self {
            initialized: false,
            current_branch: DEFAULT_BRANCH.to_string(),
            head: None,
            branches: BTreeMap::new(),
            staged_paths: Vec::new(),
            working_paths: Vec::new(),
            commit_count: 0,
            conflicted_paths: Vec::new(),
        }
    }
}

impl VirtualRepository {
    /// Capture a serializable snapshot of the current state.
    pub fn status(&self) -> RepositoryStatus {
        let head = self
            .head()
            .and_then(|id| self.commits().get(id))
            .map(|commit| HeadInfo {
                id: commit.id.clone(),
                message: commit.message.clone(),
                timestamp: commit.timestamp,
            });

        RepositoryStatus {
            initialized: self.is_initialized(),
            current_branch: self.current_branch().to_string(),
            head,
            branches: self
                .branches()
                .iter()
                .map(|(name, branch)| (name.clone(), branch.head.clone()))
                .collect(),
            staged_paths: self.staging_area().keys().cloned().collect(),
            working_paths: self.working_tree().keys().cloned().collect(),
            commit_count: self.commits().len(),
            conflicted_paths: self.conflicted_paths().map(str::to_string).collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
