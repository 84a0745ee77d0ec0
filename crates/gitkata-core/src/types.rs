//! Core domain types for the simulated repository.
//!
//! ## Key Types
//!
//! - [`ObjectHash`] - SHA-1 identifier for file contents and commits
//! - [`WorkingFile`] - a file entry in the working tree or staging area
//! - [`Commit`] - an immutable entry in the append-only commit store
//! - [`Branch`] - a named pointer into the commit store
//! - [`HookKind`] - the accepted hook configuration slots
//! - [`SkillLevel`] - learner skill levels used by feedback and exercises

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::KataError;
use crate::hashing;

/// Name of the branch created by `init`.
pub const DEFAULT_BRANCH: &str = "main";

// ============================================================================
// ObjectHash
// ============================================================================

/// A SHA-1 hex digest identifying an object in the simulated repository.
///
/// The same type identifies both file contents and commits, like object
/// ids in the tooling this simulates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHash(String);

impl ObjectHash {
    /// Create an `ObjectHash` from an existing digest string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectHash {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for ObjectHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mapping from file path to content hash, as captured by a commit.
pub type Snapshot = BTreeMap<String, ObjectHash>;

// ============================================================================
// WorkingFile
// ============================================================================

/// A file in the working tree or the staging area.
///
/// The `staged` flag marks the working-tree entry; the staging area holds
/// a separate copy taken at staging time, so later edits to the working
/// tree do not change what the next commit records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingFile {
    /// Path relative to the workspace root.
    pub path: String,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Whether this entry has been staged since it was last written.
    pub staged: bool,
}

impl WorkingFile {
    /// New unstaged entry.
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            staged: false,
        }
    }

    /// Content hash of this entry's bytes.
    pub fn content_hash(&self) -> ObjectHash {
        hashing::hash_content(&self.content)
    }
}

// ============================================================================
// Commit
// ============================================================================

/// An immutable commit in the simulated repository.
///
/// Commits form chains through single `parent` links; merge and rebase
/// synthesize single-parent commits rather than true multi-parent ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Identifier derived from `(timestamp, message, parent)`.
    pub id: ObjectHash,
    /// Commit message as given by the learner.
    pub message: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Parent commit, absent for a root commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectHash>,
    /// Path to content hash for every file the commit captured.
    pub snapshot: Snapshot,
}

impl Commit {
    /// Create a commit, deriving its id from the metadata.
    pub fn new(
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        parent: Option<ObjectHash>,
        snapshot: Snapshot,
    ) -> Self {
        let message = message.into();
        let id = hashing::derive_commit_id(timestamp, &message, parent.as_ref());
        Self {
            id,
            message,
            timestamp,
            parent,
            snapshot,
        }
    }
}

// ============================================================================
// Branch
// ============================================================================

/// A named pointer into the commit store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch name.
    pub name: String,
    /// Tip commit, `None` while the branch has no commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<ObjectHash>,
}

impl Branch {
    /// Branch pointing at `head`.
    pub fn new(name: impl Into<String>, head: Option<ObjectHash>) -> Self {
        Self {
            name: name.into(),
            head,
        }
    }

    /// Branch with no commits yet.
    pub fn unborn(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// True while the branch has no commits.
    pub fn is_unborn(&self) -> bool {
        self.head.is_none()
    }
}

// ============================================================================
// HookKind
// ============================================================================

/// The hook slots the simulated repository accepts configuration for.
///
/// Configuration is an acceptance check plus storage; hook scripts are
/// never executed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum HookKind {
    PreCommit,
    PostCommit,
    PrePush,
    PostMerge,
}

impl HookKind {
    /// All accepted hook kinds.
    pub const ALL: [HookKind; 4] = [
        HookKind::PreCommit,
        HookKind::PostCommit,
        HookKind::PrePush,
        HookKind::PostMerge,
    ];

    /// The hyphenated name used in `config hooks.<name>` commands.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::PreCommit => "pre-commit",
            HookKind::PostCommit => "post-commit",
            HookKind::PrePush => "pre-push",
            HookKind::PostMerge => "post-merge",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = KataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre-commit" => Ok(HookKind::PreCommit),
            "post-commit" => Ok(HookKind::PostCommit),
            "pre-push" => Ok(HookKind::PrePush),
            "post-merge" => Ok(HookKind::PostMerge),
            other => Err(KataError::UnknownHook(other.to_string())),
        }
    }
}

// ============================================================================
// SkillLevel
// ============================================================================

/// Learner skill levels, used to shape feedback hints and tag exercises.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// The lowercase name used in exercise documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SkillLevel {
    type Err = KataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(SkillLevel::Beginner),
            "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            other => Err(KataError::InvalidArgument(format!(
                "unknown skill level `{other}`"
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // ----------------------------------------------------------------
    // ObjectHash
    // ----------------------------------------------------------------

    #[test]
    fn test_object_hash_roundtrip() {
        let hash = ObjectHash::new("abc123");
        assert_eq!(hash.as_str(), "abc123");
        assert_eq!(hash.to_string(), "abc123");

        let parsed: ObjectHash = "abc123".parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_object_hash_serde_transparent() {
        let hash = ObjectHash::new("deadbeef");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, r#""deadbeef""#);
    }

    // ----------------------------------------------------------------
    // WorkingFile and Commit
    // ----------------------------------------------------------------

    #[test]
    fn test_working_file_starts_unstaged() {
        let file = WorkingFile::new("readme.md", "hello");
        assert!(!file.staged);
        assert_eq!(
            file.content_hash().as_str(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
    }

    #[test]
    fn test_commit_new_derives_id() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let commit = Commit::new("first", at, None, Snapshot::new());
        assert_eq!(
            commit.id,
            crate::hashing::derive_commit_id(at, "first", None)
        );
    }

    #[test]
    fn test_commit_serde_camel_case() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut snapshot = Snapshot::new();
        snapshot.insert("a.txt".to_string(), ObjectHash::new("aa"));
        let commit = Commit::new("first", at, Some(ObjectHash::new("bb")), snapshot);

        let json = serde_json::to_string(&commit).unwrap();
        assert!(json.contains(r#""parent":"bb""#));
        assert!(json.contains(r#""snapshot":{"a.txt":"aa"}"#));

        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commit);
    }

    #[test]
    fn test_root_commit_omits_parent() {
        let commit = Commit::new("root", Utc::now(), None, Snapshot::new());
        let json = serde_json::to_string(&commit).unwrap();
        assert!(!json.contains("parent"));
    }

    // ----------------------------------------------------------------
    // Branch, HookKind, SkillLevel
    // ----------------------------------------------------------------

    #[test]
    fn test_branch_unborn() {
        let branch = Branch::unborn("main");
        assert!(branch.is_unborn());
        assert_eq!(branch.name, "main");
    }

    #[test]
    fn test_hook_kind_parse() {
        for kind in HookKind::ALL {
            let parsed: HookKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("pre-receive".parse::<HookKind>().is_err());
    }

    #[test]
    fn test_skill_level_parse_and_default() {
        assert_eq!(SkillLevel::default(), SkillLevel::Beginner);
        assert_eq!("advanced".parse::<SkillLevel>().unwrap(), SkillLevel::Advanced);
        assert!("expert".parse::<SkillLevel>().is_err());
    }
}
