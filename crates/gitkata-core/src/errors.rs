//! Error types for gitkata-core.

use thiserror::Error;

/// Domain-specific errors for simulated repository operations.
///
/// Expected domain failures are returned as values and converted by the
/// validator into learner-facing messages. Only the infrastructure
/// variants at the tail represent genuinely unexpected conditions.
#[derive(Error, Debug)]
pub enum KataError {
    // ========================================================================
    // State errors
    // ========================================================================
    /// An operation other than `init` ran before the repository was
    /// initialized.
    #[error("Repository not initialized")]
    NotInitialized,

    /// `init` ran on an already-initialized repository.
    #[error("Repository already initialized")]
    AlreadyInitialized,

    /// `commit` ran with an empty staging area.
    #[error("Nothing to commit: the staging area is empty")]
    NothingToCommit,

    /// A branch with this name already exists.
    #[error("Branch `{0}` already exists")]
    BranchExists(String),

    /// No branch with this name exists.
    #[error("Branch `{0}` does not exist")]
    BranchNotFound(String),

    /// The branch exists but has no commits yet.
    #[error("Branch `{0}` has no commits")]
    UnbornBranch(String),

    /// A branch cannot be merged into itself.
    #[error("Cannot merge branch `{0}` into itself")]
    MergeIntoSelf(String),

    // ========================================================================
    // Input errors
    // ========================================================================
    /// The named path is not in the working tree.
    #[error("Path `{0}` is not in the working tree")]
    PathNotFound(String),

    /// A caller-supplied value could not be interpreted.
    #[error("{0}")]
    InvalidArgument(String),

    // ========================================================================
    // Configuration errors
    // ========================================================================
    /// The hook name is not one of the accepted kinds.
    #[error(
        "Unknown hook `{0}`: accepted hooks are pre-commit, post-commit, pre-push and post-merge"
    )]
    UnknownHook(String),

    // ========================================================================
    // Infrastructure errors
    // ========================================================================
    /// A workspace file could not be read.
    #[error("Workspace read failed for `{path}`: {reason}")]
    WorkspaceIo {
        /// Path relative to the workspace root.
        path: String,
        /// Underlying failure description.
        reason: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            KataError::NotInitialized.to_string(),
            "Repository not initialized"
        );
        assert_eq!(
            KataError::AlreadyInitialized.to_string(),
            "Repository already initialized"
        );
        assert_eq!(
            KataError::BranchNotFound("dev".to_string()).to_string(),
            "Branch `dev` does not exist"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: KataError = io.into();
        assert!(matches!(err, KataError::Io(_)));
    }
}
