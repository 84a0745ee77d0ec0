//! # gitkata-core
//!
//! **GitKata** - simulated repository engine for guided version-control
//! exercises.
//!
//! Learners type version-control commands against a simulated repository
//! rather than a real one, so command sequences can be graded without
//! side effects outside the session. This crate provides the repository
//! model, the command validation state machine, and the collaborator
//! seams (feedback, learning paths, workspace files) a surrounding
//! application plugs into.
//!
//! ## Main Types
//!
//! - [`CommandValidator`] - grades learner commands and owns the session
//! - [`VirtualRepository`] - the simulated commit/branch graph
//! - [`TemplateFeedback`] - learner feedback with progressive hints
//! - [`PathManager`] - learning-path catalog and progress tracking
//! - [`KataError`] - domain-specific error type
//!
//! ## Modules
//!
//! - [`errors`] - error types
//! - [`exercise`] - exercise definitions and command sequences
//! - [`feedback`] - feedback templates and hints
//! - [`hashing`] - content addressing
//! - [`paths`] - learning paths and progress
//! - [`repository`] - the simulated repository
//! - [`status`] - read-only status snapshots
//! - [`types`] - core domain types
//! - [`validator`] - the command validation state machine
//! - [`workspace`] - workspace file access
//!
//! ## Example
//!
//! ```
//! use gitkata_core::{CommandValidator, GitCommand, MemoryWorkspace};
//!
//! let mut validator = CommandValidator::new();
//! let workspace = MemoryWorkspace::new().with_file("notes.txt", "hello");
//! validator.set_workspace("demo", workspace);
//!
//! let outcome = validator.validate(&GitCommand::new("init", &[])).unwrap();
//! assert!(outcome.passed);
//!
//! let outcome = validator.validate(&GitCommand::new("add", &["notes.txt"])).unwrap();
//! assert!(outcome.passed);
//!
//! let outcome = validator
//!     .validate(&GitCommand::new("commit", &["-m", "First commit"]))
//!     .unwrap();
//! assert!(outcome.passed);
//! ```

pub mod errors;
pub mod exercise;
pub mod feedback;
pub mod hashing;
pub mod paths;
pub mod repository;
pub mod status;
pub mod types;
pub mod validator;
pub mod workspace;

// Re-export the most commonly used types at the crate root so callers
// can write `gitkata_core::CommandValidator` without the module path.
pub use errors::KataError;
pub use exercise::{ComplexScenario, Exercise, ExerciseId, GitCommand};
pub use feedback::{
    ErrorCategory, FeedbackProvider, FeedbackTemplate, TemplateFeedback, UNKNOWN_FEEDBACK,
};
pub use hashing::{derive_commit_id, hash_content};
pub use paths::{LearningPath, PathManager, PathTracker};
pub use repository::{MergeOutcome, VirtualRepository};
pub use status::{HeadInfo, RepositoryStatus};
pub use types::{
    Branch, Commit, HookKind, ObjectHash, SkillLevel, Snapshot, WorkingFile, DEFAULT_BRANCH,
};
pub use validator::{
    CommandKind, CommandShapeError, CommandValidator, SessionState, ValidationOutcome,
};
pub use workspace::{DiskWorkspace, MemoryWorkspace, WorkspaceFiles};
