//! Integration tests for the guided exercise flow.
//!
//! These tests drive a complete learner session through the validator:
//! binding a workspace, starting exercises, running commands and checking
//! the messages and progress records the surrounding application sees.
//!
//! # Test Strategy
//!
//! - Sessions run against in-memory workspaces unless the filesystem
//!   itself is under test
//! - Assertions check the exact learner-facing message strings, which
//!   exercise graders depend on
//! - Progress is observed through the tracker, never by reaching into
//!   validator internals

mod common;

use std::collections::HashMap;

use gitkata_core::{FeedbackProvider, SessionState, TemplateFeedback};

use common::{cmd, validator_with_files};

// ============================================================================
// Basic workflow
// ============================================================================

#[test]
fn test_full_basic_workflow() {
    let mut validator = validator_with_files(&[("readme.md", "# My Project")]);

    let outcome = validator.start_exercise("basic_git_workflow", "init_repo");
    assert!(outcome.passed);
    assert_eq!(outcome.message, "Started exercise: init_repo");

    let outcome = validator.validate(&cmd("init", &[])).unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.message, "Repository initialized successfully");

    let outcome = validator.validate(&cmd("add", &["readme.md"])).unwrap();
    assert!(outcome.passed);
    assert_eq!(outcome.message, "Files staged successfully");

    let outcome = validator
        .validate(&cmd("commit", &["-m", "Initial commit"]))
        .unwrap();
    assert!(outcome.passed);

    let repo = validator.repository().unwrap();
    let history = repo.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "Initial commit");
    assert_eq!(repo.branches()["main"].head, Some(history[0].id.clone()));
}

#[test]
fn test_exercise_progress_recorded_on_success() {
    let mut validator = validator_with_files(&[("readme.md", "hello")]);

    validator.start_exercise("basic_git_workflow", "init_repo");
    validator.validate(&cmd("init", &[])).unwrap();
    assert!(validator
        .tracker()
        .is_exercise_completed("basic_git_workflow", "init_repo"));

    validator.start_exercise("basic_git_workflow", "first_commit");
    validator.validate(&cmd("init", &[])).unwrap();
    validator.validate(&cmd("add", &["readme.md"])).unwrap();
    validator
        .validate(&cmd("commit", &["-m", "First commit"]))
        .unwrap();
    assert!(validator
        .tracker()
        .is_exercise_completed("basic_git_workflow", "first_commit"));
}

#[test]
fn test_starting_an_exercise_discards_previous_state() {
    let mut validator = validator_with_files(&[("readme.md", "hello")]);

    validator.start_exercise("basic_git_workflow", "init_repo");
    validator.validate(&cmd("init", &[])).unwrap();
    validator.validate(&cmd("add", &["readme.md"])).unwrap();
    validator
        .validate(&cmd("commit", &["-m", "Old work"]))
        .unwrap();

    validator.start_exercise("basic_git_workflow", "first_commit");
    let repo = validator.repository().unwrap();
    assert!(!repo.is_initialized());
    assert!(repo.commits().is_empty());
    assert_eq!(validator.state(), SessionState::Uninitialized);
}

// ============================================================================
// Precondition ordering
// ============================================================================

#[test]
fn test_commands_before_init_fail_with_contract_message() {
    let mut validator = validator_with_files(&[("readme.md", "hello")]);

    for command in [
        cmd("commit", &["-m", "x"]),
        cmd("add", &["readme.md"]),
        cmd("branch", &["dev"]),
        cmd("push", &["origin"]),
    ] {
        let outcome = validator.validate(&command).unwrap();
        assert!(!outcome.passed);
        assert_eq!(outcome.message, "Repository not initialized");
    }
}

#[test]
fn test_validation_without_workspace() {
    let mut validator = gitkata_core::CommandValidator::new();
    assert_eq!(validator.state(), SessionState::NoWorkspace);

    let outcome = validator.validate(&cmd("init", &[])).unwrap();
    assert!(!outcome.passed);
    assert_eq!(outcome.message, "No workspace is bound to this session.");
}

// ============================================================================
// Feedback integration
// ============================================================================

#[test]
fn test_empty_add_matches_feedback_catalog() {
    let mut validator = validator_with_files(&[]);
    validator.validate(&cmd("init", &[])).unwrap();

    let outcome = validator.validate(&cmd("add", &[])).unwrap();
    assert!(!outcome.passed);

    let mut fresh = TemplateFeedback::new();
    let expected = fresh.feedback("no_files_specified", &HashMap::new());
    assert_eq!(outcome.message, expected);
}

#[test]
fn test_repeated_mistake_reveals_hints() {
    let mut validator = validator_with_files(&[]);
    validator.validate(&cmd("init", &[])).unwrap();

    let first = validator.validate(&cmd("add", &[])).unwrap();
    assert!(!first.message.contains("Hints:"));

    let second = validator.validate(&cmd("add", &[])).unwrap();
    assert!(second.message.contains("Hints:"));
    assert!(second
        .message
        .contains("Use 'git add <filename>' to stage specific files"));
}

#[test]
fn test_unsupported_command_names_the_command() {
    let mut validator = validator_with_files(&[]);
    validator.validate(&cmd("init", &[])).unwrap();

    let outcome = validator.validate(&cmd("cherry-pick", &["abc"])).unwrap();
    assert!(!outcome.passed);
    assert_eq!(
        outcome.message,
        "The command 'cherry-pick' is not supported here."
    );
}

// ============================================================================
// Status snapshots
// ============================================================================

#[test]
fn test_status_follows_the_session() {
    let validator = gitkata_core::CommandValidator::new();
    assert!(!validator.status().initialized);
    assert_eq!(validator.status().current_branch, "main");

    let mut validator = validator_with_files(&[("a.txt", "one")]);
    validator.validate(&cmd("init", &[])).unwrap();
    validator.validate(&cmd("add", &["a.txt"])).unwrap();

    let status = validator.status();
    assert!(status.initialized);
    assert_eq!(status.staged_paths, vec!["a.txt".to_string()]);
    assert_eq!(status.commit_count, 0);

    validator
        .validate(&cmd("commit", &["-m", "First commit"]))
        .unwrap();
    let status = validator.status();
    assert_eq!(status.commit_count, 1);
    assert_eq!(status.head.unwrap().message, "First commit");
    assert!(status.staged_paths.is_empty());
}

#[test]
fn test_staged_content_is_frozen_at_staging_time() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "old content").unwrap();

    let workspace = gitkata_core::DiskWorkspace::create(dir.path()).unwrap();
    let mut validator = gitkata_core::CommandValidator::new();
    validator.set_workspace("disk-session", workspace);

    validator.validate(&cmd("init", &[])).unwrap();
    validator.validate(&cmd("add", &["a.txt"])).unwrap();

    // The workspace file changes after staging; the staged copy is what
    // the commit captures.
    std::fs::write(dir.path().join("a.txt"), "new content").unwrap();
    validator
        .validate(&cmd("commit", &["-m", "capture"]))
        .unwrap();

    let repo = validator.repository().unwrap();
    let head = repo.history()[0];
    assert_eq!(
        head.snapshot["a.txt"],
        gitkata_core::hash_content(b"old content")
    );
}
