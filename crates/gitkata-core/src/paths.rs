//! Learning paths and exercise progress tracking.
//!
//! A learning path is an ordered set of exercises behind optional
//! prerequisites with a completion bar. [`PathManager`] is the built-in
//! [`PathTracker`]; the validator only ever talks to the trait.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::exercise::Exercise;
use crate::types::SkillLevel;

// ============================================================================
// PathTracker
// ============================================================================

/// Progress tracking the validator reports into.
pub trait PathTracker: Send {
    /// Begin tracking progress for a named path. False for unknown paths.
    fn start_path(&mut self, path: &str) -> bool;

    /// Record an exercise as completed. True only when newly recorded.
    fn complete_exercise(&mut self, path: &str, exercise: &str) -> bool;

    /// Whether an exercise has been recorded as completed.
    fn is_exercise_completed(&self, path: &str, exercise: &str) -> bool;
}

// ============================================================================
// LearningPath
// ============================================================================

/// An ordered set of exercises behind optional prerequisites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    /// Stable path name, e.g. `basic_git_workflow`.
    pub name: String,
    /// What the path teaches.
    pub description: String,
    /// Target learner level.
    pub difficulty: SkillLevel,
    /// Names of paths that must be completed first.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Exercises in teaching order.
    pub exercises: Vec<Exercise>,
    /// Completed-exercise count required to finish the path.
    pub required_exercises: usize,
}

// ============================================================================
// PathManager
// ============================================================================

/// Built-in progress tracker with the beginner path catalog.
#[derive(Debug, Clone)]
pub struct PathManager {
    paths: BTreeMap<String, LearningPath>,
    progress: BTreeMap<String, Vec<String>>,
}

impl PathManager {
    /// Manager preloaded with the built-in paths.
    pub fn new() -> Self {
        let mut manager = Self::empty();
        manager.add_path(basic_git_workflow());
        manager.add_path(branching_basics());
        manager
    }

    /// Manager with no paths registered.
    pub fn empty() -> Self {
        Self {
            paths: BTreeMap::new(),
            progress: BTreeMap::new(),
        }
    }

    /// Register or replace a path under its name.
    pub fn add_path(&mut self, path: LearningPath) {
        self.paths.insert(path.name.clone(), path);
    }

    /// Look up a path by name.
    pub fn path(&self, name: &str) -> Option<&LearningPath> {
        self.paths.get(name)
    }

    /// Paths whose prerequisites are all in `completed`.
    pub fn available_paths(&self, completed: &[String]) -> Vec<&LearningPath> {
        self.paths
            .values()
            .filter(|path| {
                path.prerequisites
                    .iter()
                    .all(|needed| completed.iter().any(|done| done == needed))
            })
            .collect()
    }

    /// Whether a path has met its completion bar.
    pub fn is_path_completed(&self, name: &str) -> bool {
        let (Some(path), Some(progress)) = (self.paths.get(name), self.progress.get(name))
        else {
            return false;
        };
        progress.len() >= path.required_exercises
    }

    /// Names of exercises completed for a path, in completion order.
    pub fn exercise_progress(&self, name: &str) -> &[String] {
        self.progress.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PathTracker for PathManager {
    fn start_path(&mut self, path: &str) -> bool {
        if !self.paths.contains_key(path) {
            tracing::warn!(path = %path, "unknown learning path");
            return false;
        }
        self.progress.entry(path.to_string()).or_default();
        true
    }

    fn complete_exercise(&mut self, path: &str, exercise: &str) -> bool {
        if !self.paths.contains_key(path) {
            return false;
        }
        let progress = self.progress.entry(path.to_string()).or_default();
        if progress.iter().any(|done| done == exercise) {
            return false;
        }
        progress.push(exercise.to_string());
        tracing::info!(path = %path, exercise = %exercise, "exercise completed");
        true
    }

    fn is_exercise_completed(&self, path: &str, exercise: &str) -> bool {
        self.progress
            .get(path)
            .is_some_and(|progress| progress.iter().any(|done| done == exercise))
    }
}

// ============================================================================
// Built-in catalog
// ============================================================================

/// The introductory init/add/commit path.
fn basic_git_workflow() -> LearningPath {
    LearningPath {
        name: "basic_git_workflow".to_string(),
        description: "Learn the fundamental Git workflow with init, add, and commit"
            .to_string(),
        difficulty: SkillLevel::Beginner,
        prerequisites: Vec::new(),
        exercises: vec![
            Exercise::new(
                "init_repo",
                "Initialize your first Git repository",
                SkillLevel::Beginner,
            )
            .with_order(1),
            Exercise::new("first_commit", "Make your first commit", SkillLevel::Beginner)
                .with_order(2),
            Exercise::new(
                "view_history",
                "View your commit history",
                SkillLevel::Beginner,
            )
            .with_order(3),
        ],
        required_exercises: 3,
    }
}

/// The follow-up branching path.
fn branching_basics() -> LearningPath {
    LearningPath {
        name: "branching_basics".to_string(),
        description: "Learn how to work with branches in Git".to_string(),
        difficulty: SkillLevel::Beginner,
        prerequisites: vec!["basic_git_workflow".to_string()],
        exercises: vec![
            Exercise::new(
                "create_branch",
                "Create your first branch",
                SkillLevel::Beginner,
            )
            .with_order(1),
            Exercise::new(
                "switch_branch",
                "Switch between branches",
                SkillLevel::Beginner,
            )
            .with_order(2),
            Exercise::new(
                "merge_branch",
                "Merge your first branch",
                SkillLevel::Beginner,
            )
            .with_order(3),
        ],
        required_exercises: 3,
    }
}

// ============================================================================
// Tests
// ============================================================================
