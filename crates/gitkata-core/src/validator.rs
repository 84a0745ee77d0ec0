//! Command validation state machine for learner sessions.
//!
//! [`CommandValidator`] owns one learner's session: the bound workspace,
//! the simulated repository and the active exercise. It maps structured
//! commands onto repository operations, enforces precondition ordering,
//! produces pass/fail outcomes with learner-facing messages, and notifies
//! the learning-path tracker on success.
//!
//! ## Key Types
//!
//! - [`CommandValidator`] - session owner and dispatcher
//! - [`CommandKind`] - the closed set of understood commands
//! - [`ValidationOutcome`] - pass/fail plus learner message
//! - [`SessionState`] - observable session lifecycle

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::KataError;
use crate::exercise::{Exercise, GitCommand};
use crate::feedback::{FeedbackProvider, TemplateFeedback};
use crate::paths::{PathManager, PathTracker};
use crate::repository::VirtualRepository;
use crate::status::RepositoryStatus;
use crate::workspace::{DiskWorkspace, WorkspaceFiles};

// ============================================================================
// ValidationOutcome
// ============================================================================

/// Pass/fail produced by [`CommandValidator::validate`], with the message
/// shown to the learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    /// Whether the command succeeded.
    pub passed: bool,
    /// Learner-facing message.
    pub message: String,
}

impl ValidationOutcome {
    /// A passing outcome.
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    /// A failing outcome.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// Observable lifecycle of a validation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No repository bound yet; every command fails.
    NoWorkspace,
    /// Repository bound but not initialized; only `init` passes.
    Uninitialized,
    /// Repository initialized; all commands available.
    Ready,
}

// ============================================================================
// CommandKind
// ============================================================================

/// The closed set of commands the validator understands, with parsed
/// argument shapes.
///
/// Names outside the set parse to [`CommandKind::Unsupported`] instead of
/// failing a string lookup at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Init,
    Add { paths: Vec<String> },
    Commit { message: String },
    Branch { name: String },
    Merge { source: String },
    Checkout { name: String },
    Rebase { target: String },
    Config { hook: String, script: String },
    Unsupported { name: String },
}

/// Argument-shape failures detected while parsing a [`GitCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandShapeError {
    /// `add` was given no paths.
    NoFilesSpecified,
    /// `commit` arguments were not `-m <message>`.
    InvalidCommitFormat,
    /// `branch`, `merge` or `checkout` without a branch name.
    BranchNameMissing,
    /// `rebase` without a target branch.
    RebaseTargetMissing,
    /// `config` arguments were not `hooks.<name> <script>`.
    InvalidHookFormat,
}

impl CommandKind {
    /// Parse a structured command into the closed command set.
    pub fn parse(command: &GitCommand) -> Result<CommandKind, CommandShapeError> {
        match command.name.as_str() {
            "init" => Ok(CommandKind::Init),
            "add" => {
                if command.args.is_empty() {
                    return Err(CommandShapeError::NoFilesSpecified);
                }
                Ok(CommandKind::Add {
                    paths: command.args.clone(),
                })
            }
            "commit" => {
                if command.args.len() < 2 || command.args[0] != "-m" {
                    return Err(CommandShapeError::InvalidCommitFormat);
                }
                Ok(CommandKind::Commit {
                    message: command.args[1].clone(),
                })
            }
            "branch" => match command.args.first() {
                Some(name) => Ok(CommandKind::Branch { name: name.clone() }),
                None => Err(CommandShapeError::BranchNameMissing),
            },
            "merge" => match command.args.first() {
                Some(source) => Ok(CommandKind::Merge {
                    source: source.clone(),
                }),
                None => Err(CommandShapeError::BranchNameMissing),
            },
            "checkout" => match command.args.first() {
                Some(name) => Ok(CommandKind::Checkout { name: name.clone() }),
                None => Err(CommandShapeError::BranchNameMissing),
            },
            "rebase" => match command.args.first() {
                Some(target) => Ok(CommandKind::Rebase {
                    target: target.clone(),
                }),
                None => Err(CommandShapeError::RebaseTargetMissing),
            },
            "config" => {
                let (Some(key), Some(script)) =
                    (command.args.first(), command.args.get(1))
                else {
                    return Err(CommandShapeError::InvalidHookFormat);
                };
                if !key.starts_with("hooks.") {
                    return Err(CommandShapeError::InvalidHookFormat);
                }
                // Hook name is the segment after the first dot.
                let hook = key.split('.').nth(1).unwrap_or_default().to_string();
                Ok(CommandKind::Config {
                    hook,
                    script: script.clone(),
                })
            }
            other => Ok(CommandKind::Unsupported {
                name: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// CommandValidator
// ============================================================================

/// Drives one learner session: binds a workspace, owns the simulated
/// repository and grades commands.
pub struct CommandValidator {
    workspace_id: Option<String>,
    files: Option<Box<dyn WorkspaceFiles>>,
    repo: Option<VirtualRepository>,
    feedback: Box<dyn FeedbackProvider>,
    tracker: Box<dyn PathTracker>,
    current_path: Option<String>,
    current_exercise: Option<String>,
}

impl CommandValidator {
    /// Validator with the built-in feedback and path catalogs.
    pub fn new() -> Self {
        Self::with_providers(
            Box::new(TemplateFeedback::new()),
            Box::new(PathManager::new()),
        )
    }

    /// Validator with custom collaborator implementations.
    pub fn with_providers(
        feedback: Box<dyn FeedbackProvider>,
        tracker: Box<dyn PathTracker>,
    ) -> Self {
        Self {
            workspace_id: None,
            files: None,
            repo: None,
            feedback,
            tracker,
            current_path: None,
            current_exercise: None,
        }
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    /// Bind a workspace and create a fresh, uninitialized repository.
    ///
    /// Replaces any previously bound workspace and repository.
    pub fn set_workspace(&mut self, id: impl Into<String>, files: impl WorkspaceFiles + 'static) {
        let id = id.into();
        tracing::info!(workspace = %id, "workspace bound");
        self.workspace_id = Some(id);
        self.files = Some(Box::new(files));
        self.repo = Some(VirtualRepository::new());
    }

    /// Bind a directory on disk as the workspace, creating it if needed.
    ///
    /// The directory path doubles as the workspace identifier.
    pub fn set_disk_workspace(&mut self, root: impl Into<PathBuf>) -> Result<(), KataError> {
        let root = root.into();
        let workspace = DiskWorkspace::create(&root)?;
        self.set_workspace(root.to_string_lossy(), workspace);
        Ok(())
    }

    /// Begin an exercise, discarding any previous repository state.
    ///
    /// The repository is replaced wholesale so nothing leaks between
    /// exercises. Fails when the tracker does not know the path.
    pub fn start_exercise(&mut self, path: &str, exercise: &str) -> ValidationOutcome {
        if !self.tracker.start_path(path) {
            return ValidationOutcome::fail("Invalid learning path");
        }
        self.current_path = Some(path.to_string());
        self.current_exercise = Some(exercise.to_string());
        self.repo = Some(VirtualRepository::new());
        tracing::info!(path = %path, exercise = %exercise, "exercise started");
        ValidationOutcome::pass(format!("Started exercise: {exercise}"))
    }

    /// Observable session state.
    pub fn state(&self) -> SessionState {
        match &self.repo {
            None => SessionState::NoWorkspace,
            Some(repo) if !repo.is_initialized() => SessionState::Uninitialized,
            Some(_) => SessionState::Ready,
        }
    }

    /// The bound workspace identifier.
    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    /// The session's repository, present once a workspace or exercise
    /// created one.
    pub fn repository(&self) -> Option<&VirtualRepository> {
        self.repo.as_ref()
    }

    /// The active `(path, exercise)` pair.
    pub fn current_exercise(&self) -> Option<(&str, &str)> {
        match (&self.current_path, &self.current_exercise) {
            (Some(path), Some(exercise)) => Some((path.as_str(), exercise.as_str())),
            _ => None,
        }
    }

    /// The learning-path tracker, for progress reads.
    pub fn tracker(&self) -> &dyn PathTracker {
        self.tracker.as_ref()
    }

    /// Status snapshot of the session's repository.
    pub fn status(&self) -> RepositoryStatus {
        match &self.repo {
            Some(repo) => repo.status(),
            None => RepositoryStatus::unbound(),
        }
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Grade one command against the session's repository.
    ///
    /// Domain failures come back as failing outcomes; `Err` is reserved
    /// for collaborator infrastructure failures such as an unreadable
    /// workspace file. A passing outcome with an active exercise notifies
    /// the tracker.
    pub fn validate(&mut self, command: &GitCommand) -> Result<ValidationOutcome, KataError> {
        if self.repo.is_none() {
            let message = self
                .feedback
                .feedback("workspace_not_initialized", &HashMap::new());
            return Ok(ValidationOutcome::fail(message));
        }

        // Everything except init is gated on an initialized repository,
        // including unknown command names. The exact message is a contract
        // with exercise graders.
        let initialized = self
            .repo
            .as_ref()
            .is_some_and(VirtualRepository::is_initialized);
        if command.name != "init" && !initialized {
            tracing::warn!(command = %command.name, "rejected: repository not initialized");
            return Ok(ValidationOutcome::fail("Repository not initialized"));
        }

        let parsed = match CommandKind::parse(command) {
            Ok(parsed) => parsed,
            Err(shape) => return Ok(self.shape_failure(shape)),
        };

        let outcome = self.dispatch(parsed)?;

        if outcome.passed {
            if let (Some(path), Some(exercise)) =
                (self.current_path.clone(), self.current_exercise.clone())
            {
                self.tracker.complete_exercise(&path, &exercise);
            }
        }
        Ok(outcome)
    }

    fn shape_failure(&mut self, shape: CommandShapeError) -> ValidationOutcome {
        match shape {
            CommandShapeError::NoFilesSpecified => ValidationOutcome::fail(
                self.feedback.feedback("no_files_specified", &HashMap::new()),
            ),
            CommandShapeError::InvalidCommitFormat => ValidationOutcome::fail(
                self.feedback
                    .feedback("invalid_commit_format", &HashMap::new()),
            ),
            CommandShapeError::BranchNameMissing => {
                ValidationOutcome::fail("Branch name not specified")
            }
            CommandShapeError::RebaseTargetMissing => {
                ValidationOutcome::fail("Target branch name required for rebase")
            }
            CommandShapeError::InvalidHookFormat => {
                ValidationOutcome::fail("Invalid hook configuration format")
            }
        }
    }

    fn dispatch(&mut self, command: CommandKind) -> Result<ValidationOutcome, KataError> {
        match command {
            CommandKind::Init => Ok(self.run_init()),
            CommandKind::Add { paths } => self.run_add(&paths),
            CommandKind::Commit { message } => Ok(self.run_commit(&message)),
            CommandKind::Branch { name } => Ok(self.run_branch(&name)),
            CommandKind::Merge { source } => Ok(self.run_merge(&source)),
            CommandKind::Checkout { name } => Ok(self.run_checkout(&name)),
            CommandKind::Rebase { target } => Ok(self.run_rebase(&target)),
            CommandKind::Config { hook, script } => Ok(self.run_config(&hook, &script)),
            CommandKind::Unsupported { name } => {
                tracing::warn!(command = %name, "unsupported command");
                let mut context = HashMap::new();
                context.insert("command".to_string(), name);
                Ok(ValidationOutcome::fail(
                    self.feedback.feedback("unsupported_command", &context),
                ))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Command handlers
    // ------------------------------------------------------------------------

    fn run_init(&mut self) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.init(),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(()) => ValidationOutcome::pass("Repository initialized successfully"),
            Err(_) => ValidationOutcome::fail("Repository already initialized"),
        }
    }

    fn run_add(&mut self, paths: &[String]) -> Result<ValidationOutcome, KataError> {
        // Pull readable workspace files into the working tree first, then
        // stage everything named. Paths with no working-tree entry make
        // the whole command fail.
        if let (Some(files), Some(repo)) = (&self.files, &mut self.repo) {
            for path in paths {
                if files.exists(path) {
                    let bytes = files.read_bytes(path).map_err(|err| KataError::WorkspaceIo {
                        path: path.clone(),
                        reason: err.to_string(),
                    })?;
                    repo.add_file(path.clone(), bytes);
                }
            }
        }

        let Some(repo) = self.repo.as_mut() else {
            return Ok(ValidationOutcome::fail("Failed to stage files"));
        };
        let all_staged = paths.iter().all(|path| repo.stage_file(path).is_ok());
        Ok(if all_staged {
            ValidationOutcome::pass("Files staged successfully")
        } else {
            ValidationOutcome::fail("Failed to stage files")
        })
    }

    fn run_commit(&mut self, message: &str) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.commit(message),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(_) => {
                ValidationOutcome::pass(self.feedback.feedback("commit_success", &HashMap::new()))
            }
            Err(_) => {
                ValidationOutcome::fail(self.feedback.feedback("nothing_to_commit", &HashMap::new()))
            }
        }
    }

    fn run_branch(&mut self, name: &str) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.create_branch(name),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(()) => ValidationOutcome::pass(format!("Branch '{name}' created")),
            Err(_) => ValidationOutcome::fail("Failed to create branch"),
        }
    }

    fn run_merge(&mut self, source: &str) -> ValidationOutcome {
        let Some(repo) = self.repo.as_mut() else {
            return ValidationOutcome::fail(format!("Branch '{source}' does not exist"));
        };
        // Screened here as well as in the repository so the learner sees
        // the branch-specific message rather than the generic merge
        // failure.
        if !repo.branches().contains_key(source) {
            return ValidationOutcome::fail(format!("Branch '{source}' does not exist"));
        }
        match repo.merge_branch(source) {
            Ok(_) => ValidationOutcome::pass(format!(
                "Successfully merged '{}' into '{}'",
                source,
                repo.current_branch()
            )),
            Err(_) => ValidationOutcome::fail(
                "Merge failed - ensure branches have commits and no conflicts",
            ),
        }
    }

    fn run_checkout(&mut self, name: &str) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.switch_branch(name),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(()) => ValidationOutcome::pass(format!("Switched to branch '{name}'")),
            Err(_) => ValidationOutcome::fail(format!("Failed to switch to branch '{name}'")),
        }
    }

    fn run_rebase(&mut self, target: &str) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.rebase(target),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(_) => ValidationOutcome::pass(format!("Successfully rebased onto {target}")),
            Err(_) => {
                ValidationOutcome::fail("Rebase failed - ensure branches exist and have commits")
            }
        }
    }

    fn run_config(&mut self, hook: &str, script: &str) -> ValidationOutcome {
        let result = match self.repo.as_mut() {
            Some(repo) => repo.configure_hook(hook, script),
            None => Err(KataError::NotInitialized),
        };
        match result {
            Ok(_) => ValidationOutcome::pass(format!("Successfully configured {hook} hook")),
            Err(_) => ValidationOutcome::fail("Failed to configure hook"),
        }
    }

    // ------------------------------------------------------------------------
    // Complex scenarios
    // ------------------------------------------------------------------------

    /// Replay an exercise's scenario setup and seed its conflicts.
    pub fn setup_complex_scenario(
        &mut self,
        exercise: &Exercise,
    ) -> Result<ValidationOutcome, KataError> {
        let Some(scenario) = exercise.complex_scenario.clone() else {
            return Ok(ValidationOutcome::fail("No complex scenario defined"));
        };

        for command in &scenario.setup_commands {
            let outcome = self.validate(command)?;
            if !outcome.passed {
                tracing::warn!(
                    scenario = %scenario.name,
                    command = %command.name,
                    "scenario setup command failed"
                );
                return Ok(ValidationOutcome::fail("Failed to set up scenario"));
            }
        }

        if let Some(repo) = self.repo.as_mut() {
            for (path, versions) in scenario.conflict_files {
                repo.simulate_conflict(path, versions);
            }
        }
        Ok(ValidationOutcome::pass("Complex scenario set up successfully"))
    }

    /// Check a learner's resolution of an exercise's scenario.
    ///
    /// Fails while conflict markers remain, then compares the commands
    /// against the scenario's expected resolution.
    pub fn validate_scenario_resolution(
        &self,
        exercise: &Exercise,
        commands: &[GitCommand],
    ) -> ValidationOutcome {
        let Some(scenario) = &exercise.complex_scenario else {
            return ValidationOutcome::fail("No complex scenario to validate");
        };
        if self
            .repo
            .as_ref()
            .is_some_and(VirtualRepository::is_in_conflict)
        {
            return ValidationOutcome::fail("Conflicts not fully resolved");
        }
        if scenario.matches_resolution(commands) {
            ValidationOutcome::pass("Scenario resolved correctly")
        } else {
            ValidationOutcome::fail("Scenario not resolved as expected")
        }
    }

    // ------------------------------------------------------------------------
    // Hints
    // ------------------------------------------------------------------------

    /// Hint lines for an error key, resolved through the feedback
    /// provider.
    pub fn hints(&mut self, key: &str) -> Vec<String> {
        vec![self.feedback.feedback(key, &HashMap::new())]
    }
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
