//! Exercise definitions: commands, solution sequences and scenarios.
//!
//! Exercises travel as JSON documents between the authoring layer and
//! the validator, so every type here round-trips through serde.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::KataError;
use crate::types::SkillLevel;

// ============================================================================
// GitCommand
// ============================================================================

/// One structured learner command.
///
/// `expected_output` documents intent for exercise authors; the validator
/// never compares against it. `validation_rules` is consumed by the
/// exercise layer, not by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommand {
    /// Command name, e.g. `commit`.
    pub name: String,
    /// Positional arguments as typed by the learner.
    pub args: Vec<String>,
    /// What the author expects this command to print.
    #[serde(default)]
    pub expected_output: String,
    /// Extra author-defined validation parameters.
    #[serde(default)]
    pub validation_rules: BTreeMap<String, String>,
}

impl GitCommand {
    /// Command with no expected output or rules.
    pub fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            expected_output: String::new(),
            validation_rules: BTreeMap::new(),
        }
    }

    /// Builder: the output the author expects.
    pub fn with_expected_output(mut self, output: impl Into<String>) -> Self {
        self.expected_output = output.into();
        self
    }

    /// Builder: add an author-defined validation rule.
    pub fn with_rule(mut self, rule: impl Into<String>, value: impl Into<String>) -> Self {
        self.validation_rules.insert(rule.into(), value.into());
        self
    }

    /// Argument-shape screen for the advanced commands.
    ///
    /// `rebase` passes with `--continue`, `--abort` or exactly one
    /// argument; `config` needs at least two arguments with the first
    /// prefixed `hooks.`. Every other command passes.
    pub fn validate_advanced_command(&self) -> bool {
        match self.name.as_str() {
            "rebase" => {
                self.args.iter().any(|arg| arg == "--continue")
                    || self.args.iter().any(|arg| arg == "--abort")
                    || self.args.len() == 1
            }
            "config" => self.args.len() >= 2 && self.args[0].starts_with("hooks."),
            _ => true,
        }
    }
}

// ============================================================================
// ExerciseId
// ============================================================================

/// A unique identifier for an exercise.
///
/// Exercise ids are UUIDs stored as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// Create an `ExerciseId` from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExerciseId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for ExerciseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// ComplexScenario
// ============================================================================

/// A staged multi-command situation with seeded conflicts.
///
/// The setup commands are replayed through the validator, the conflict
/// files are installed as markers, and the learner must resolve them and
/// reproduce the expected command sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexScenario {
    /// Scenario name.
    pub name: String,
    /// Commands replayed to build the starting state.
    pub setup_commands: Vec<GitCommand>,
    /// The command sequence a correct resolution uses.
    pub expected_resolution: Vec<GitCommand>,
    /// Path to the competing content versions seeded as conflicts.
    #[serde(default)]
    pub conflict_files: BTreeMap<String, Vec<String>>,
}

impl ComplexScenario {
    /// Whether `commands` matches the expected resolution pairwise by
    /// name and arguments, length included.
    pub fn matches_resolution(&self, commands: &[GitCommand]) -> bool {
        sequences_match(&self.expected_resolution, commands)
    }
}

// ============================================================================
// Exercise
// ============================================================================

/// A named exercise: metadata plus the command sequence that solves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Generated unique id.
    pub id: ExerciseId,
    /// Stable external identifier; defaults to the generated id.
    pub slug: String,
    /// Short name shown to learners and recorded as progress.
    pub name: String,
    /// What the exercise teaches.
    pub description: String,
    /// Target learner level.
    pub difficulty: SkillLevel,
    /// The command sequence that solves the exercise.
    #[serde(default)]
    pub commands: Vec<GitCommand>,
    /// Optional staged scenario with conflicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complex_scenario: Option<ComplexScenario>,
    /// Free-form labels for discovery.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Skills the exercise practices.
    #[serde(default)]
    pub skills: Vec<String>,
    /// Position within a learning path.
    #[serde(default)]
    pub order: u32,
}

impl Exercise {
    /// New exercise with a generated id; the slug defaults to the id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        difficulty: SkillLevel,
    ) -> Self {
        let id = ExerciseId::generate();
        Self {
            slug: id.as_str().to_string(),
            id,
            name: name.into(),
            description: description.into(),
            difficulty,
            commands: Vec::new(),
            complex_scenario: None,
            tags: Vec::new(),
            skills: Vec::new(),
            order: 0,
        }
    }

    /// Builder: stable external identifier.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Builder: the solution command sequence.
    pub fn with_commands(mut self, commands: Vec<GitCommand>) -> Self {
        self.commands = commands;
        self
    }

    /// Builder: attach a complex scenario.
    pub fn with_scenario(mut self, scenario: ComplexScenario) -> Self {
        self.complex_scenario = Some(scenario);
        self
    }

    /// Builder: position within a learning path.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Append a command to the solution sequence.
    pub fn add_command(&mut self, command: GitCommand) {
        self.commands.push(command);
    }

    /// Whether `commands` matches this exercise's solution sequence
    /// pairwise by name and arguments, length included.
    pub fn validate_sequence(&self, commands: &[GitCommand]) -> bool {
        sequences_match(&self.commands, commands)
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, KataError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, KataError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Pairwise comparison on command name and arguments only.
fn sequences_match(expected: &[GitCommand], got: &[GitCommand]) -> bool {
    expected.len() == got.len()
        && expected
            .iter()
            .zip(got)
            .all(|(want, have)| want.name == have.name && want.args == have.args)
}

// ============================================================================
// Tests
// ============================================================================
