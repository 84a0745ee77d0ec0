//! Learner feedback templates and progressive hints.
//!
//! Failure paths in the validator resolve through a [`FeedbackProvider`].
//! The built-in [`TemplateFeedback`] turns error keys into messages, adds
//! hints progressively as the same mistake repeats, and can shape hints
//! to the learner's skill level.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::SkillLevel;

/// Message returned for keys with no registered template.
pub const UNKNOWN_FEEDBACK: &str = "An unknown error occurred.";

// ============================================================================
// ErrorCategory
// ============================================================================

/// Broad classification of a feedback template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Workflow,
    Conceptual,
    Configuration,
    Input,
    Success,
}

// ============================================================================
// FeedbackTemplate
// ============================================================================

/// A message template with hints and optional worked examples.
///
/// Messages may carry `{placeholder}` slots filled from a context map at
/// rendering time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackTemplate {
    /// Lookup key, e.g. `no_files_specified`.
    pub key: String,
    /// Classification used by reporting layers.
    pub category: ErrorCategory,
    /// Message body with optional `{placeholder}` slots.
    pub message: String,
    /// Hints revealed progressively across repeated attempts.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Worked examples keyed by command name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, String>,
}

impl FeedbackTemplate {
    /// Template with no hints or examples.
    pub fn new(
        key: impl Into<String>,
        category: ErrorCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            category,
            message: message.into(),
            hints: Vec::new(),
            examples: BTreeMap::new(),
        }
    }

    /// Builder: hints in reveal order.
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: add a worked example for a command.
    pub fn with_example(mut self, command: impl Into<String>, example: impl Into<String>) -> Self {
        self.examples.insert(command.into(), example.into());
        self
    }

    /// Render the message, filling `{placeholder}` slots from `context`.
    ///
    /// A missing placeholder renders as an error string rather than
    /// failing, so a half-filled context still produces output.
    pub fn format_message(&self, context: &HashMap<String, String>) -> String {
        render_template(&self.message, context)
            .unwrap_or_else(|key| format!("Error: Missing context parameter: '{key}'"))
    }

    /// The first `attempt` hints, capped at the hint count.
    pub fn hints_for_attempt(&self, attempt: usize) -> &[String] {
        let shown = self.hints.len().min(attempt);
        &self.hints[..shown]
    }
}

/// Fill `{name}` slots in `template` from `context`.
///
/// Returns the missing placeholder name on a lookup failure. A `{` with
/// no closing brace is kept literally.
fn render_template(
    template: &str,
    context: &HashMap<String, String>,
) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start + 1..].find('}') {
            Some(len) => {
                let name = &rest[start + 1..start + 1 + len];
                match context.get(name) {
                    Some(value) => out.push_str(value),
                    None => return Err(name.to_string()),
                }
                rest = &rest[start + 1 + len + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                return Ok(out);
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

// ============================================================================
// FeedbackProvider
// ============================================================================

/// Turns an error key into a learner-facing message.
///
/// Implementations may keep per-key state; the built-in provider counts
/// attempts so that hints appear once a mistake repeats.
pub trait FeedbackProvider: Send {
    /// Message for `key`, rendered with `context`.
    fn feedback(&mut self, key: &str, context: &HashMap<String, String>) -> String;
}

// ============================================================================
// TemplateFeedback
// ============================================================================

/// Template-backed feedback with progressive hints.
#[derive(Debug, Clone)]
pub struct TemplateFeedback {
    templates: HashMap<String, FeedbackTemplate>,
    attempt_count: HashMap<String, usize>,
}

impl TemplateFeedback {
    /// Provider loaded with the built-in template catalog.
    pub fn new() -> Self {
        let mut provider = Self::empty();
        for template in builtin_templates() {
            provider.register(template);
        }
        provider
    }

    /// Provider with no templates registered.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            attempt_count: HashMap::new(),
        }
    }

    /// Register or replace a template under its key.
    pub fn register(&mut self, template: FeedbackTemplate) {
        self.templates.insert(template.key.clone(), template);
    }

    /// Look up a template by key.
    pub fn template(&self, key: &str) -> Option<&FeedbackTemplate> {
        self.templates.get(key)
    }

    /// Attempts recorded for `key` so far.
    pub fn attempts(&self, key: &str) -> usize {
        self.attempt_count.get(key).copied().unwrap_or(0)
    }

    /// Reset the attempt counter for `key`, or all counters with `None`.
    pub fn reset_attempts(&mut self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.attempt_count.remove(key);
            }
            None => self.attempt_count.clear(),
        }
    }

    /// Message for `key` shaped by skill level, with an explicit attempt
    /// count instead of the internal counter.
    ///
    /// Beginners see every hint, intermediate learners skip the first
    /// when there are several, advanced learners get only the last.
    /// Hints still appear one per attempt past the first, and a worked
    /// example is appended after more than two attempts.
    pub fn feedback_with_context(
        &self,
        key: &str,
        skill: SkillLevel,
        attempt: usize,
        context: &HashMap<String, String>,
    ) -> String {
        let Some(template) = self.templates.get(key) else {
            return UNKNOWN_FEEDBACK.to_string();
        };
        let mut message = template.format_message(context);

        let hints: &[String] = match skill {
            SkillLevel::Beginner => &template.hints,
            SkillLevel::Intermediate => {
                if template.hints.len() > 1 {
                    &template.hints[1..]
                } else {
                    &template.hints
                }
            }
            SkillLevel::Advanced => {
                let count = template.hints.len();
                &template.hints[count.saturating_sub(1)..]
            }
        };

        if attempt > 1 {
            let shown = &hints[..hints.len().min(attempt)];
            message = append_hints(message, shown);
        }

        if attempt > 2 {
            if let Some(example) = template.examples.values().next() {
                message.push_str("\n\nExample:\n");
                message.push_str(example);
            }
        }
        message
    }
}

impl Default for TemplateFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackProvider for TemplateFeedback {
    fn feedback(&mut self, key: &str, context: &HashMap<String, String>) -> String {
        let Some(template) = self.templates.get(key) else {
            tracing::debug!(key = %key, "no feedback template");
            return UNKNOWN_FEEDBACK.to_string();
        };

        // The invalid-command template names the offending command;
        // default the slot so a bare lookup still renders.
        let message = if template.key == "invalid_command" && !context.contains_key("command") {
            let mut context = context.clone();
            context.insert("command".to_string(), "unknown".to_string());
            match render_template(&template.message, &context) {
                Ok(message) => message,
                Err(missing) => {
                    return format!("Error: Missing required context parameter: '{missing}'")
                }
            }
        } else {
            match render_template(&template.message, context) {
                Ok(message) => message,
                Err(missing) => {
                    return format!("Error: Missing required context parameter: '{missing}'")
                }
            }
        };

        let attempt = {
            let count = self.attempt_count.entry(key.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if attempt > 1 {
            append_hints(message, template.hints_for_attempt(attempt))
        } else {
            message
        }
    }
}

fn append_hints(message: String, hints: &[String]) -> String {
    // The header appears from the second attempt even when there are no
    // hints to list under it.
    let lines: Vec<String> = hints.iter().map(|hint| format!("- {hint}")).collect();
    format!("{message}\n\nHints:\n{}", lines.join("\n"))
}

// ============================================================================
// Built-in catalog
// ============================================================================

/// The built-in feedback catalog the validator relies on.
fn builtin_templates() -> Vec<FeedbackTemplate> {
    vec![
        FeedbackTemplate::new(
            "invalid_command",
            ErrorCategory::Syntax,
            "The command '{command}' is not valid.",
        )
        .with_hints([
            "Check the command spelling",
            "Use 'git help' to see available commands",
        ]),
        FeedbackTemplate::new(
            "uninitialized_repo",
            ErrorCategory::Workflow,
            "You need to initialize a repository first.",
        )
        .with_hints([
            "Use 'git init' to create a new repository",
            "Make sure you're in the right directory",
        ])
        .with_example("init", "git init"),
        FeedbackTemplate::new(
            "no_files_specified",
            ErrorCategory::Syntax,
            "No files specified for staging.",
        )
        .with_hints([
            "Use 'git add <filename>' to stage specific files",
            "Use 'git add .' to stage all changes",
            "Use 'git status' to see which files can be staged",
        ])
        .with_example("add", "git add example.txt"),
        FeedbackTemplate::new(
            "files_staged_success",
            ErrorCategory::Workflow,
            "Files staged successfully.",
        )
        .with_hints([
            "Next, commit your changes using 'git commit -m \"your message\"'",
            "Use 'git status' to verify staged changes",
        ])
        .with_example("commit", "git commit -m \"Add new feature\""),
        FeedbackTemplate::new(
            "invalid_commit_format",
            ErrorCategory::Syntax,
            "Invalid commit message format.",
        )
        .with_hints([
            "Use -m flag followed by your message in quotes",
            "Keep the message clear and descriptive",
            "Start with a verb (Add, Fix, Update, etc.)",
        ])
        .with_example("commit", "git commit -m \"Fix login bug\""),
        FeedbackTemplate::new(
            "nothing_to_commit",
            ErrorCategory::Workflow,
            "Nothing to commit. Working tree clean.",
        )
        .with_hints([
            "Stage changes first using 'git add'",
            "Check staged files with 'git status'",
            "Make sure you have modified files",
        ]),
        FeedbackTemplate::new(
            "commit_success",
            ErrorCategory::Success,
            "Commit created successfully.",
        )
        .with_hints([
            "Use 'git log' to view your commit history",
            "Create a branch to try a new line of work",
        ]),
        FeedbackTemplate::new(
            "workspace_not_initialized",
            ErrorCategory::Workflow,
            "No workspace is bound to this session.",
        )
        .with_hints([
            "Set a workspace before running commands",
            "Start an exercise to get a fresh repository",
        ]),
        FeedbackTemplate::new(
            "unsupported_command",
            ErrorCategory::Syntax,
            "The command '{command}' is not supported here.",
        )
        .with_hints([
            "Only the core commands are available in exercises",
            "Check the exercise instructions for the expected command",
        ]),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_context() -> HashMap<String, String> {
        HashMap::new()
    }

    // ----------------------------------------------------------------
    // Rendering and attempts
    // ----------------------------------------------------------------

    #[test]
    fn test_first_attempt_is_plain_message() {
        let mut provider = TemplateFeedback::new();
        let message = provider.feedback("no_files_specified", &empty_context());
        assert_eq!(message, "No files specified for staging.");
    }

    #[test]
    fn test_hints_appear_from_second_attempt() {
        let mut provider = TemplateFeedback::new();
        provider.feedback("no_files_specified", &empty_context());
        let second = provider.feedback("no_files_specified", &empty_context());

        assert_eq!(
            second,
            "No files specified for staging.\n\nHints:\n\
             - Use 'git add <filename>' to stage specific files\n\
             - Use 'git add .' to stage all changes"
        );
    }

    #[test]
    fn test_hint_reveal_caps_at_available_hints() {
        let mut provider = TemplateFeedback::new();
        for _ in 0..5 {
            provider.feedback("uninitialized_repo", &empty_context());
        }
        let message = provider.feedback("uninitialized_repo", &empty_context());
        // Only two hints exist; attempt six still shows both.
        assert_eq!(message.matches("\n- ").count(), 2);
        assert_eq!(provider.attempts("uninitialized_repo"), 6);
    }

    #[test]
    fn test_hint_header_appended_when_template_has_no_hints() {
        let mut provider = TemplateFeedback::empty();
        provider.register(FeedbackTemplate::new(
            "plain",
            ErrorCategory::Workflow,
            "Plain message.",
        ));

        let first = provider.feedback("plain", &empty_context());
        assert_eq!(first, "Plain message.");

        let second = provider.feedback("plain", &empty_context());
        assert_eq!(second, "Plain message.\n\nHints:\n");

        let shaped =
            provider.feedback_with_context("plain", SkillLevel::Advanced, 2, &empty_context());
        assert_eq!(shaped, "Plain message.\n\nHints:\n");
    }

    #[test]
    fn test_unknown_key_falls_back() {
        let mut provider = TemplateFeedback::new();
        assert_eq!(
            provider.feedback("no_such_key", &empty_context()),
            UNKNOWN_FEEDBACK
        );
    }

    #[test]
    fn test_invalid_command_defaults_placeholder() {
        let mut provider = TemplateFeedback::new();
        let message = provider.feedback("invalid_command", &empty_context());
        assert_eq!(message, "The command 'unknown' is not valid.");

        let mut context = HashMap::new();
        context.insert("command".to_string(), "comit".to_string());
        provider.reset_attempts(None);
        let message = provider.feedback("invalid_command", &context);
        assert_eq!(message, "The command 'comit' is not valid.");
    }

    #[test]
    fn test_missing_context_parameter() {
        let mut provider = TemplateFeedback::empty();
        provider.register(FeedbackTemplate::new(
            "needs_branch",
            ErrorCategory::Input,
            "Branch {branch} was not found.",
        ));
        let message = provider.feedback("needs_branch", &empty_context());
        assert_eq!(
            message,
            "Error: Missing required context parameter: 'branch'"
        );
        // A failed render does not count as an attempt.
        assert_eq!(provider.attempts("needs_branch"), 0);
    }

    #[test]
    fn test_reset_attempts() {
        let mut provider = TemplateFeedback::new();
        provider.feedback("no_files_specified", &empty_context());
        provider.feedback("invalid_commit_format", &empty_context());

        provider.reset_attempts(Some("no_files_specified"));
        assert_eq!(provider.attempts("no_files_specified"), 0);
        assert_eq!(provider.attempts("invalid_commit_format"), 1);

        provider.reset_attempts(None);
        assert_eq!(provider.attempts("invalid_commit_format"), 0);
    }

    // ----------------------------------------------------------------
    // Skill-level shaping
    // ----------------------------------------------------------------

    #[test]
    fn test_skill_levels_select_hints() {
        let provider = TemplateFeedback::new();
        let context = empty_context();

        let beginner = provider.feedback_with_context(
            "no_files_specified",
            SkillLevel::Beginner,
            2,
            &context,
        );
        assert!(beginner.contains("Use 'git add <filename>' to stage specific files"));
        assert!(beginner.contains("Use 'git add .' to stage all changes"));

        let intermediate = provider.feedback_with_context(
            "no_files_specified",
            SkillLevel::Intermediate,
            2,
            &context,
        );
        // The first hint is skipped for intermediate learners.
        assert!(!intermediate.contains("stage specific files"));
        assert!(intermediate.contains("Use 'git add .' to stage all changes"));

        let advanced = provider.feedback_with_context(
            "no_files_specified",
            SkillLevel::Advanced,
            2,
            &context,
        );
        assert!(!advanced.contains("stage specific files"));
        assert!(advanced.contains("Use 'git status' to see which files can be staged"));
    }

    #[test]
    fn test_first_attempt_has_no_hints_regardless_of_skill() {
        let provider = TemplateFeedback::new();
        let message = provider.feedback_with_context(
            "no_files_specified",
            SkillLevel::Beginner,
            1,
            &empty_context(),
        );
        assert_eq!(message, "No files specified for staging.");
    }

    #[test]
    fn test_example_appended_after_two_attempts() {
        let provider = TemplateFeedback::new();
        let message = provider.feedback_with_context(
            "invalid_commit_format",
            SkillLevel::Beginner,
            3,
            &empty_context(),
        );
        assert!(message.contains("\n\nExample:\ngit commit -m \"Fix login bug\""));

        let earlier = provider.feedback_with_context(
            "invalid_commit_format",
            SkillLevel::Beginner,
            2,
            &empty_context(),
        );
        assert!(!earlier.contains("Example:"));
    }

    // ----------------------------------------------------------------
    // Templates
    // ----------------------------------------------------------------

    #[test]
    fn test_render_keeps_unclosed_brace() {
        let template = FeedbackTemplate::new(
            "odd",
            ErrorCategory::Syntax,
            "Mismatched {brace",
        );
        assert_eq!(
            template.format_message(&empty_context()),
            "Mismatched {brace"
        );
    }

    #[test]
    fn test_template_serde_roundtrip() {
        let template = FeedbackTemplate::new(
            "sample",
            ErrorCategory::Configuration,
            "A {thing} happened.",
        )
        .with_hints(["first hint"])
        .with_example("sample", "run the sample");

        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains(r#""category":"configuration""#));
        let back: FeedbackTemplate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, "sample");
        assert_eq!(back.hints.len(), 1);
    }

    #[test]
    fn test_builtin_catalog_covers_validator_keys() {
        let provider = TemplateFeedback::new();
        for key in [
            "invalid_command",
            "uninitialized_repo",
            "no_files_specified",
            "files_staged_success",
            "invalid_commit_format",
            "nothing_to_commit",
            "commit_success",
            "workspace_not_initialized",
            "unsupported_command",
        ] {
            assert!(provider.template(key).is_some(), "missing template: {key}");
        }
    }
}
