//! Shared test utilities for gitkata-core integration tests.

use gitkata_core::{CommandValidator, GitCommand, MemoryWorkspace};

/// Validator bound to an in-memory workspace seeded with `files`.
pub fn validator_with_files(files: &[(&str, &str)]) -> CommandValidator {
    let mut workspace = MemoryWorkspace::new();
    for (path, content) in files {
        workspace.put(*path, *content);
    }
    let mut validator = CommandValidator::new();
    validator.set_workspace("test-workspace", workspace);
    validator
}

/// Shorthand for building a command.
pub fn cmd(name: &str, args: &[&str]) -> GitCommand {
    GitCommand::new(name, args)
}
