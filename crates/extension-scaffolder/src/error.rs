//! Error taxonomy for a scaffolding run

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a scaffolding run.
///
/// Every variant is terminal; nothing is retried. [`ScaffoldError::triggers_rollback`]
/// tells the orchestrator whether generated artifacts must be cleaned up first.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// The project name breaks the npm naming policy.
    #[error("Cannot create a project named \"{name}\" because of npm naming restrictions:\n{}", format_problems(.problems))]
    InvalidName { name: String, problems: Vec<String> },

    /// The project name shadows a dependency the project installs.
    #[error("Cannot create a project named \"{name}\" because a dependency with the same name exists.\nPlease choose a different project name.")]
    NameCollision { name: String },

    /// The target directory holds files the run could overwrite.
    #[error("The directory {} contains files that could conflict:\n{}\nEither try using a new directory name, or remove the files listed above.", .root.display(), format_problems(.files))]
    DirectoryConflict { root: PathBuf, files: Vec<String> },

    /// The package manager exited with a non-zero status.
    #[error("{command} has failed.")]
    InstallFailure { command: String },

    /// The downstream initialization script exited with a non-zero status.
    #[error("{command} has failed.")]
    InitFailure { command: String },

    /// The generated manifest lacks an entry the rewrite depends on.
    #[error("Unable to find {name} in package.json")]
    MissingDependency { name: String },

    /// The running Node.js does not satisfy the installed package's engine range.
    #[error("You are running Node {runtime}.\n{package} requires Node {required}.\nPlease update your version of Node.")]
    RuntimeIncompatible {
        runtime: String,
        required: String,
        package: String,
    },

    /// Anything else; surfaced verbatim for bug reports.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ScaffoldError {
    /// Whether generated artifacts must be deleted before the run terminates.
    pub fn triggers_rollback(&self) -> bool {
        matches!(
            self,
            ScaffoldError::InstallFailure { .. }
                | ScaffoldError::InitFailure { .. }
                | ScaffoldError::MissingDependency { .. }
                | ScaffoldError::Unexpected(_)
        )
    }

    /// The failing command line, for failures raised by an external process.
    pub fn command(&self) -> Option<&str> {
        match self {
            ScaffoldError::InstallFailure { command } | ScaffoldError::InitFailure { command } => {
                Some(command)
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScaffoldError {
    fn from(err: std::io::Error) -> Self {
        ScaffoldError::Unexpected(err.into())
    }
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  * {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_triggers() {
        let install = ScaffoldError::InstallFailure {
            command: "npm install".to_string(),
        };
        assert!(install.triggers_rollback());
        assert_eq!(install.command(), Some("npm install"));

        assert!(ScaffoldError::MissingDependency {
            name: "react".to_string()
        }
        .triggers_rollback());
        assert!(ScaffoldError::Unexpected(anyhow::anyhow!("boom")).triggers_rollback());
    }

    #[test]
    fn test_pre_install_errors_do_not_roll_back() {
        let incompatible = ScaffoldError::RuntimeIncompatible {
            runtime: "8.0.0".to_string(),
            required: ">=10".to_string(),
            package: "divi-scripts".to_string(),
        };
        assert!(!incompatible.triggers_rollback());
        assert!(!ScaffoldError::NameCollision {
            name: "react".to_string()
        }
        .triggers_rollback());
        assert!(incompatible.command().is_none());
    }

    #[test]
    fn test_invalid_name_lists_problems() {
        let err = ScaffoldError::InvalidName {
            name: "Bad Name".to_string(),
            problems: vec!["name can no longer contain capital letters".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("\"Bad Name\""));
        assert!(message.contains("  * name can no longer contain capital letters"));
    }
}
