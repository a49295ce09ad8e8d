//! Cleanup of generated artifacts after a failed run
//!
//! Only names in [`GENERATED_ARTIFACTS`] are ever deleted, so files the user had in the
//! target directory before the run survive a rollback.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// How a directory entry is matched against an artifact name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactMatch {
    /// The entry name equals the artifact name
    Exact,
    /// The entry name starts with the artifact name (`npm-debug.log.1234`)
    Prefix,
}

/// An entry the orchestrator itself may create in the project root
#[derive(Debug, Clone, Copy)]
pub struct GeneratedArtifact {
    pub name: &'static str,
    pub matching: ArtifactMatch,
}

impl GeneratedArtifact {
    const fn exact(name: &'static str) -> Self {
        Self {
            name,
            matching: ArtifactMatch::Exact,
        }
    }

    const fn log(name: &'static str) -> Self {
        Self {
            name,
            matching: ArtifactMatch::Prefix,
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self.matching {
            ArtifactMatch::Exact => file_name == self.name,
            ArtifactMatch::Prefix => file_name.starts_with(self.name),
        }
    }
}

pub const GENERATED_ARTIFACTS: &[GeneratedArtifact] = &[
    GeneratedArtifact::exact("package.json"),
    GeneratedArtifact::exact("package-lock.json"),
    GeneratedArtifact::exact("yarn.lock"),
    GeneratedArtifact::exact("node_modules"),
    GeneratedArtifact::log("npm-debug.log"),
    GeneratedArtifact::log("yarn-error.log"),
    GeneratedArtifact::log("yarn-debug.log"),
];

/// Whether a file name is one of the package-manager logs
pub fn is_log_artifact(file_name: &str) -> bool {
    GENERATED_ARTIFACTS
        .iter()
        .any(|a| a.matching == ArtifactMatch::Prefix && a.matches(file_name))
}

fn is_generated(file_name: &str) -> bool {
    GENERATED_ARTIFACTS.iter().any(|a| a.matches(file_name))
}

/// What a rollback did
#[derive(Debug, Clone, Default)]
pub struct RollbackReport {
    /// Entries deleted from the project root, in deletion order
    pub deleted: Vec<String>,

    /// Whether the project root itself was removed
    pub removed_root: bool,

    /// Directory subsequent work should happen in
    pub working_root: PathBuf,
}

/// Delete generated artifacts from `root`, then `root` itself when left empty
pub async fn rollback(root: &Path) -> Result<RollbackReport> {
    let mut report = RollbackReport {
        working_root: root.to_path_buf(),
        ..Default::default()
    };

    if !root.exists() {
        return Ok(report);
    }

    let mut entries = fs::read_dir(root)
        .await
        .with_context(|| format!("Failed to read {}", root.display()))?;
    let mut to_delete = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().to_string();
        if is_generated(&file_name) {
            to_delete.push((file_name, entry.path()));
        }
    }
    to_delete.sort();

    for (file_name, path) in to_delete {
        println!("Deleting generated file... {}", file_name.cyan());
        let removed = if fs::symlink_metadata(&path).await?.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        removed.with_context(|| format!("Failed to delete {}", path.display()))?;
        report.deleted.push(file_name);
    }

    let mut remaining = fs::read_dir(root).await?;
    if remaining.next_entry().await?.is_none() {
        let parent = root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let dir_name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        println!(
            "Deleting {} from {}",
            format!("{}/", dir_name).cyan(),
            parent.display().to_string().cyan()
        );
        fs::remove_dir(root)
            .await
            .with_context(|| format!("Failed to delete {}", root.display()))?;
        report.removed_root = true;
        report.working_root = parent;
    }

    println!("{}", "Done.".green());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_matching() {
        assert!(is_generated("package.json"));
        assert!(is_generated("node_modules"));
        assert!(is_generated("yarn-error.log"));
        assert!(is_generated("npm-debug.log.4711"));
        assert!(!is_generated("package.json.bak"));
        assert!(!is_generated("README.md"));
        assert!(is_log_artifact("yarn-debug.log"));
        assert!(!is_log_artifact("package.json"));
    }

    #[tokio::test]
    async fn test_rollback_removes_empty_root() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("divi-sample");
        std::fs::create_dir_all(root.join("node_modules/react")).unwrap();
        std::fs::write(root.join("package.json"), "{}").unwrap();
        std::fs::write(root.join("yarn-error.log"), "oops").unwrap();

        let report = rollback(&root).await.unwrap();

        assert_eq!(
            report.deleted,
            vec!["node_modules", "package.json", "yarn-error.log"]
        );
        assert!(report.removed_root);
        assert_eq!(report.working_root, parent.path());
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_rollback_keeps_user_files() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("divi-sample");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("package.json"), "{}").unwrap();
        std::fs::write(root.join("README.md"), "mine").unwrap();

        let report = rollback(&root).await.unwrap();

        assert_eq!(report.deleted, vec!["package.json"]);
        assert!(!report.removed_root);
        assert_eq!(report.working_root, root);
        assert!(root.join("README.md").exists());
    }

    #[tokio::test]
    async fn test_rollback_missing_root_is_noop() {
        let parent = tempfile::tempdir().unwrap();
        let report = rollback(&parent.path().join("never-created")).await.unwrap();
        assert!(report.deleted.is_empty());
        assert!(!report.removed_root);
    }
}
