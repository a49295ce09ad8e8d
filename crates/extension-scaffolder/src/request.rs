//! Project request and pre-install validation

use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use crate::rollback;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What the front end asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    /// Target directory, relative to [`CreateOptions::original_dir`] or absolute
    pub name: String,

    /// Forward `--verbose` to the package manager and the init script
    pub verbose: bool,

    /// Version, tag, tarball, git URL or `file:` path of the package to install
    pub version_spec: Option<String>,
}

impl ProjectRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verbose: false,
            version_spec: None,
        }
    }

    /// Absolute project root for this request
    pub fn root(&self, original_dir: &Path) -> PathBuf {
        original_dir.join(&self.name)
    }
}

/// Run-wide options that are not part of the request itself
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Directory the run was launched from; relative paths resolve against it
    pub original_dir: PathBuf,

    /// Install with npm even when yarn is available
    pub use_npm: bool,

    /// Template name handed to the init script
    pub template: Option<String>,
}

impl CreateOptions {
    pub fn new(original_dir: impl Into<PathBuf>) -> Self {
        Self {
            original_dir: original_dir.into(),
            use_npm: false,
            template: None,
        }
    }
}

/// Files that may already exist in the target directory
const TOLERATED_FILES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".git",
    ".gitattributes",
    ".gitignore",
    ".gitlab-ci.yml",
    ".hg",
    ".hgcheck",
    ".hgignore",
    ".idea",
    ".npmignore",
    ".travis.yml",
    "docs",
    "LICENSE",
    "README.md",
    "mkdocs.yml",
    "web.iml",
];

const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

const NODE_BUILTINS: &[&str] = &[
    "assert",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "module",
    "net",
    "os",
    "path",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "worker_threads",
    "zlib",
];

const MAX_NAME_LENGTH: usize = 214;

/// Check a name against the npm rules for new packages
///
/// Returns every rule the name breaks; an empty list means the name is valid.
pub fn validate_package_name(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if name.is_empty() {
        problems.push("name length must be greater than zero".to_string());
        return problems;
    }
    if name.starts_with('.') {
        problems.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        problems.push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        problems.push("name cannot contain leading or trailing spaces".to_string());
    }
    if BLACKLISTED_NAMES
        .iter()
        .any(|blacklisted| name.eq_ignore_ascii_case(blacklisted))
    {
        problems.push(format!("{} is a blacklisted name", name));
    }
    if NODE_BUILTINS.contains(&name) {
        problems.push(format!("{} is a core module name", name));
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!(
            "name can no longer contain more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if name.to_lowercase() != name {
        problems.push("name can no longer contain capital letters".to_string());
    }
    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        problems.push("name can no longer contain special characters (\"~'!()*\")".to_string());
    }
    if !is_url_safe(name) {
        problems.push("name can only contain URL-friendly characters".to_string());
    }

    problems
}

/// URL-safe per `encodeURIComponent`, allowing a single `@scope/` prefix
fn is_url_safe(name: &str) -> bool {
    let unscoped = match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, package)) if !scope.is_empty() && !package.is_empty() => {
                return is_uri_component(scope) && is_uri_component(package);
            }
            _ => return false,
        },
        None => name,
    };
    is_uri_component(unscoped)
}

fn is_uri_component(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c))
}

/// Validate the application name derived from the project root
pub fn check_app_name<C: ProductConfig>(config: &C, app_name: &str) -> Result<(), ScaffoldError> {
    let problems = validate_package_name(app_name);
    if !problems.is_empty() {
        return Err(ScaffoldError::InvalidName {
            name: app_name.to_string(),
            problems,
        });
    }

    if config.reserved_names().contains(&app_name) {
        return Err(ScaffoldError::NameCollision {
            name: app_name.to_string(),
        });
    }

    Ok(())
}

/// Reject target directories holding anything the run could clobber
///
/// Stale package-manager logs from an earlier attempt are not conflicts; they are
/// deleted so the new run starts clean.
pub async fn ensure_safe_to_create(root: &Path) -> Result<(), ScaffoldError> {
    let mut conflicts = Vec::new();
    let mut stale_logs = Vec::new();

    let mut entries = fs::read_dir(root).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().to_string();
        if TOLERATED_FILES.contains(&file_name.as_str()) {
            continue;
        }
        if rollback::is_log_artifact(&file_name) {
            stale_logs.push(entry.path());
            continue;
        }
        conflicts.push(file_name);
    }

    if !conflicts.is_empty() {
        conflicts.sort();
        return Err(ScaffoldError::DirectoryConflict {
            root: root.to_path_buf(),
            files: conflicts,
        });
    }

    for log in stale_logs {
        fs::remove_file(&log).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestConfig;

    #[test]
    fn test_valid_names() {
        assert!(validate_package_name("divi-sample").is_empty());
        assert!(validate_package_name("my.extension_2").is_empty());
        assert!(validate_package_name("@acme/divi-tools").is_empty());
    }

    #[test]
    fn test_invalid_names() {
        assert!(!validate_package_name("").is_empty());
        assert!(!validate_package_name(".hidden").is_empty());
        assert!(!validate_package_name("_private").is_empty());
        assert!(!validate_package_name("Divi-Sample").is_empty());
        assert!(!validate_package_name("node_modules").is_empty());
        assert!(!validate_package_name("http").is_empty());
        assert!(!validate_package_name("with space").is_empty());
        assert!(!validate_package_name("wow!").is_empty());
        assert!(!validate_package_name(&"a".repeat(215)).is_empty());
        assert!(!validate_package_name("@/missing-scope").is_empty());
    }

    #[test]
    fn test_capital_letters_reported() {
        let problems = validate_package_name("DiviSample");
        assert_eq!(
            problems,
            vec!["name can no longer contain capital letters".to_string()]
        );
    }

    #[test]
    fn test_name_collision() {
        let config = TestConfig;
        let err = check_app_name(&config, "react").unwrap_err();
        assert!(matches!(err, ScaffoldError::NameCollision { .. }));

        let err = check_app_name(&config, "divi-scripts").unwrap_err();
        assert!(matches!(err, ScaffoldError::NameCollision { .. }));

        assert!(check_app_name(&config, "divi-sample").is_ok());
    }

    #[tokio::test]
    async fn test_safe_directory_tolerates_known_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "# hi").unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("npm-debug.log.1234"), "old").unwrap();

        ensure_safe_to_create(dir.path()).await.unwrap();

        assert!(dir.path().join("README.md").exists());
        assert!(!dir.path().join("npm-debug.log.1234").exists());
    }

    #[tokio::test]
    async fn test_conflicting_files_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("index.php"), "<?php").unwrap();

        match ensure_safe_to_create(dir.path()).await {
            Err(ScaffoldError::DirectoryConflict { files, .. }) => {
                assert_eq!(files, vec!["index.php".to_string(), "package.json".to_string()]);
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_request_root_is_joined() {
        let request = ProjectRequest::new("divi-sample");
        assert_eq!(
            request.root(Path::new("/work")),
            PathBuf::from("/work/divi-sample")
        );
    }
}
