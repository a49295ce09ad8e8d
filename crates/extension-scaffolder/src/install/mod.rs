//! Dependency installation through yarn or npm

pub mod probe;

use crate::error::ScaffoldError;
use crate::runtime::{ExternalCommand, Toolchain};
use colored::Colorize;
use std::fmt;
use std::path::Path;

pub use probe::{check_online, PROBE_TIMEOUT};

/// Package manager driving the install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Yarn,
    Npm,
}

impl PackageManager {
    /// Yarn when available, unless npm was requested
    pub fn select<T: Toolchain>(toolchain: &T, use_npm: bool) -> Self {
        if !use_npm && toolchain.has_yarn() {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarnpkg",
            PackageManager::Npm => "npm",
        }
    }

    /// Command that runs a package script (`yarn start` / `npm start`)
    pub fn run_script(&self, script: &str) -> String {
        match self {
            PackageManager::Yarn => format!("yarn {}", script),
            PackageManager::Npm if script == "start" || script == "test" => {
                format!("npm {}", script)
            }
            PackageManager::Npm => format!("npm run {}", script),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageManager::Yarn => write!(f, "yarn"),
            PackageManager::Npm => write!(f, "npm"),
        }
    }
}

/// What gets installed and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub use_yarn: bool,
    pub online: bool,
    pub dependencies: Vec<String>,
}

impl InstallPlan {
    /// Runtime packages first, then the resolved install target
    pub fn new(manager: PackageManager, online: bool, runtime: &[&str], install_target: &str) -> Self {
        let mut dependencies: Vec<String> = runtime.iter().map(|d| d.to_string()).collect();
        dependencies.push(install_target.to_string());
        Self {
            use_yarn: manager == PackageManager::Yarn,
            online,
            dependencies,
        }
    }

    pub fn manager(&self) -> PackageManager {
        if self.use_yarn {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        }
    }

    /// Build the package-manager invocation
    ///
    /// Versions are pinned exactly. `--offline` only exists for yarn and is only added
    /// when the probe failed.
    pub fn command(&self, root: &Path, verbose: bool) -> ExternalCommand {
        let mut command = match self.manager() {
            PackageManager::Yarn => {
                let mut command = ExternalCommand::new("yarnpkg").args(["add", "--exact"]);
                if !self.online {
                    command = command.arg("--offline");
                }
                command
                    .args(self.dependencies.iter().cloned())
                    .arg("--cwd")
                    .arg(root.display().to_string())
            }
            PackageManager::Npm => ExternalCommand::new("npm")
                .args(["install", "--save", "--save-exact", "--loglevel", "error"])
                .args(self.dependencies.iter().cloned()),
        };

        if verbose {
            command = command.arg("--verbose");
        }
        command
    }
}

/// Run the install; any non-zero exit becomes `InstallFailure`
pub async fn install<T: Toolchain>(
    toolchain: &T,
    plan: &InstallPlan,
    root: &Path,
    verbose: bool,
) -> Result<(), ScaffoldError> {
    if plan.use_yarn && !plan.online {
        println!("{}", "You appear to be offline.".yellow());
        println!("{}", "Falling back to the local Yarn cache.".yellow());
        println!();
    }

    let command = plan.command(root, verbose);
    let succeeded = match toolchain.run(&command, root).await {
        Ok(succeeded) => succeeded,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red(), err);
            false
        }
    };

    if succeeded {
        Ok(())
    } else {
        Err(ScaffoldError::InstallFailure {
            command: command.to_string(),
        })
    }
}

/// `a`, `a and b`, `a, b, and c`
pub fn describe_dependencies(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.cyan().to_string(),
        [first, second] => format!("{} and {}", first.cyan(), second.cyan()),
        [rest @ .., last] => {
            let head: Vec<String> = rest.iter().map(|n| n.cyan().to_string()).collect();
            format!("{}, and {}", head.join(", "), last.cyan())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNTIME: &[&str] = &["react", "react-dom"];

    #[test]
    fn test_yarn_online_arguments() {
        let plan = InstallPlan::new(PackageManager::Yarn, true, RUNTIME, "divi-scripts");
        let command = plan.command(Path::new("/work/divi-sample"), false);
        assert_eq!(
            command.to_string(),
            "yarnpkg add --exact react react-dom divi-scripts --cwd /work/divi-sample"
        );
    }

    #[test]
    fn test_yarn_offline_adds_flag() {
        let plan = InstallPlan::new(PackageManager::Yarn, false, RUNTIME, "divi-scripts@1.0.0");
        let command = plan.command(Path::new("/work/app"), true);
        assert_eq!(
            command.args,
            vec![
                "add",
                "--exact",
                "--offline",
                "react",
                "react-dom",
                "divi-scripts@1.0.0",
                "--cwd",
                "/work/app",
                "--verbose",
            ]
        );
    }

    #[test]
    fn test_npm_never_offline() {
        let plan = InstallPlan::new(PackageManager::Npm, false, RUNTIME, "divi-scripts");
        let command = plan.command(Path::new("/work/app"), true);
        assert_eq!(
            command.to_string(),
            "npm install --save --save-exact --loglevel error react react-dom divi-scripts --verbose"
        );
    }

    #[test]
    fn test_run_script() {
        assert_eq!(PackageManager::Yarn.run_script("build"), "yarn build");
        assert_eq!(PackageManager::Npm.run_script("start"), "npm start");
        assert_eq!(PackageManager::Npm.run_script("build"), "npm run build");
    }

    #[test]
    fn test_describe_dependencies() {
        colored::control::set_override(false);
        assert_eq!(describe_dependencies(&["a"]), "a");
        assert_eq!(describe_dependencies(&["a", "b"]), "a and b");
        assert_eq!(describe_dependencies(&["a", "b", "c"]), "a, b, and c");
    }
}
