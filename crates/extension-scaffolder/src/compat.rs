//! Node.js compatibility check against the installed package's `engines.node`

use crate::error::ScaffoldError;
use crate::manifest::InstalledPackage;
use crate::runtime::Toolchain;
use colored::Colorize;
use semver::{Version, VersionReq};
use std::path::Path;

/// Outcome of comparing the runtime with a declared range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// No range declared
    Unconstrained,
    Satisfied,
    Unsatisfied,
    /// The range or the runtime version could not be compared
    Unknown(String),
}

/// Translate an npm range into alternatives `semver` can evaluate
///
/// npm separates comparators with spaces and alternatives with `||`; the `semver`
/// crate wants commas and has no alternatives.
pub fn parse_engine_range(range: &str) -> Option<Vec<VersionReq>> {
    range
        .split("||")
        .map(|alternative| {
            let alternative = alternative.trim();
            if alternative.is_empty() {
                return VersionReq::parse("*").ok();
            }
            if let Some((low, high)) = alternative.split_once(" - ") {
                return VersionReq::parse(&format!(">={}, <={}", low.trim(), high.trim())).ok();
            }
            VersionReq::parse(&join_comparators(alternative)).ok()
        })
        .collect()
}

/// `>= 8 <12` → `>=8, <12`
///
/// A bare full version is exact in npm (`8.10.0` → `=8.10.0`) while `semver` reads it
/// as a caret requirement. Partial versions are X-ranges in both and pass through.
fn join_comparators(alternative: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_operator: Option<&str> = None;

    for token in alternative.split_whitespace() {
        if token.chars().all(|c| "<>=~^".contains(c)) {
            pending_operator = Some(token);
            continue;
        }
        match pending_operator.take() {
            Some(operator) => comparators.push(format!("{}{}", operator, token)),
            None if Version::parse(token).is_ok() => comparators.push(format!("={}", token)),
            None => comparators.push(token.to_string()),
        }
    }

    comparators.join(", ")
}

/// Compare a runtime version with an npm range
pub fn check_range(runtime: &Version, range: Option<&str>) -> Compatibility {
    let range = match range {
        Some(range) => range,
        None => return Compatibility::Unconstrained,
    };

    match parse_engine_range(range) {
        Some(alternatives) if alternatives.iter().any(|req| req.matches(runtime)) => {
            Compatibility::Satisfied
        }
        Some(_) => Compatibility::Unsatisfied,
        None => Compatibility::Unknown(format!("unsupported version range '{}'", range)),
    }
}

/// Abort when the running Node.js cannot run the installed package
///
/// Artifacts are left in place on failure: the install itself is sound, only the
/// runtime needs upgrading.
pub async fn check_runtime_compatibility<T: Toolchain>(
    toolchain: &T,
    root: &Path,
    package_name: &str,
) -> Result<(), ScaffoldError> {
    let package = InstalledPackage::read_installed(root, package_name).await?;
    let required = package.node_engine();
    if required.is_none() {
        return Ok(());
    }

    let runtime = match toolchain.runtime_version() {
        Some(runtime) => runtime,
        None => {
            warn_skipped(package_name, "the Node.js version could not be detected");
            return Ok(());
        }
    };

    match check_range(&runtime, required) {
        Compatibility::Unconstrained | Compatibility::Satisfied => Ok(()),
        Compatibility::Unsatisfied => Err(ScaffoldError::RuntimeIncompatible {
            runtime: runtime.to_string(),
            required: required.unwrap_or_default().to_string(),
            package: package_name.to_string(),
        }),
        Compatibility::Unknown(reason) => {
            warn_skipped(package_name, &reason);
            Ok(())
        }
    }
}

fn warn_skipped(package_name: &str, reason: &str) {
    eprintln!(
        "{} Skipping the Node.js compatibility check for {}: {}",
        "Warning:".yellow(),
        package_name,
        reason
    );
}
