//! `package.json` types, creation and rewriting

use crate::error::ScaffoldError;
use anyhow::Context;
use colored::Colorize;
use semver::VersionReq;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const MANIFEST_FILE: &str = "package.json";

/// Version written into freshly generated manifests
pub const INITIAL_VERSION: &str = "0.1.0";

/// Typed view of an installed package's manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstalledPackage {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub engines: Option<Engines>,
}

impl InstalledPackage {
    /// Read `node_modules/<name>/package.json` below `root`
    pub async fn read_installed(root: &Path, name: &str) -> anyhow::Result<Self> {
        let path = installed_manifest_path(root, name);
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Declared Node.js range, if any
    pub fn node_engine(&self) -> Option<&str> {
        self.engines
            .as_ref()
            .and_then(|e| e.node.as_deref())
            .filter(|range| !range.trim().is_empty())
    }
}

/// `engines` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Engines {
    #[serde(default)]
    pub node: Option<String>,
}

/// `<root>/node_modules/<name>/package.json`, scoped names included
pub fn installed_manifest_path(root: &Path, name: &str) -> PathBuf {
    let mut path = root.join("node_modules");
    for segment in name.split('/') {
        path.push(segment);
    }
    path.join(MANIFEST_FILE)
}

/// The project manifest, with key order preserved across rewrites
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    doc: Map<String, Value>,
}

impl PackageManifest {
    /// Manifest written before anything is installed
    pub fn initial(app_name: &str) -> Self {
        let mut doc = Map::new();
        doc.insert("name".to_string(), Value::String(app_name.to_string()));
        doc.insert(
            "version".to_string(),
            Value::String(INITIAL_VERSION.to_string()),
        );
        doc.insert("private".to_string(), Value::Bool(true));
        Self { doc }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(content).context("Failed to parse package.json")?;
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            _ => anyhow::bail!("package.json is not a JSON object"),
        }
    }

    pub async fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Two-space indentation and a trailing newline, like npm writes it
    pub fn to_json(&self) -> String {
        let mut json = serde_json::to_string_pretty(&self.doc).unwrap_or_else(|_| "{}".to_string());
        json.push('\n');
        json
    }

    pub async fn save(&self, root: &Path) -> anyhow::Result<()> {
        let path = root.join(MANIFEST_FILE);
        fs::write(&path, self.to_json())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn section(&self, key: &str) -> Option<&Map<String, Value>> {
        self.doc.get(key).and_then(Value::as_object)
    }

    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.section("dependencies")
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    pub fn dev_dependency(&self, name: &str) -> Option<&str> {
        self.section("devDependencies")
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_str)
    }

    /// Move one entry from `dependencies` to `devDependencies`
    ///
    /// With `caret`, the moved version becomes a caret range.
    pub fn move_to_dev(&mut self, name: &str, caret: bool) -> Result<(), ScaffoldError> {
        let missing = || ScaffoldError::MissingDependency {
            name: name.to_string(),
        };

        let version = self
            .doc
            .get_mut("dependencies")
            .and_then(Value::as_object_mut)
            .ok_or_else(missing)?
            .shift_remove(name)
            .ok_or_else(missing)?;

        let version = match version {
            Value::String(version) if caret => Value::String(caret_range(name, &version)),
            other => other,
        };

        let dev = self
            .doc
            .entry("devDependencies")
            .or_insert_with(|| Value::Object(Map::new()));
        if !dev.is_object() {
            *dev = Value::Object(Map::new());
        }
        if let Some(dev) = dev.as_object_mut() {
            dev.insert(name.to_string(), version);
        }
        Ok(())
    }
}

/// `16.4.2` → `^16.4.2`; already-caret and unpatchable versions are kept
pub fn caret_range(name: &str, version: &str) -> String {
    if version.starts_with('^') {
        return version.to_string();
    }

    let patched = format!("^{}", version);
    if VersionReq::parse(&patched).is_ok() {
        patched
    } else {
        eprintln!(
            "{} Unable to patch {} dependency version because version {} will become invalid {}",
            "Warning:".yellow(),
            name,
            version.red(),
            patched.red()
        );
        version.to_string()
    }
}

/// Move the resolved package and the runtime packages into `devDependencies`
///
/// They are build-time tooling for the extension and must not ship in its production
/// bundle. Runtime packages additionally get caret ranges.
pub async fn rewrite_dependencies(
    root: &Path,
    package_name: &str,
    runtime: &[&str],
) -> Result<PackageManifest, ScaffoldError> {
    let mut manifest = PackageManifest::load(root).await?;
    apply_dev_dependency_moves(&mut manifest, package_name, runtime)?;
    manifest.save(root).await?;
    Ok(manifest)
}

/// In-memory half of [`rewrite_dependencies`]
pub fn apply_dev_dependency_moves(
    manifest: &mut PackageManifest,
    package_name: &str,
    runtime: &[&str],
) -> Result<(), ScaffoldError> {
    if manifest.section("dependencies").is_none() {
        return Err(ScaffoldError::MissingDependency {
            name: "dependencies".to_string(),
        });
    }

    manifest.move_to_dev(package_name, false)?;
    for dependency in runtime {
        manifest.move_to_dev(dependency, true)?;
    }
    Ok(())
}
