//! Package reference resolution
//!
//! Turns the raw version/source specifier into the argument handed to the package
//! manager and the name the installed package will be found under.

pub mod archive;
pub mod reference;

use crate::product::ProductConfig;
use archive::TarballSource;
use colored::Colorize;
use std::path::PathBuf;

pub use reference::{name_from_tarball_stem, PackageReference};

/// Package name, either declared by the package itself or guessed from its source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Resolved(String),
    Degraded { name: String, reason: String },
}

impl NameResolution {
    pub fn name(&self) -> &str {
        match self {
            NameResolution::Resolved(name) => name,
            NameResolution::Degraded { name, .. } => name,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, NameResolution::Degraded { .. })
    }
}

/// Outcome of resolving a specifier
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    pub reference: PackageReference,
    pub install_target: String,
    pub name: NameResolution,
}

impl ResolvedPackage {
    pub fn name(&self) -> &str {
        self.name.name()
    }
}

/// Resolver - classifies specifiers and inspects archives when needed
pub struct PackageResolver {
    client: reqwest::Client,
    original_dir: PathBuf,
}

impl PackageResolver {
    /// Create a new resolver with a custom user agent
    pub fn new(original_dir: impl Into<PathBuf>, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            original_dir: original_dir.into(),
        }
    }

    /// Create a resolver from a product config
    pub fn from_config<C: ProductConfig>(config: &C, original_dir: impl Into<PathBuf>) -> Self {
        Self::new(original_dir, config.user_agent())
    }

    /// Resolve a specifier; never fails, archive read failures degrade the name
    pub async fn resolve(&self, spec: Option<&str>, default_package: &str) -> ResolvedPackage {
        let reference = PackageReference::classify(spec, default_package, &self.original_dir);
        let install_target = reference.install_target();

        let declared = match &reference {
            PackageReference::TarballUrl(url) => {
                Some(archive::read_tarball_name(&self.client, TarballSource::Remote(url)).await)
            }
            PackageReference::TarballPath(path) => {
                Some(archive::read_tarball_name(&self.client, TarballSource::Local(path)).await)
            }
            PackageReference::LocalDirectory(path) => {
                Some(archive::read_directory_name(path).await)
            }
            _ => None,
        };

        let name = match declared {
            None => NameResolution::Resolved(reference.static_name()),
            Some(Ok(name)) => NameResolution::Resolved(name),
            Some(Err(err)) => {
                let reason = format!("{:#}", err);
                let fallback = reference.static_name();
                eprintln!(
                    "{} Could not read the package name from {}: {}",
                    "Warning:".yellow(),
                    install_target,
                    reason
                );
                eprintln!("  Assuming the package is named {}.", fallback.cyan());
                NameResolution::Degraded {
                    name: fallback,
                    reason,
                }
            }
        };

        ResolvedPackage {
            reference,
            install_target,
            name,
        }
    }
}
