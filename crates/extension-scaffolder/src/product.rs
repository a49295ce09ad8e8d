//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface that each product must implement to configure
//! what gets installed and which scaffold files get token-substituted.

use std::path::Path;

/// Configuration trait for bootstrapping CLIs
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - The package installed by default and the runtime packages installed next to it
/// - The registry host probed for connectivity
/// - The scaffold file set rewritten after initialization
/// - Post-setup instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Package installed when no version specifier is given
    fn default_package(&self) -> &'static str;

    /// Framework runtime packages installed with every project
    ///
    /// These are moved into `devDependencies` after installation together with the
    /// resolved package.
    fn runtime_dependencies(&self) -> &'static [&'static str];

    /// Leading word stripped from project names before deriving the naming prefix
    fn prefix_word(&self) -> &'static str;

    /// Registry host probed to decide between online and offline installs
    fn registry_host(&self) -> &'static str {
        "registry.yarnpkg.com"
    }

    /// Environment variable name for overriding the registry host
    fn registry_host_env(&self) -> &'static str;

    /// Scaffold files (relative to the project root) that receive token substitution
    fn scaffold_files(&self) -> &'static [&'static str];

    /// Scaffold file renamed after its parent directory
    fn primary_template_file(&self) -> &'static str;

    /// Scaffold file renamed after the derived `Prefix`
    fn customization_module_file(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation
    fn next_steps(&self, dir: &Path, use_yarn: bool) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Registry host after applying the environment override
    fn resolved_registry_host(&self) -> String {
        std::env::var(self.registry_host_env())
            .ok()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| self.registry_host().to_string())
    }

    /// Every package name a project must not be named after
    fn reserved_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.runtime_dependencies().to_vec();
        names.push(self.default_package());
        names.sort_unstable();
        names
    }
}
