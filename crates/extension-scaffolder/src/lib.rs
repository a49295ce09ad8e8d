//! Extension Scaffolder - Shared library for Divi extension bootstrapping CLIs
//!
//! This library resolves the package a new extension is built on, installs it with yarn
//! or npm, checks the running Node.js against it, rewrites the generated `package.json`,
//! runs the package's init script and finalizes the scaffold, rolling back generated
//! files when any of that fails.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Specifier resolution, connectivity probing, installs,
//!   manifest rewriting, token substitution, rollback
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait, `Toolchain` seam and
//!   [`create_extension`]
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based front end (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based front end
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use extension_scaffolder::{create_extension, CreateOptions, ProjectRequest, SystemToolchain};
//!
//! let request = ProjectRequest::new("divi-sample");
//! let options = CreateOptions::new(std::env::current_dir()?);
//! let project = create_extension(&MyConfig, &SystemToolchain, &request, &options).await?;
//! ```

pub mod compat;
pub mod create;
pub mod error;
pub mod install;
pub mod manifest;
pub mod product;
pub mod request;
pub mod resolve;
pub mod rollback;
pub mod runtime;
pub mod template;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use create::{create_extension, CreatedProject};
pub use error::ScaffoldError;
pub use install::{InstallPlan, PackageManager};
pub use manifest::PackageManifest;
pub use product::ProductConfig;
pub use request::{CreateOptions, ProjectRequest};
pub use resolve::{NameResolution, PackageReference, PackageResolver, ResolvedPackage};
pub use rollback::{RollbackReport, GENERATED_ARTIFACTS};
pub use runtime::{ExternalCommand, SystemToolchain, Toolchain};
pub use template::TemplateContext;

#[cfg(feature = "tui")]
pub use tui::run;
