//! The bootstrapping pipeline
//!
//! validate → prepare directory → initial manifest → resolve → probe → install →
//! compatibility gate → manifest rewrite → init script → scaffold finalization.
//!
//! Everything after the directory check runs under rollback: a failure that
//! [triggers rollback](ScaffoldError::triggers_rollback) deletes the generated
//! artifacts before the error is returned.

use crate::compat;
use crate::error::ScaffoldError;
use crate::install::{self, InstallPlan, PackageManager};
use crate::manifest::{self, PackageManifest};
use crate::product::ProductConfig;
use crate::request::{self, CreateOptions, ProjectRequest};
use crate::resolve::{PackageResolver, ResolvedPackage};
use crate::rollback::{self, RollbackReport};
use crate::runtime::{ExternalCommand, Toolchain};
use crate::template::{self, FinalizeReport, TemplateContext};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A successfully bootstrapped project
#[derive(Debug, Clone)]
pub struct CreatedProject {
    pub root: PathBuf,
    pub app_name: String,
    pub manager: PackageManager,
    pub package: ResolvedPackage,
    pub context: TemplateContext,
    pub scaffold: FinalizeReport,
}

/// Bootstrap a new extension
///
/// On failure the returned error is final; when it triggered a rollback, the
/// generated artifacts are already gone.
pub async fn create_extension<C: ProductConfig, T: Toolchain>(
    config: &C,
    toolchain: &T,
    request: &ProjectRequest,
    options: &CreateOptions,
) -> Result<CreatedProject, ScaffoldError> {
    let root = request.root(&options.original_dir);
    let app_name = root
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ScaffoldError::InvalidName {
            name: request.name.clone(),
            problems: vec!["name must end in a directory name".to_string()],
        })?;

    request::check_app_name(config, &app_name)?;
    let context = TemplateContext::derive(&app_name, config.prefix_word())?;

    fs::create_dir_all(&root).await?;
    request::ensure_safe_to_create(&root).await?;

    println!();
    println!(
        "Creating a new {} in {}.",
        config.display_name(),
        root.display().to_string().green()
    );
    println!();

    let result = run_pipeline(config, toolchain, request, options, &root, &app_name, context).await;

    match result {
        Err(err) if err.triggers_rollback() => {
            println!();
            println!("{}", "Aborting installation.".red());
            if let Some(report) = rollback_artifacts(&root).await {
                if report.removed_root {
                    println!(
                        "Run the command again from {} to retry.",
                        report.working_root.display().to_string().cyan()
                    );
                }
            }
            Err(err)
        }
        other => other,
    }
}

/// Roll back, reporting rather than propagating cleanup errors
async fn rollback_artifacts(root: &Path) -> Option<RollbackReport> {
    match rollback::rollback(root).await {
        Ok(report) => Some(report),
        Err(err) => {
            eprintln!("{} {:#}", "Rollback incomplete:".red(), err);
            None
        }
    }
}

async fn run_pipeline<C: ProductConfig, T: Toolchain>(
    config: &C,
    toolchain: &T,
    request: &ProjectRequest,
    options: &CreateOptions,
    root: &Path,
    app_name: &str,
    context: TemplateContext,
) -> Result<CreatedProject, ScaffoldError> {
    PackageManifest::initial(app_name).save(root).await?;

    let manager = PackageManager::select(toolchain, options.use_npm);

    let resolver = PackageResolver::from_config(config, &options.original_dir);
    let package = resolver
        .resolve(request.version_spec.as_deref(), config.default_package())
        .await;

    let online =
        install::check_online(toolchain, manager == PackageManager::Yarn, &config.resolved_registry_host())
            .await;

    let plan = InstallPlan::new(
        manager,
        online,
        config.runtime_dependencies(),
        &package.install_target,
    );

    let mut shown: Vec<&str> = config.runtime_dependencies().to_vec();
    shown.push(package.name());
    println!("Installing packages. This might take a couple of minutes.");
    println!("Installing {}...", install::describe_dependencies(&shown));
    println!();

    install::install(toolchain, &plan, root, request.verbose).await?;

    compat::check_runtime_compatibility(toolchain, root, package.name()).await?;

    manifest::rewrite_dependencies(root, package.name(), config.runtime_dependencies()).await?;

    run_init_script(toolchain, &package, root, app_name, request.verbose, options).await?;

    let scaffold = template::finalize_extension_files(config, root, &context).await?;

    Ok(CreatedProject {
        root: root.to_path_buf(),
        app_name: app_name.to_string(),
        manager,
        package,
        context,
        scaffold,
    })
}

/// `node -e <require init> -- <json args>` run from the project root
pub fn init_command(
    package_name: &str,
    root: &Path,
    app_name: &str,
    verbose: bool,
    original_dir: &Path,
    template: Option<&str>,
) -> ExternalCommand {
    let script_path = serde_json::Value::String(format!("{}/scripts/init.js", package_name));
    let source = format!(
        "var init = require({}); init.apply(null, JSON.parse(process.argv[1]));",
        script_path
    );
    let data = serde_json::json!([
        root.display().to_string(),
        app_name,
        verbose,
        original_dir.display().to_string(),
        template,
    ]);

    ExternalCommand::new("node")
        .arg("-e")
        .arg(source)
        .arg("--")
        .arg(data.to_string())
}

async fn run_init_script<T: Toolchain>(
    toolchain: &T,
    package: &ResolvedPackage,
    root: &Path,
    app_name: &str,
    verbose: bool,
    options: &CreateOptions,
) -> Result<(), ScaffoldError> {
    let command = init_command(
        package.name(),
        root,
        app_name,
        verbose,
        &options.original_dir,
        options.template.as_deref(),
    );

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
        Err(ScaffoldError::InitFailure {
            command: command.to_string(),
        })
    }
}
