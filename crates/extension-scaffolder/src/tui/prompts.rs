//! Charm-style CLI framing using cliclack

use crate::create::{create_extension, CreatedProject};
use crate::error::ScaffoldError;
use crate::install::PackageManager;
use crate::product::ProductConfig;
use crate::request::{CreateOptions, ProjectRequest};
use crate::runtime::{check, SystemToolchain};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project directory to create
    pub directory: Option<String>,

    /// Version, tag, tarball, git URL or `file:` path of the package to build on
    pub scripts_version: Option<String>,

    /// Print additional logs
    pub verbose: bool,

    /// Install with npm even when yarn is available
    pub use_npm: bool,

    /// Template name handed to the init script
    pub template: Option<String>,
}

/// Run the CLI: prompt for what is missing, bootstrap, print next steps
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs) -> Result<()> {
    cliclack::intro(config.display_name())?;

    // Step 1: Select directory
    let directory = select_directory(&args)?;

    // Step 2: Report runtimes (informational; the pipeline decides for itself)
    report_runtimes(args.use_npm)?;

    // Step 3: Bootstrap
    let original_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let request = ProjectRequest {
        name: directory,
        verbose: args.verbose,
        version_spec: args.scripts_version.clone(),
    };
    let options = CreateOptions {
        original_dir,
        use_npm: args.use_npm,
        template: args.template.clone(),
    };

    match create_extension(config, &SystemToolchain, &request, &options).await {
        Ok(project) => {
            // Step 4: Show next steps
            print_next_steps(config, &project)?;
            Ok(())
        }
        Err(err) => {
            report_error(&err)?;
            Err(err.into())
        }
    }
}

fn select_directory(args: &CreateArgs) -> Result<String> {
    if let Some(dir) = args.directory.as_deref().filter(|d| !d.trim().is_empty()) {
        cliclack::log::info(format!("Using directory: {}", dir))?;
        return Ok(dir.to_string());
    }

    let input: String = cliclack::input("Project directory")
        .placeholder("my-divi-extension")
        .validate(|input: &String| {
            if input.trim().is_empty() {
                Err("Please specify the project directory")
            } else {
                Ok(())
            }
        })
        .interact()?;

    Ok(input.trim().to_string())
}

fn report_runtimes(use_npm: bool) -> Result<()> {
    let node = check::check_node();
    if node.available {
        cliclack::log::success(format!(
            "{} ({})",
            node.name,
            node.version.as_deref().unwrap_or("unknown")
        ))?;
    } else {
        cliclack::log::warning(
            "Node.js was not found; the init script needs it (install from https://nodejs.org)",
        )?;
    }

    let yarn = check::check_yarn();
    let manager = if !use_npm && yarn.available {
        yarn
    } else {
        check::check_npm()
    };
    if manager.available {
        cliclack::log::success(format!(
            "Installing with {} ({})",
            manager.name,
            manager.version.as_deref().unwrap_or("unknown")
        ))?;
    } else {
        cliclack::log::warning(format!("{} was not found", manager.name))?;
    }

    Ok(())
}

fn report_error(err: &ScaffoldError) -> Result<()> {
    match err {
        ScaffoldError::Unexpected(inner) => {
            cliclack::log::error(format!(
                "{}\n{:?}",
                "Unexpected error. Please report it as a bug:".red(),
                inner
            ))?;
        }
        ScaffoldError::InstallFailure { command } | ScaffoldError::InitFailure { command } => {
            cliclack::log::error(format!("{} has failed.", command.cyan()))?;
        }
        other => {
            cliclack::log::error(other.to_string())?;
        }
    }
    cliclack::outro_cancel("Project was not created")?;
    Ok(())
}

fn print_next_steps<C: ProductConfig>(config: &C, project: &CreatedProject) -> Result<()> {
    let manager = project.manager;

    cliclack::log::success(format!(
        "Created {} at {}",
        project.app_name,
        project.root.display()
    ))?;
    cliclack::log::info(format!(
        "Inside that directory, you can run several commands:\n\n  {}\n    Starts the development server.\n\n  {}\n    Bundles the extension into static files for production.",
        manager.run_script("start").cyan(),
        manager.run_script("build").cyan(),
    ))?;

    let steps = config.next_steps(&project.root, manager == PackageManager::Yarn);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro(format!("Docs: {}  Happy hacking!", config.docs_url()))?;

    Ok(())
}
