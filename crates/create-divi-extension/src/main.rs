//! create-divi-extension - Bootstrapping for Divi extensions

use anyhow::Result;
use clap::Parser;
use extension_scaffolder::tui::CreateArgs;
use extension_scaffolder::{PackageManager, ProductConfig};
use std::path::Path;

/// Divi product configuration
#[derive(Clone)]
pub struct DiviConfig;

impl ProductConfig for DiviConfig {
    fn name(&self) -> &'static str {
        "create-divi-extension"
    }

    fn display_name(&self) -> &'static str {
        "Divi extension"
    }

    fn default_package(&self) -> &'static str {
        "divi-scripts"
    }

    fn runtime_dependencies(&self) -> &'static [&'static str] {
        &["react", "react-dom"]
    }

    fn prefix_word(&self) -> &'static str {
        "divi"
    }

    fn registry_host_env(&self) -> &'static str {
        "CREATE_DIVI_EXTENSION_REGISTRY"
    }

    fn scaffold_files(&self) -> &'static [&'static str] {
        &[
            "template.php",
            "includes/loader.js",
            "includes/loader.php",
            "includes/__PrefixExtension.php",
            "includes/modules/HelloWorld/HelloWorld.php",
            "includes/modules/HelloWorld/HelloWorld.jsx",
        ]
    }

    fn primary_template_file(&self) -> &'static str {
        "template.php"
    }

    fn customization_module_file(&self) -> &'static str {
        "includes/__PrefixExtension.php"
    }

    fn docs_url(&self) -> &'static str {
        "https://www.elegantthemes.com/documentation/developers/"
    }

    fn next_steps(&self, dir: &Path, use_yarn: bool) -> Vec<String> {
        let manager = if use_yarn {
            PackageManager::Yarn
        } else {
            PackageManager::Npm
        };
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        // cd to directory if not current
        if current.as_deref() != Some(dir) {
            let shown = current
                .as_deref()
                .and_then(|cwd| dir.strip_prefix(cwd).ok())
                .unwrap_or(dir);
            steps.push(format!("cd {}", shown.display()));
        }

        steps.push(manager.run_script("start"));
        steps.push("Activate the extension from the WordPress plugins screen".to_string());

        steps
    }

    fn cli_description(&self) -> &'static str {
        "Bootstrap a Divi extension on top of divi-scripts"
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-divi-extension")]
#[command(about = "Bootstrap a Divi extension on top of divi-scripts")]
#[command(version)]
pub struct Args {
    /// Project directory to create
    #[arg(value_name = "project-directory")]
    pub directory: Option<String>,

    /// Use a non-standard version of divi-scripts (version, tag, tarball, git URL or file: path)
    #[arg(long = "scripts-version")]
    pub scripts_version: Option<String>,

    /// Print additional logs
    #[arg(long)]
    pub verbose: bool,

    /// Install with npm even when yarn is available
    #[arg(long = "use-npm")]
    pub use_npm: bool,

    /// Template name passed to the init script
    #[arg(long)]
    pub template: Option<String>,
}

impl From<Args> for CreateArgs {
    fn from(args: Args) -> Self {
        CreateArgs {
            directory: args.directory,
            scripts_version: args.scripts_version,
            verbose: args.verbose,
            use_npm: args.use_npm,
            template: args.template,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = DiviConfig;

    let result = extension_scaffolder::run(&config, args.into()).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    // The front end has already reported the failure
    if result.is_err() {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_flags() {
        let args = Args::parse_from([
            "create-divi-extension",
            "divi-sample",
            "--scripts-version",
            "1.2.3",
            "--use-npm",
            "--verbose",
        ]);
        assert_eq!(args.directory.as_deref(), Some("divi-sample"));
        assert_eq!(args.scripts_version.as_deref(), Some("1.2.3"));
        assert!(args.use_npm);
        assert!(args.verbose);
        assert!(args.template.is_none());
    }

    #[test]
    fn test_args_convert_to_create_args() {
        let args = Args::parse_from([
            "create-divi-extension",
            "divi-sample",
            "--template",
            "typescript",
        ]);
        let create: CreateArgs = args.into();
        assert_eq!(create.directory.as_deref(), Some("divi-sample"));
        assert_eq!(create.template.as_deref(), Some("typescript"));
        assert!(create.scripts_version.is_none());
        assert!(!create.use_npm);
    }

    #[test]
    fn test_args_directory_is_optional() {
        let args = Args::parse_from(["create-divi-extension"]);
        assert!(args.directory.is_none());
        assert!(!args.use_npm);
    }

    #[test]
    fn test_reserved_names_include_scripts_package() {
        let names = DiviConfig.reserved_names();
        assert_eq!(names, vec!["divi-scripts", "react", "react-dom"]);
    }

    #[test]
    fn test_next_steps_use_manager_scripts() {
        let dir = Path::new("/nowhere/divi-sample");
        let yarn = DiviConfig.next_steps(dir, true);
        assert_eq!(yarn[0], "cd /nowhere/divi-sample");
        assert_eq!(yarn[1], "yarn start");

        let npm = DiviConfig.next_steps(dir, false);
        assert_eq!(npm[1], "npm start");
    }

    #[test]
    fn test_scaffold_files_cover_renamed_files() {
        let files = DiviConfig.scaffold_files();
        assert!(files.contains(&DiviConfig.primary_template_file()));
        assert!(files.contains(&DiviConfig.customization_module_file()));
    }
}
