//! Token substitution and renaming across the scaffold files
//!
//! The init script copies the scaffold into the project root with placeholder tokens;
//! this pass replaces them with names derived from the project directory.

use crate::error::ScaffoldError;
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Maximum number of characters kept for the naming prefix
const PREFIX_LENGTH: usize = 4;

const SEPARATORS: &[char] = &['-', '_'];

/// Names substituted into the scaffold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    /// `foo`
    pub prefix: String,
    /// `FOO`
    pub prefix_upper: String,
    /// `Foo`
    pub prefix_title: String,
    /// Project directory name
    pub app_name: String,
    /// WordPress text domain
    pub text_domain: String,
}

impl TemplateContext {
    /// Derive every token value from the project name
    ///
    /// Fails when nothing is left to build a prefix from, e.g. a project named `divi`.
    pub fn derive(app_name: &str, prefix_word: &str) -> Result<Self, ScaffoldError> {
        let prefix = derive_prefix(app_name, prefix_word);
        if prefix.is_empty() {
            return Err(ScaffoldError::InvalidName {
                name: app_name.to_string(),
                problems: vec![format!(
                    "name must contain at least one letter or digit after the leading \"{}\"",
                    prefix_word
                )],
            });
        }

        let prefix_upper = prefix.to_uppercase();
        let mut prefix_title: String = prefix_upper.chars().take(1).collect();
        prefix_title.extend(prefix.chars().skip(1));

        Ok(Self {
            prefix,
            prefix_upper,
            prefix_title,
            app_name: app_name.to_string(),
            text_domain: app_name.to_string(),
        })
    }

    /// Replacements applied in order
    pub fn tokens(&self) -> [(&'static str, &str); 5] {
        [
            ("__Prefix", self.prefix_title.as_str()),
            ("__PREFIX", self.prefix_upper.as_str()),
            ("__prefix", self.prefix.as_str()),
            ("__name", self.app_name.as_str()),
            ("__textdomain", self.text_domain.as_str()),
        ]
    }

    pub fn substitute(&self, content: &str) -> String {
        self.tokens()
            .into_iter()
            .fold(content.to_string(), |acc, (token, value)| acc.replace(token, value))
    }
}

/// `divi-foo-extension` → `foo`
pub fn derive_prefix(app_name: &str, prefix_word: &str) -> String {
    let rest = match app_name.get(..prefix_word.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix_word) => &app_name[prefix_word.len()..],
        _ => app_name,
    };
    let rest = rest.strip_prefix(SEPARATORS).unwrap_or(rest);

    let truncated: String = rest.chars().take(PREFIX_LENGTH).collect::<String>().to_lowercase();
    match truncated.strip_suffix(SEPARATORS) {
        Some(trimmed) => trimmed.to_string(),
        None => truncated,
    }
}

/// Result of a scaffold pass
#[derive(Debug, Clone, Default)]
pub struct FinalizeReport {
    /// Files rewritten in place (paths relative to the project root)
    pub rewritten: Vec<String>,
    /// Successful renames, `(from, to)`
    pub renamed: Vec<(PathBuf, PathBuf)>,
}

/// Substitute tokens in every scaffold file, then rename the two templated files
///
/// Rewrite failures are errors. Rename failures are reported and skipped so a
/// finished install is never rolled back over a file name.
pub async fn finalize_extension_files<C: ProductConfig>(
    config: &C,
    root: &Path,
    context: &TemplateContext,
) -> Result<FinalizeReport, ScaffoldError> {
    let mut report = FinalizeReport::default();

    for file in config.scaffold_files() {
        rewrite_file(&root.join(file), context).await?;
        report.rewritten.push(file.to_string());
    }

    let primary = root.join(config.primary_template_file());
    let primary_target = primary_template_target(&primary);
    let module = root.join(config.customization_module_file());
    let module_target = customization_module_target(&module, context);

    let (primary_result, module_result) = tokio::join!(
        rename_file(&primary, &primary_target),
        rename_file(&module, &module_target)
    );

    for (result, from, to) in [
        (primary_result, primary, primary_target),
        (module_result, module, module_target),
    ] {
        match result {
            Ok(()) => report.renamed.push((from, to)),
            Err(err) => eprintln!("{} {:#}", "Warning:".yellow(), err),
        }
    }

    Ok(report)
}

async fn rewrite_file(path: &Path, context: &TemplateContext) -> Result<()> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read scaffold file: {}", path.display()))?;
    fs::write(path, context.substitute(&content))
        .await
        .with_context(|| format!("Failed to write scaffold file: {}", path.display()))?;
    Ok(())
}

async fn rename_file(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }
    fs::rename(from, to)
        .await
        .with_context(|| format!("Failed to rename {} to {}", from.display(), to.display()))
}

/// `<root>/template.php` → `<root>/<root name>.php`
pub fn primary_template_target(path: &Path) -> PathBuf {
    let dir_name = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string());
    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());

    match (dir_name, file_name) {
        (Some(dir_name), Some(file_name)) => {
            path.with_file_name(file_name.replacen("template", &dir_name, 1))
        }
        _ => path.to_path_buf(),
    }
}

/// `includes/__PrefixExtension.php` → `includes/FooExtension.php`
pub fn customization_module_target(path: &Path, context: &TemplateContext) -> PathBuf {
    match path.file_name().map(|n| n.to_string_lossy().to_string()) {
        Some(file_name) => path.with_file_name(file_name.replace("__Prefix", &context.prefix_title)),
        None => path.to_path_buf(),
    }
}
