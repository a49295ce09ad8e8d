use crate::product::ProductConfig;
use std::path::Path;

#[derive(Clone)]
pub(crate) struct TestConfig;

impl ProductConfig for TestConfig {
    fn name(&self) -> &'static str {
        "create-test-extension"
    }

    fn display_name(&self) -> &'static str {
        "Test Extension"
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
        "CREATE_TEST_EXTENSION_REGISTRY"
    }

    fn scaffold_files(&self) -> &'static [&'static str] {
        &[
            "template.php",
            "includes/loader.php",
            "includes/__PrefixExtension.php",
        ]
    }

    fn primary_template_file(&self) -> &'static str {
        "template.php"
    }

    fn customization_module_file(&self) -> &'static str {
        "includes/__PrefixExtension.php"
    }

    fn docs_url(&self) -> &'static str {
        "https://example.com/docs"
    }

    fn next_steps(&self, _dir: &Path, _use_yarn: bool) -> Vec<String> {
        Vec::new()
    }

    fn cli_description(&self) -> &'static str {
        "Test extension scaffolder"
    }
}
