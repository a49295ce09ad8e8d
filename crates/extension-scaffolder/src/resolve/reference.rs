//! Classification of version/source specifiers

use crate::runtime::check::parse_version;
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Where the package to install comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageReference {
    /// An exact release of the default package
    SemverTag { package: String, version: Version },
    /// A gzipped tarball served over HTTP(S)
    TarballUrl(Url),
    /// A gzipped tarball on disk (absolute)
    TarballPath(PathBuf),
    /// A `git+` repository URL with an optional `#ref`
    GitUrl { url: String, reference: Option<String> },
    /// A `file:` specifier pointing at an unpacked package directory (absolute)
    LocalDirectory(PathBuf),
    /// A package name followed by `@tag` or `@range`
    Tagged { name: String, tag: String },
    /// Anything else, installed as written
    PlainName(String),
}

impl PackageReference {
    /// Classify a specifier; the first matching rule wins
    ///
    /// Relative paths are resolved against `original_dir` because the package manager
    /// runs inside the project root, not where the user launched the CLI.
    pub fn classify(spec: Option<&str>, default_package: &str, original_dir: &Path) -> Self {
        let spec = match spec.map(str::trim).filter(|s| !s.is_empty()) {
            Some(spec) => spec,
            None => return Self::PlainName(default_package.to_string()),
        };

        if let Ok(version) = parse_version(spec) {
            return Self::SemverTag {
                package: default_package.to_string(),
                version,
            };
        }

        if is_tarball(spec) {
            if let Ok(url) = Url::parse(spec) {
                if matches!(url.scheme(), "http" | "https") {
                    return Self::TarballUrl(url);
                }
            }
            let path = spec.strip_prefix("file:").unwrap_or(spec);
            return Self::TarballPath(original_dir.join(path));
        }

        if spec.starts_with("git+") {
            let (url, reference) = match spec.split_once('#') {
                Some((url, reference)) => (url.to_string(), Some(reference.to_string())),
                None => (spec.to_string(), None),
            };
            return Self::GitUrl { url, reference };
        }

        if let Some(path) = spec.strip_prefix("file:") {
            return Self::LocalDirectory(original_dir.join(path));
        }

        // Index 0 is skipped so scoped names like `@acme/pkg` are not split
        if let Some(at) = spec.get(1..).and_then(|rest| rest.find('@')) {
            let at = at + 1;
            return Self::Tagged {
                name: spec[..at].to_string(),
                tag: spec[at + 1..].to_string(),
            };
        }

        Self::PlainName(spec.to_string())
    }

    /// Argument handed to the package manager
    pub fn install_target(&self) -> String {
        match self {
            Self::SemverTag { package, version } => format!("{}@{}", package, version),
            Self::TarballUrl(url) => url.to_string(),
            Self::TarballPath(path) => path.display().to_string(),
            Self::GitUrl { url, reference } => match reference {
                Some(reference) => format!("{}#{}", url, reference),
                None => url.clone(),
            },
            Self::LocalDirectory(path) => format!("file:{}", path.display()),
            Self::Tagged { name, tag } => format!("{}@{}", name, tag),
            Self::PlainName(name) => name.clone(),
        }
    }

    /// Package name known without touching the network or the filesystem
    ///
    /// Tarballs and local directories return the name guessed from their path; the
    /// resolver prefers the name declared inside them.
    pub fn static_name(&self) -> String {
        match self {
            Self::SemverTag { package, .. } => package.clone(),
            Self::TarballUrl(url) => {
                let file_name = url
                    .path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .unwrap_or(url.as_str());
                name_from_tarball_stem(file_name)
            }
            Self::TarballPath(path) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                name_from_tarball_stem(&file_name)
            }
            Self::GitUrl { url, .. } => repository_name(url),
            Self::LocalDirectory(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Tagged { name, .. } => name.clone(),
            Self::PlainName(name) => name.clone(),
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.install_target())
    }
}

fn is_tarball(spec: &str) -> bool {
    spec.contains(".tgz") || spec.ends_with(".tar.gz")
}

/// `divi-scripts-1.2.0.tgz` → `divi-scripts`
pub fn name_from_tarball_stem(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".tgz")
        .or_else(|| file_name.strip_suffix(".tar.gz"))
        .unwrap_or(file_name);

    let bytes = stem.as_bytes();
    let cut = (1..bytes.len())
        .find(|&i| bytes[i - 1] == b'-' && bytes[i].is_ascii_digit())
        .map(|i| i - 1);

    match cut {
        Some(end) if end > 0 => stem[..end].to_string(),
        _ => stem.to_string(),
    }
}

/// `git+https://host/org/my-pkg.git` → `my-pkg`
fn repository_name(url: &str) -> String {
    let last = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "divi-scripts";

    fn classify(spec: &str) -> PackageReference {
        PackageReference::classify(Some(spec), DEFAULT, Path::new("/home/dev"))
    }

    #[test]
    fn test_absent_spec_uses_default() {
        let reference = PackageReference::classify(None, DEFAULT, Path::new("/"));
        assert_eq!(reference, PackageReference::PlainName(DEFAULT.to_string()));
        assert_eq!(reference.install_target(), DEFAULT);

        let blank = PackageReference::classify(Some("  "), DEFAULT, Path::new("/"));
        assert_eq!(blank.install_target(), DEFAULT);
    }

    #[test]
    fn test_semver_targets_default_package() {
        for spec in ["1.0.0", "2.3.4-beta.1", "0.0.1+build.5", "v1.2.3"] {
            let reference = classify(spec);
            assert!(matches!(reference, PackageReference::SemverTag { .. }));
            assert_eq!(reference.static_name(), DEFAULT);
            let expected = format!("{}@{}", DEFAULT, spec.trim_start_matches('v'));
            assert_eq!(reference.install_target(), expected);
        }
    }

    #[test]
    fn test_tarball_url() {
        let reference = classify("https://example.com/dl/divi-scripts-1.2.0.tgz");
        assert!(matches!(reference, PackageReference::TarballUrl(_)));
        assert_eq!(
            reference.install_target(),
            "https://example.com/dl/divi-scripts-1.2.0.tgz"
        );
        assert_eq!(reference.static_name(), "divi-scripts");
    }

    #[test]
    fn test_tarball_path_is_absolutized() {
        let reference = classify("../forks/my-scripts-0.4.1.tgz");
        assert_eq!(
            reference,
            PackageReference::TarballPath(PathBuf::from("/home/dev/../forks/my-scripts-0.4.1.tgz"))
        );
        assert_eq!(reference.static_name(), "my-scripts");

        let file_prefixed = classify("file:pkgs/custom.tar.gz");
        assert_eq!(
            file_prefixed,
            PackageReference::TarballPath(PathBuf::from("/home/dev/pkgs/custom.tar.gz"))
        );
        assert_eq!(file_prefixed.static_name(), "custom");
    }

    #[test]
    fn test_git_url_with_ref() {
        let reference = classify("git+https://example.com/x/my-pkg.git#v1.2.3");
        assert_eq!(
            reference,
            PackageReference::GitUrl {
                url: "git+https://example.com/x/my-pkg.git".to_string(),
                reference: Some("v1.2.3".to_string()),
            }
        );
        assert_eq!(reference.static_name(), "my-pkg");
        assert_eq!(
            reference.install_target(),
            "git+https://example.com/x/my-pkg.git#v1.2.3"
        );
    }

    #[test]
    fn test_git_ssh_url() {
        let reference = classify("git+ssh://git@github.com:acme/divi-fork.git");
        assert_eq!(reference.static_name(), "divi-fork");
    }

    #[test]
    fn test_file_directory() {
        let reference = classify("file:../scripts");
        assert_eq!(
            reference,
            PackageReference::LocalDirectory(PathBuf::from("/home/dev/../scripts"))
        );
        assert_eq!(reference.install_target(), "file:/home/dev/../scripts");
        assert_eq!(reference.static_name(), "scripts");
    }

    #[test]
    fn test_tag_split_respects_scope() {
        let tagged = classify("divi-scripts@next");
        assert_eq!(
            tagged,
            PackageReference::Tagged {
                name: "divi-scripts".to_string(),
                tag: "next".to_string(),
            }
        );

        let scoped = classify("@acme/divi-scripts@^2.0.0");
        assert_eq!(scoped.static_name(), "@acme/divi-scripts");
        assert_eq!(scoped.install_target(), "@acme/divi-scripts@^2.0.0");

        let scoped_plain = classify("@acme/divi-scripts");
        assert_eq!(
            scoped_plain,
            PackageReference::PlainName("@acme/divi-scripts".to_string())
        );
    }

    #[test]
    fn test_plain_name() {
        let reference = classify("my-divi-scripts");
        assert_eq!(reference.static_name(), "my-divi-scripts");
        assert_eq!(reference.install_target(), "my-divi-scripts");
    }

    #[test]
    fn test_tarball_stem() {
        assert_eq!(name_from_tarball_stem("divi-scripts-1.2.0.tgz"), "divi-scripts");
        assert_eq!(name_from_tarball_stem("scripts.tgz"), "scripts");
        assert_eq!(name_from_tarball_stem("my-pkg-v2.tgz"), "my-pkg-v2");
        assert_eq!(name_from_tarball_stem("-1.0.0.tgz"), "-1.0.0");
    }
}
