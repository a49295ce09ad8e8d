//! Reading the declared package name out of tarballs and package directories
//!
//! Archives are staged in a scoped temporary directory that is removed when the
//! read finishes, whether it succeeded or not.

use crate::manifest::{InstalledPackage, MANIFEST_FILE};
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;
use walkdir::WalkDir;

/// Tarball location
#[derive(Debug, Clone, Copy)]
pub enum TarballSource<'a> {
    Remote(&'a Url),
    Local(&'a Path),
}

/// Download or copy a tarball, unpack it, and return its declared name
pub async fn read_tarball_name(client: &reqwest::Client, source: TarballSource<'_>) -> Result<String> {
    let staging = tempfile::Builder::new()
        .prefix("create-divi-extension-")
        .tempdir()
        .context("Failed to create temporary directory")?;
    let archive_path = staging.path().join("package.tgz");
    let extract_dir = staging.path().join("extracted");

    match source {
        TarballSource::Remote(url) => {
            let response = client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to download {}", url))?;

            if !response.status().is_success() {
                anyhow::bail!("Failed to download {}: HTTP {}", url, response.status());
            }

            let bytes = response.bytes().await?;
            fs::write(&archive_path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", archive_path.display()))?;
        }
        TarballSource::Local(path) => {
            fs::copy(path, &archive_path)
                .await
                .with_context(|| format!("Failed to copy {}", path.display()))?;
        }
    }

    let unpack_from = archive_path.clone();
    let unpack_to = extract_dir.clone();
    tokio::task::spawn_blocking(move || unpack_tarball(&unpack_from, &unpack_to))
        .await
        .context("Tarball extraction task panicked")??;

    let manifest_path = find_manifest(&extract_dir)?;
    read_declared_name(&manifest_path).await
}

/// Read the declared name of an unpacked package directory
pub async fn read_directory_name(dir: &Path) -> Result<String> {
    read_declared_name(&dir.join(MANIFEST_FILE)).await
}

fn unpack_tarball(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dest_dir)?;
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open {}", archive_path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest_dir)
        .with_context(|| format!("Failed to unpack {}", archive_path.display()))?;
    Ok(())
}

/// npm packs everything under `package/`; other tools put the manifest at the top
fn find_manifest(dir: &Path) -> Result<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE)
        .min_by_key(|entry| entry.depth())
        .map(|entry| entry.into_path())
        .ok_or_else(|| anyhow::anyhow!("No {} found in package", MANIFEST_FILE))
}

async fn read_declared_name(manifest_path: &Path) -> Result<String> {
    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
    let package: InstalledPackage = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;
    package
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| anyhow::anyhow!("{} declares no name", manifest_path.display()))
}
