//! Installing a package: unique directory, extraction, then resolution.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::io::LocalFileReader;
use crate::manifest::{ResolveError, resolve_entry_point};
use crate::zip::{ExtractError, ZipExtractor, ZipFileEntry};

/// A package extracted into its own directory with a resolved entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    /// Name of the package directory under the storage root.
    pub id: String,
    /// Launch file, relative to `dir`.
    pub entry: String,
    #[serde(skip)]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Leave the package directory in place when installation fails.
    pub keep_failed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("could not create package directory '{path}'")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("could not unzip package")]
    Extract(#[from] ExtractError),

    #[error("could not resolve package entry point")]
    Resolve(#[from] ResolveError),
}

/// Extract `archive` into a fresh directory under `storage_root` and resolve its entry point.
///
/// `on_entry` is called for each archive entry just before it is written.
/// On failure the new directory is removed unless `options.keep_failed` is set.
pub async fn install<F>(
    archive: &Path,
    storage_root: &Path,
    options: &InstallOptions,
    on_entry: F,
) -> Result<InstalledPackage, InstallError>
where
    F: FnMut(&ZipFileEntry),
{
    let extractor = ZipExtractor::open(archive)?;

    let id = uuid::Uuid::new_v4().to_string();
    let dir = storage_root.join(&id);
    fs::create_dir_all(&dir)
        .await
        .map_err(|source| InstallError::CreateDir {
            path: dir.clone(),
            source,
        })?;

    let result = populate(&extractor, &dir, on_entry).await;
    match result {
        Ok(entry) => {
            tracing::info!(id = %id, entry = %entry, "package installed");
            Ok(InstalledPackage { id, entry, dir })
        }
        Err(err) => {
            if !options.keep_failed {
                discard(&dir).await;
            }
            Err(err)
        }
    }
}

async fn populate<F>(
    extractor: &ZipExtractor<LocalFileReader>,
    dir: &Path,
    on_entry: F,
) -> Result<String, InstallError>
where
    F: FnMut(&ZipFileEntry),
{
    extractor.extract_all(dir, on_entry).await?;
    Ok(resolve_entry_point(dir).await?)
}

async fn discard(dir: &Path) {
    if let Err(err) = fs::remove_dir_all(dir).await {
        tracing::warn!(dir = %dir.display(), error = %err, "failed to remove package directory");
    }
}
