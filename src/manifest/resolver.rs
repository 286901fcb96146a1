use std::path::Path;
use tokio::fs;

use crate::zip::{clean_path, resolve_entry_path};

use super::error::{ManifestError, ResolveError, Result};
use super::model::PackageManifest;

/// Manifest file name at the root of every package.
pub const MANIFEST_FILE_NAME: &str = "imsmanifest.xml";

impl PackageManifest {
    /// Load `imsmanifest.xml` from an extracted package directory.
    pub async fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(MANIFEST_FILE_NAME);
        let unreadable = |source: ManifestError| ResolveError::ManifestUnreadable {
            path: path.clone(),
            source,
        };

        let bytes = fs::read(&path)
            .await
            .map_err(|e| unreadable(e.into()))?;
        let xml = std::str::from_utf8(&bytes).map_err(|e| unreadable(e.into()))?;
        Self::parse(xml).map_err(unreadable)
    }
}

/// Find the file that launches the package extracted in `package_dir`.
///
/// Returns the resource `href` exactly as written in the manifest, once a
/// regular file has been confirmed at that path inside the package.
pub async fn resolve_entry_point(package_dir: &Path) -> Result<String> {
    let manifest = PackageManifest::load(package_dir).await?;
    let resource = manifest.launch_resource()?;
    validate_entry_point(package_dir, &resource.href).await?;

    tracing::debug!(
        package = %package_dir.display(),
        resource = %resource.identifier,
        entry = %resource.href,
        "entry point resolved"
    );
    Ok(resource.href.clone())
}

/// `href` must name a regular file that lies inside the package.
async fn validate_entry_point(package_dir: &Path, href: &str) -> Result<()> {
    let missing = || ResolveError::EntryPointMissing {
        href: href.to_string(),
    };

    let root = std::path::absolute(package_dir).map_err(|_| missing())?;
    let target = resolve_entry_path(&clean_path(&root), href).map_err(|_| missing())?;

    match fs::metadata(&target).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(missing()),
    }
}
