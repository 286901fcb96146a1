//! # scormpack
//!
//! Safe extraction of SCORM content packages and resolution of their
//! launchable entry point.
//!
//! Two steps, which share nothing but the filesystem:
//!
//! - [`zip::extract`] unpacks a zip archive into an existing directory,
//!   refusing any entry whose name would land outside it.
//! - [`manifest::resolve_entry_point`] reads `imsmanifest.xml` from that
//!   directory and follows the default organization's first item to the
//!   file that launches the package.
//!
//! [`package::install`] runs both against a fresh directory per package.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dest = Path::new("scorm_packages/course");
//!     tokio::fs::create_dir_all(dest).await?;
//!
//!     scormpack::extract(Path::new("course.zip"), dest).await?;
//!     let entry = scormpack::resolve_entry_point(dest).await?;
//!     println!("launch {}", dest.join(entry).display());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod manifest;
pub mod package;
pub mod zip;

pub use io::{LocalFileReader, ReadAt};
pub use manifest::{PackageManifest, ResolveError, ResolveErrorKind, resolve_entry_point};
pub use package::{InstallError, InstallOptions, InstalledPackage, install};
pub use zip::{ExtractError, ExtractErrorKind, ExtractSummary, ZipExtractor, ZipFileEntry, extract};
