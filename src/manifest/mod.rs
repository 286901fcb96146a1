//! SCORM manifest loading and entry-point resolution.
//!
//! Resolution walks `organizations → item → resource`:
//!
//! 1. load `imsmanifest.xml` from the package directory
//! 2. select the organization named by `organizations@default`
//! 3. take that organization's first item
//! 4. find the resource the item references
//! 5. check the resource's `href` is a file inside the package
//!
//! Any step can fail with the matching [`ResolveError`].

mod error;
mod model;
mod resolver;

pub use error::{ManifestError, ResolveError, ResolveErrorKind};
pub use model::{Organization, OrganizationItem, PackageManifest, Resource};
pub use resolver::{MANIFEST_FILE_NAME, resolve_entry_point};
