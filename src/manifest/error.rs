use std::io;
use std::path::PathBuf;

/// Why a manifest could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("manifest is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed XML")]
    Syntax(#[from] quick_xml::Error),

    #[error("unexpected manifest structure")]
    Parse(#[from] quick_xml::DeError),

    #[error("root element is <{0}>, expected <manifest>")]
    UnexpectedRoot(String),

    #[error("document has no root element")]
    MissingRoot,
}

/// Coarse classification of resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveErrorKind {
    ManifestUnreadable,
    NoDefaultOrganization,
    NoOrganizationItems,
    ResourceNotFound,
    EntryPointMissing,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("could not load SCORM manifest '{path}'")]
    ManifestUnreadable { path: PathBuf, source: ManifestError },

    #[error("manifest has no organization matching default '{default}'")]
    NoDefaultOrganization { default: String },

    #[error("organization '{organization}' has no items")]
    NoOrganizationItems { organization: String },

    #[error("resource '{identifier}' not found")]
    ResourceNotFound { identifier: String },

    #[error("entry point '{href}' not found")]
    EntryPointMissing { href: String },
}

impl ResolveError {
    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            Self::ManifestUnreadable { .. } => ResolveErrorKind::ManifestUnreadable,
            Self::NoDefaultOrganization { .. } => ResolveErrorKind::NoDefaultOrganization,
            Self::NoOrganizationItems { .. } => ResolveErrorKind::NoOrganizationItems,
            Self::ResourceNotFound { .. } => ResolveErrorKind::ResourceNotFound,
            Self::EntryPointMissing { .. } => ResolveErrorKind::EntryPointMissing,
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
