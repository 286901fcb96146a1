use std::io;
use std::path::PathBuf;

/// Coarse classification of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// The archive could not be opened or read as a valid zip.
    OpenFailed,
    /// An entry name resolves outside the destination directory.
    PathTraversal,
    /// The filesystem rejected a create or write.
    WriteFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("failed to open zip '{path}'")]
    Open { path: PathBuf, source: io::Error },

    #[error("not a valid zip archive: {0}")]
    Malformed(String),

    #[error("failed to read archive")]
    Io(#[from] io::Error),

    #[error("zip entry '{entry}' uses unsupported {feature}")]
    Unsupported { entry: String, feature: String },

    #[error("zip entry '{entry}' is corrupted: {reason}")]
    Corrupted { entry: String, reason: String },

    #[error("zip entry has illegal path: {entry}")]
    PathTraversal { entry: String },

    #[error("failed to write '{path}'")]
    Write { path: PathBuf, source: io::Error },
}

impl ExtractError {
    pub fn kind(&self) -> ExtractErrorKind {
        match self {
            Self::Open { .. }
            | Self::Malformed(_)
            | Self::Io(_)
            | Self::Unsupported { .. }
            | Self::Corrupted { .. } => ExtractErrorKind::OpenFailed,
            Self::PathTraversal { .. } => ExtractErrorKind::PathTraversal,
            Self::Write { .. } => ExtractErrorKind::WriteFailed,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Write { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
