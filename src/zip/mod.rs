//! ZIP archive parsing and safe extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: ZIP format records (EOCD, ZIP64 records, entry metadata)
//! - [`parser`]: binary parsing of those records through [`ReadAt`](crate::io::ReadAt)
//! - [`name`]: decoding of stored entry names (UTF-8 or CP437)
//! - [`path`]: resolution of untrusted entry names under the destination root
//! - [`extractor`]: extraction of a whole archive into a directory
//!
//! ## Supported Features
//!
//! - Standard ZIP format and ZIP64 extensions
//! - STORED and DEFLATE compression, with size and CRC-32 verification
//! - Unix permission bits from the external attributes
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - Symlink entries are written as regular files holding the link target

mod error;
mod extractor;
mod name;
mod parser;
mod path;
mod structures;

pub use error::{ExtractError, ExtractErrorKind};
pub use extractor::{ExtractSummary, ZipExtractor, extract};
pub use parser::ZipParser;
pub use path::{clean_path, is_safe_entry_name, resolve_entry_path};
pub use structures::{CompressionMethod, ZipFileEntry};
