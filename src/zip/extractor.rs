use flate2::{Crc, Decompress, DecompressError, FlushDecompress, Status};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::{LocalFileReader, ReadAt};

use super::error::{ExtractError, Result};
use super::parser::ZipParser;
use super::path::{clean_path, resolve_entry_path};
use super::structures::{CompressionMethod, ZipFileEntry};

/// Mode for files archived without unix permissions.
#[cfg(unix)]
const DEFAULT_FILE_MODE: u32 = 0o644;
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

const COPY_BUF_SIZE: usize = 64 * 1024;

/// Counts of what an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    reader: R,
}

impl ZipExtractor<LocalFileReader> {
    /// Open a zip archive on the local filesystem.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = LocalFileReader::open(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(reader))
    }
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn parser(&self) -> ZipParser<'_, R> {
        ZipParser::new(&self.reader)
    }

    /// List all entries in archive order.
    pub async fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser().list_files().await
    }

    /// Extract every entry under `destination`, which must already exist.
    ///
    /// All entry names are checked before anything is written, so an
    /// archive with a single unsafe name leaves `destination` untouched.
    /// A failure while writing stops at that entry and leaves earlier
    /// output in place; removing it is up to the caller.
    pub async fn extract_all<F>(&self, destination: &Path, mut on_entry: F) -> Result<ExtractSummary>
    where
        F: FnMut(&ZipFileEntry),
    {
        let root = destination_root(destination).await?;
        let entries = self.list_files().await?;

        let mut plan = Vec::with_capacity(entries.len());
        for entry in entries {
            let target = resolve_entry_path(&root, &entry.file_name)?;
            if !entry.is_directory {
                check_supported(&entry)?;
            }
            plan.push((entry, target));
        }

        let parser = self.parser();
        let mut summary = ExtractSummary::default();
        for (entry, target) in &plan {
            on_entry(entry);
            if entry.is_directory {
                create_dir_all(target).await?;
                summary.directories += 1;
            } else {
                summary.bytes += self.write_file(&parser, entry, target).await?;
                summary.files += 1;
            }
            tracing::trace!(entry = %entry.file_name, path = %target.display(), "extracted");
        }

        tracing::debug!(
            destination = %root.display(),
            files = summary.files,
            directories = summary.directories,
            bytes = summary.bytes,
            "archive extracted"
        );
        Ok(summary)
    }

    /// Decompress one file entry into `target`, creating parents as needed.
    ///
    /// Compressed data is read in `COPY_BUF_SIZE` chunks, so memory use does
    /// not depend on the entry size. Returns the number of bytes written.
    async fn write_file(
        &self,
        parser: &ZipParser<'_, R>,
        entry: &ZipFileEntry,
        target: &Path,
    ) -> Result<u64> {
        if let Some(parent) = target.parent() {
            create_dir_all(parent).await?;
        }

        let data_offset = parser.get_data_offset(entry).await?;
        let mut chunks = ChunkReader {
            reader: &self.reader,
            offset: data_offset,
            remaining: entry.compressed_size,
            buf: vec![0u8; COPY_BUF_SIZE],
        };

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(entry.unix_mode().unwrap_or(DEFAULT_FILE_MODE));
        let file = options
            .open(target)
            .await
            .map_err(ExtractError::write(target))?;
        let mut sink = EntrySink {
            entry,
            target,
            file,
            crc: Crc::new(),
            written: 0,
        };

        match entry.compression_method {
            CompressionMethod::Deflate if entry.compressed_size > 0 => {
                inflate(&mut chunks, &mut sink).await?
            }
            _ => {
                while let Some(chunk) = chunks.next_chunk().await? {
                    sink.write(chunk).await?;
                }
            }
        }
        sink.finish().await
    }
}

/// Sequential reader over one entry's compressed bytes.
struct ChunkReader<'a, R: ReadAt> {
    reader: &'a R,
    offset: u64,
    remaining: u64,
    buf: Vec<u8>,
}

impl<R: ReadAt> ChunkReader<'_, R> {
    async fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let len = self.remaining.min(self.buf.len() as u64) as usize;
        self.reader
            .read_exact_at(self.offset, &mut self.buf[..len])
            .await?;
        self.offset += len as u64;
        self.remaining -= len as u64;
        Ok(Some(&self.buf[..len]))
    }
}

/// Destination file of one entry, tracking size and CRC-32 of what was written.
struct EntrySink<'a> {
    entry: &'a ZipFileEntry,
    target: &'a Path,
    file: fs::File,
    crc: Crc,
    written: u64,
}

impl EntrySink<'_> {
    fn corrupted(&self, reason: impl Into<String>) -> ExtractError {
        ExtractError::Corrupted {
            entry: self.entry.file_name.clone(),
            reason: reason.into(),
        }
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.written += chunk.len() as u64;
        if self.written > self.entry.uncompressed_size {
            return Err(self.corrupted(format!(
                "expands past its declared size of {} bytes",
                self.entry.uncompressed_size
            )));
        }
        self.crc.update(chunk);
        self.file
            .write_all(chunk)
            .await
            .map_err(ExtractError::write(self.target))
    }

    async fn finish(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .map_err(ExtractError::write(self.target))?;

        if self.written != self.entry.uncompressed_size {
            return Err(self.corrupted(format!(
                "expected {} bytes, got {}",
                self.entry.uncompressed_size, self.written
            )));
        }
        if self.crc.sum() != self.entry.crc32 {
            return Err(self.corrupted(format!(
                "CRC-32 mismatch (expected {:08x}, got {:08x})",
                self.entry.crc32,
                self.crc.sum()
            )));
        }
        Ok(self.written)
    }
}

/// Inflate a raw DEFLATE stream chunk by chunk into `sink`.
///
/// Output is drained through a fixed buffer, so a highly compressed chunk
/// never expands in memory. Bytes after the end of the stream are ignored.
async fn inflate<R: ReadAt>(
    chunks: &mut ChunkReader<'_, R>,
    sink: &mut EntrySink<'_>,
) -> Result<()> {
    let mut inflater = Decompress::new(false);
    let mut output = vec![0u8; COPY_BUF_SIZE];

    while let Some(chunk) = chunks.next_chunk().await? {
        let mut input = chunk;
        loop {
            let (consumed, produced, status) = inflate_step(&mut inflater, input, &mut output)
                .map_err(|e| sink.corrupted(e.to_string()))?;
            input = &input[consumed..];
            sink.write(&output[..produced]).await?;

            if status == Status::StreamEnd {
                return Ok(());
            }
            if consumed == 0 && produced == 0 {
                if input.is_empty() {
                    break;
                }
                return Err(sink.corrupted("deflate stream stopped making progress"));
            }
            if input.is_empty() && produced < output.len() {
                break;
            }
        }
    }

    // Input exhausted; drain whatever the inflater still holds.
    loop {
        let (_, produced, status) = inflate_step(&mut inflater, &[], &mut output)
            .map_err(|e| sink.corrupted(e.to_string()))?;
        sink.write(&output[..produced]).await?;
        if status == Status::StreamEnd {
            return Ok(());
        }
        if produced == 0 {
            return Err(sink.corrupted("deflate stream is truncated"));
        }
    }
}

/// One call into the inflater, returning bytes consumed and produced.
fn inflate_step(
    inflater: &mut Decompress,
    input: &[u8],
    output: &mut [u8],
) -> std::result::Result<(usize, usize, Status), DecompressError> {
    let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
    let status = inflater.decompress(input, output, FlushDecompress::None)?;
    Ok((
        (inflater.total_in() - in_before) as usize,
        (inflater.total_out() - out_before) as usize,
        status,
    ))
}

/// Extract the zip archive at `archive_path` into the existing directory `destination`.
pub async fn extract(archive_path: &Path, destination: &Path) -> Result<ExtractSummary> {
    ZipExtractor::open(archive_path)?
        .extract_all(destination, |_| {})
        .await
}

/// Absolute, cleaned form of the destination, which must be an existing directory.
async fn destination_root(destination: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(destination)
        .await
        .map_err(ExtractError::write(destination))?;
    if !metadata.is_dir() {
        return Err(ExtractError::Write {
            path: destination.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "destination is not a directory",
            ),
        });
    }
    let absolute = std::path::absolute(destination).map_err(ExtractError::write(destination))?;
    Ok(clean_path(&absolute))
}

fn check_supported(entry: &ZipFileEntry) -> Result<()> {
    let unsupported = |feature: String| ExtractError::Unsupported {
        entry: entry.file_name.clone(),
        feature,
    };
    if entry.is_encrypted() {
        return Err(unsupported("encryption".to_string()));
    }
    if let CompressionMethod::Unknown(method) = entry.compression_method {
        return Err(unsupported(format!("compression method {method}")));
    }
    Ok(())
}

async fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder
        .create(path)
        .await
        .map_err(ExtractError::write(path))
}
