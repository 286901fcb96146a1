//! Command-line front end for scormpack.
//!
//! Plays the caller's role around the library: allocates package
//! directories, runs extraction and resolution, and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use scormpack::cli::{Cli, Command};
use scormpack::package::{InstallOptions, install};
use scormpack::resolve_entry_point;
use scormpack::zip::{ZipExtractor, ZipFileEntry, is_safe_entry_name};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Command::Install {
            archive,
            root,
            json,
            keep_failed,
        } => {
            let options = InstallOptions {
                keep_failed: *keep_failed,
            };
            let package = install(archive, root, &options, |entry| {
                report_entry(&cli, entry)
            })
            .await
            .with_context(|| format!("could not install {}", archive.display()))?;

            if *json {
                println!("{}", serde_json::to_string(&package)?);
            } else if !cli.is_very_quiet() {
                println!("id: {}", package.id);
                println!("entry: {}", package.entry);
                println!("path: {}", package.dir.join(&package.entry).display());
            }
        }
        Command::Extract { archive, dir } => {
            let summary = ZipExtractor::open(archive)?
                .extract_all(dir, |entry| report_entry(&cli, entry))
                .await
                .with_context(|| format!("could not extract {}", archive.display()))?;
            if !cli.is_quiet() {
                println!(
                    "{} files, {} directories, {} bytes",
                    summary.files, summary.directories, summary.bytes
                );
            }
        }
        Command::Resolve { dir } => {
            let entry = resolve_entry_point(dir)
                .await
                .with_context(|| format!("could not resolve {}", dir.display()))?;
            println!("{entry}");
        }
        Command::List { archive } => list_files(archive).await?,
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Progress line printed before each entry is written.
fn report_entry(cli: &Cli, entry: &ZipFileEntry) {
    if cli.is_quiet() {
        return;
    }
    if entry.is_directory {
        eprintln!("   creating: {}", entry.file_name);
    } else {
        eprintln!("  extracting: {}", entry.file_name);
    }
}

/// Print every entry with its size, marking names that extraction would refuse.
async fn list_files(archive: &Path) -> Result<()> {
    let entries = ZipExtractor::open(archive)?.list_files().await?;

    println!("{:>10}  Name", "Length");
    println!("{}", "-".repeat(40));

    let mut total = 0u64;
    let mut unsafe_count = 0usize;
    for entry in &entries {
        let flag = if !is_safe_entry_name(&entry.file_name) {
            unsafe_count += 1;
            "  [unsafe path]"
        } else {
            ""
        };
        println!("{:>10}  {}{}", entry.uncompressed_size, entry.file_name, flag);
        if !entry.is_directory {
            total += entry.uncompressed_size;
        }
    }

    println!("{}", "-".repeat(40));
    println!("{:>10}  {} entries", total, entries.len());
    if unsafe_count > 0 {
        println!("{unsafe_count} entries would be rejected; this archive cannot be extracted");
    }
    Ok(())
}
