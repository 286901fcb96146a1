use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "scormpack")]
#[command(version)]
#[command(about = "Unpack SCORM packages safely and find their launch file", long_about = None)]
#[command(after_help = "Examples:\n  \
  scormpack install course.zip               unpack into scorm_packages/<id> and print the entry point\n  \
  scormpack install course.zip -d /srv/lms --json\n  \
  scormpack list course.zip                  show entries, flagging unsafe paths\n  \
  scormpack resolve scorm_packages/<id>      resolve an already extracted package")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// More log output (-vv for debug, -vvv for trace)
    #[arg(short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a package into a new directory and resolve its entry point
    Install {
        /// SCORM package (zip archive)
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Directory that holds one subdirectory per installed package
        #[arg(
            short = 'd',
            long = "root",
            value_name = "DIR",
            env = "SCORMPACK_ROOT",
            default_value = "scorm_packages"
        )]
        root: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Keep the package directory when installation fails
        #[arg(long)]
        keep_failed: bool,
    },

    /// Extract an archive into an existing directory
    Extract {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Print the entry point of an extracted package
    Resolve {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// List archive entries
    List {
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log level when `RUST_LOG` is unset.
    pub fn log_level(&self) -> LevelFilter {
        if self.is_very_quiet() {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
