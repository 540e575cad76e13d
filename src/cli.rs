//! CLI argument parsing with clap

use crate::config::{Config, DuplicatePolicy};
use clap::Parser;
use std::path::PathBuf;

/// Photo Importer - copy photos into a YYYY/MM/DD library by date taken
///
/// Dates come from EXIF metadata, from exiftool for raw formats the built-in
/// reader cannot parse, and from the file modification time as a last resort.
/// Source files are never modified or removed.
#[derive(Parser, Debug)]
#[command(name = "photo-importer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI arguments override them.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Source directory containing photos
    #[arg(long = "from", value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Target directory for organized photos
    #[arg(long = "to", value_name = "DIR")]
    pub target_dir: Option<PathBuf>,

    /// What to do when the destination file already exists
    #[arg(long, value_enum, conflicts_with_all = ["skip_existing", "overwrite"])]
    pub policy: Option<DuplicatePolicy>,

    /// Skip files that already exist in the target directory
    #[arg(long, conflicts_with = "overwrite")]
    pub skip_existing: bool,

    /// Overwrite existing files in the target directory
    #[arg(long)]
    pub overwrite: bool,

    /// Maximum number of failed files before aborting (default: 10)
    #[arg(long, value_name = "N")]
    pub max_errors: Option<usize>,

    /// exiftool binary used for raw formats
    #[arg(long, env = "PHOTO_IMPORTER_EXIFTOOL", value_name = "PATH")]
    pub exiftool: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a log file at this path
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Output log file format as JSON
    #[arg(long, requires = "log_file")]
    pub json_log: bool,

    /// Write a commented sample configuration file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_config: Option<PathBuf>,
}

impl Cli {
    /// Duplicate policy selected on the command line, if any
    pub fn duplicate_policy(&self) -> Option<DuplicatePolicy> {
        if self.skip_existing {
            Some(DuplicatePolicy::SkipExisting)
        } else if self.overwrite {
            Some(DuplicatePolicy::Overwrite)
        } else {
            self.policy
        }
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref source) = self.source_dir {
            config.source_dir = source.clone();
        }
        if let Some(ref target) = self.target_dir {
            config.target_dir = target.clone();
        }
        if let Some(policy) = self.duplicate_policy() {
            config.duplicate_policy = policy;
        }
        if let Some(max_errors) = self.max_errors {
            config.error_budget = max_errors;
        }
        if let Some(ref exiftool) = self.exiftool {
            config.exiftool = exiftool.clone();
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}
