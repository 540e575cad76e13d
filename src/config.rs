//! Configuration types for the photo importer

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when the planned destination already holds a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Leave the existing file alone and record the source as skipped
    SkipExisting,
    /// Replace the existing file with the source bytes
    Overwrite,
    /// Copy next to the existing file as `name_1.ext`, `name_2.ext`, ...
    #[default]
    UniqueRename,
}

impl DuplicatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::SkipExisting => "skip-existing",
            DuplicatePolicy::Overwrite => "overwrite",
            DuplicatePolicy::UniqueRename => "unique-rename",
        }
    }
}

/// Configuration for one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory tree to import photos from
    pub source_dir: PathBuf,

    /// Library root; photos land in `target_dir/YYYY/MM/DD/`
    pub target_dir: PathBuf,

    /// Collision handling at the destination
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Number of failed files tolerated before the run aborts
    #[serde(default = "default_error_budget")]
    pub error_budget: usize,

    /// Accepted file extensions (lowercase, without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extensions whose dates are read through the external metadata tool
    #[serde(default = "default_external_tool_extensions")]
    pub external_tool_extensions: Vec<String>,

    /// Program invoked for external-tool extensions
    #[serde(default = "default_exiftool")]
    pub exiftool: PathBuf,

    /// Upper bound on `name_N` candidates tried by unique renaming
    #[serde(default = "default_rename_attempt_limit")]
    pub rename_attempt_limit: u32,

    /// Copy the source modification time onto the imported file
    #[serde(default = "default_true")]
    pub preserve_mtime: bool,

    /// Verbose output
    #[serde(default)]
    pub verbose: bool,
}

fn default_error_budget() -> usize {
    10
}

fn default_extensions() -> Vec<String> {
    vec!["jpg".into(), "jpeg".into(), "raf".into()]
}

fn default_external_tool_extensions() -> Vec<String> {
    vec!["raf".into()]
}

fn default_exiftool() -> PathBuf {
    PathBuf::from("exiftool")
}

fn default_rename_attempt_limit() -> u32 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            target_dir: PathBuf::new(),
            duplicate_policy: DuplicatePolicy::default(),
            error_budget: default_error_budget(),
            extensions: default_extensions(),
            external_tool_extensions: default_external_tool_extensions(),
            exiftool: default_exiftool(),
            rename_attempt_limit: default_rename_attempt_limit(),
            preserve_mtime: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Create a configuration for the given roots with every other setting at its default
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            ..Self::default()
        }
    }

    /// Check if a file extension is accepted for import
    pub fn is_supported(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check that the run can start: readable source directory, target outside of it
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source = &self.source_dir;
        if source.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("no source directory given".into()));
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("no target directory given".into()));
        }
        if !source.exists() {
            return Err(ConfigError::Invalid(format!(
                "source directory '{}' does not exist",
                source.display()
            )));
        }
        if !source.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "source path '{}' is not a directory",
                source.display()
            )));
        }
        if let Err(e) = fs::read_dir(source) {
            return Err(ConfigError::Invalid(format!(
                "no read permission for source directory '{}': {}",
                source.display(),
                e
            )));
        }

        let source_abs = fs::canonicalize(source).unwrap_or_else(|_| source.clone());
        let target_abs = absolutize(&self.target_dir);
        if target_abs.starts_with(&source_abs) {
            return Err(ConfigError::Invalid(format!(
                "target directory '{}' is inside source directory '{}'",
                self.target_dir.display(),
                source.display()
            )));
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Write the commented sample configuration to a file, refusing to replace one
    pub fn write_sample<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if path.exists() {
            return Err(ConfigError::Invalid(format!(
                "config file '{}' already exists",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, Self::sample_config()).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Importer Configuration File
# This file uses TOML format (https://toml.io)

# Directory tree to import photos from
source_dir = "/media/card/DCIM"

# Library root; photos are copied to target_dir/YYYY/MM/DD/
target_dir = "/home/me/Pictures/Library"

# What to do when a file with the same name is already at the destination:
# - skip-existing: leave it and count the source as skipped
# - overwrite: replace it with the source
# - unique-rename: copy as name_1.jpg, name_2.jpg, ... (default)
duplicate_policy = "unique-rename"

# Failed files tolerated before the import aborts
error_budget = 10

# Accepted extensions (case-insensitive)
extensions = ["jpg", "jpeg", "raf"]

# Extensions dated through exiftool instead of the built-in EXIF reader
external_tool_extensions = ["raf"]
exiftool = "exiftool"

# Give up on unique renaming after this many candidates
rename_attempt_limit = 10000

# Copy the source modification time onto imported files
preserve_mtime = true

verbose = false
"#
        .to_string()
    }
}

/// Canonical form of `path`, resolving through its closest existing ancestor
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if let Ok(p) = fs::canonicalize(path) {
        return p;
    }
    // Target may not exist yet; canonicalize the closest existing ancestor.
    let mut missing = Vec::new();
    let mut current = path.to_path_buf();
    while !current.exists() {
        match (current.file_name(), current.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                current = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
    let base = if current.as_os_str().is_empty() {
        std::env::current_dir().unwrap_or_default()
    } else {
        fs::canonicalize(&current).unwrap_or(current)
    };
    missing.into_iter().rev().fold(base, |acc, name| acc.join(name))
}

/// Errors that can occur when loading, saving or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Failed to write configuration file
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration is unusable for a run
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::WriteError { path, source } => {
                write!(f, "Failed to write config file '{}': {}", path.display(), source)
            }
            ConfigError::Invalid(message) => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::WriteError { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}
