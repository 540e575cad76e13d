//! Error types for the photo importer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for photo importer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo importer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to parse timestamp from {source_info}: {message}")]
    TimestampParse { source_info: String, message: String },

    #[error("Metadata provider '{program}' could not be started: {message}")]
    ProviderUnavailable { program: String, message: String },

    #[error("Metadata provider failed on {path}: {message}")]
    ProviderFailed { path: PathBuf, message: String },

    #[error("No free name for {path} after {attempts} attempts")]
    ResolutionExhausted { path: PathBuf, attempts: u32 },

    #[error("Invalid file name: {path}")]
    InvalidFileName { path: PathBuf },

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
