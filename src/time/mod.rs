//! Capture date extraction
//!
//! Dates are read from:
//! - EXIF metadata embedded in common photo formats
//! - An external metadata tool for raw formats the EXIF reader cannot parse
//! - File system modification time, when neither of the above yields a date
//!
//! Strategies are tried in order and the first success wins. Nothing in this
//! module returns an error to the import session for a bad or unreadable
//! photo: the reader answers "no date" and the session falls back to mtime.

pub mod exif;
pub mod exiftool;

use crate::config::Config;
use crate::error::Result;
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub use self::exif::ExifStrategy;
pub use self::exiftool::{Exiftool, ExternalToolStrategy, MetadataProvider};

/// Where a capture date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    /// Embedded EXIF metadata
    Exif,
    /// Output of the external metadata tool
    ExternalTool,
    /// File system modification time
    FileSystem,
}

/// Calendar date a photo was taken, with the time of day when known
///
/// Values are kept exactly as recorded; no timezone conversion is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureDate {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub source: DateSource,
}

impl CaptureDate {
    pub fn new(date: NaiveDate, time: Option<NaiveTime>, source: DateSource) -> Self {
        Self { date, time, source }
    }

    pub fn from_datetime(datetime: NaiveDateTime, source: DateSource) -> Self {
        Self::new(datetime.date(), Some(datetime.time()), source)
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

impl std::fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} {}", self.date, time),
            None => write!(f, "{}", self.date),
        }
    }
}

/// A photo picked up from the source tree
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    extension: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        Self { path, extension }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercased extension without the dot, empty when there is none
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Open the file for reading; contents are only touched when a strategy asks
    pub fn open(&self) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }
}

/// One way of finding a capture date
pub trait DateStrategy {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Whether this strategy should be tried for the file at all
    fn handles(&self, _file: &SourceFile) -> bool {
        true
    }

    /// Try to extract a date
    fn attempt(&self, file: &SourceFile) -> Result<CaptureDate>;
}

/// Ordered list of date strategies
pub struct MetadataReader {
    strategies: Vec<Box<dyn DateStrategy>>,
}

impl MetadataReader {
    pub fn new(strategies: Vec<Box<dyn DateStrategy>>) -> Self {
        Self { strategies }
    }

    /// EXIF first, then the configured exiftool binary for external-tool formats
    pub fn for_config(config: &Config) -> Self {
        Self::with_provider(config, Exiftool::new(&config.exiftool))
    }

    /// Same strategy order as [`MetadataReader::for_config`] with a custom provider
    pub fn with_provider<P: MetadataProvider + 'static>(config: &Config, provider: P) -> Self {
        Self::new(vec![
            Box::new(ExifStrategy::new(config.external_tool_extensions.clone())),
            Box::new(ExternalToolStrategy::new(
                provider,
                config.external_tool_extensions.clone(),
            )),
        ])
    }

    /// Extract the capture date, or `None` when no strategy finds one
    pub fn extract(&self, file: &SourceFile) -> Option<CaptureDate> {
        for strategy in &self.strategies {
            if !strategy.handles(file) {
                trace!(path = ?file.path(), strategy = strategy.name(), "Strategy not applicable");
                continue;
            }
            match strategy.attempt(file) {
                Ok(date) => {
                    debug!(path = ?file.path(), strategy = strategy.name(), %date, "Found capture date");
                    return Some(date);
                }
                Err(e) => {
                    debug!(path = ?file.path(), strategy = strategy.name(), error = %e, "No capture date");
                }
            }
        }
        None
    }
}

/// Capture date from the file's modification time, in local wall-clock time
pub fn file_system_date(path: &Path) -> Result<CaptureDate> {
    let modified = fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    Ok(CaptureDate::from_datetime(
        local.naive_local(),
        DateSource::FileSystem,
    ))
}
