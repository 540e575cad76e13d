//! Photo Importer - organize photos by the date they were taken
//!
//! This library copies photos from a source tree into a
//! `YYYY/MM/DD/` library with support for:
//! - EXIF capture dates for common formats
//! - exiftool-based dates for raw formats the EXIF reader cannot parse
//! - File system modification time as a fallback
//! - Skip, overwrite or unique-rename handling of existing files
//! - A failure budget that stops runs gone wrong

pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod plan;
pub mod process;
pub mod time;

pub use cli::Cli;
pub use collision::{CollisionResolver, Resolution};
pub use config::{Config, ConfigError, DuplicatePolicy};
pub use error::{Error, Result};
pub use plan::plan_destination;
pub use process::{FailureStage, FileRecord, ImportOutcome, ImportReport, ImportSession, SkipReason, import};
pub use time::{CaptureDate, DateSource, MetadataProvider, MetadataReader, SourceFile};
