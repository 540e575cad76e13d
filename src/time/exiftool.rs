//! Raw-format dates through an external metadata tool (exiftool)

use super::exif::parse_exif_datetime;
use super::{CaptureDate, DateSource, DateStrategy, SourceFile};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::trace;

/// Date keys looked up in the tool's JSON output, in priority order
const DATE_KEYS: &[&str] = &["DateTimeOriginal", "CreateDate"];

/// Anything that can turn a file path into the tool's raw text output
pub trait MetadataProvider {
    fn query(&self, path: &Path) -> Result<String>;
}

impl<F> MetadataProvider for F
where
    F: Fn(&Path) -> Result<String>,
{
    fn query(&self, path: &Path) -> Result<String> {
        self(path)
    }
}

/// Runs `exiftool -j -DateTimeOriginal -CreateDate <file>`
pub struct Exiftool {
    program: PathBuf,
    /// Cached result of the first spawn attempt
    available: OnceLock<bool>,
}

impl Exiftool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            available: OnceLock::new(),
        }
    }

    fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            Command::new(&self.program)
                .arg("-ver")
                .output()
                .map(|output| output.status.success())
                .unwrap_or(false)
        })
    }
}

impl MetadataProvider for Exiftool {
    fn query(&self, path: &Path) -> Result<String> {
        if !self.is_available() {
            return Err(Error::ProviderUnavailable {
                program: self.program.display().to_string(),
                message: "not installed or not in PATH".into(),
            });
        }

        let output = Command::new(&self.program)
            .args(["-j", "-DateTimeOriginal", "-CreateDate"])
            .arg(path)
            .output()
            .map_err(|e| Error::ProviderUnavailable {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::ProviderFailed {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Asks a [`MetadataProvider`] for the date of formats the EXIF reader skips
pub struct ExternalToolStrategy {
    provider: Box<dyn MetadataProvider>,
    extensions: Vec<String>,
}

impl ExternalToolStrategy {
    pub fn new<P: MetadataProvider + 'static>(provider: P, extensions: Vec<String>) -> Self {
        Self {
            provider: Box::new(provider),
            extensions,
        }
    }
}

impl DateStrategy for ExternalToolStrategy {
    fn name(&self) -> &'static str {
        "external-tool"
    }

    fn handles(&self, file: &SourceFile) -> bool {
        self.extensions.iter().any(|e| e == file.extension())
    }

    fn attempt(&self, file: &SourceFile) -> Result<CaptureDate> {
        let path = file.path();
        let output = self.provider.query(path)?;
        trace!(?path, "Metadata tool output: {}", output);

        parse_tool_output(&output)
            .map(|(date, time)| CaptureDate::new(date, time, DateSource::ExternalTool))
            .ok_or_else(|| Error::TimestampParse {
                source_info: path.display().to_string(),
                message: "no date field in metadata tool output".into(),
            })
    }
}

/// Pull a date out of the tool output
///
/// Accepts the `-j` JSON array form as well as a bare value as printed with
/// `-s -s -s`.
fn parse_tool_output(output: &str) -> Option<(chrono::NaiveDate, Option<chrono::NaiveTime>)> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let record = match &json {
            serde_json::Value::Array(items) => items.first()?,
            other => other,
        };
        return DATE_KEYS.iter().find_map(|key| {
            record
                .get(*key)
                .and_then(|v| v.as_str())
                .and_then(parse_exif_datetime)
        });
    }

    trimmed.lines().find_map(|line| {
        // "Date/Time Original : 2023:11:20 08:00:00" or just the value
        let value = line
            .split_once(" : ")
            .map(|(_, value)| value)
            .unwrap_or(line);
        parse_exif_datetime(value)
    })
}
