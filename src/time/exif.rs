//! EXIF date extraction for images

use super::{CaptureDate, DateSource, DateStrategy, SourceFile};
use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use exif::{In, Reader, Tag};
use tracing::trace;

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,    // When the original image was taken
    Tag::DateTimeDigitized,   // When the image was digitized
    Tag::DateTime,            // File modification date/time
];

/// Reads capture dates from EXIF blocks in JPEG, TIFF, HEIF and PNG containers
pub struct ExifStrategy {
    /// Formats the container parser cannot read; left to the external tool
    excluded_extensions: Vec<String>,
}

impl ExifStrategy {
    pub fn new(excluded_extensions: Vec<String>) -> Self {
        Self {
            excluded_extensions,
        }
    }
}

impl DateStrategy for ExifStrategy {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn handles(&self, file: &SourceFile) -> bool {
        !self.excluded_extensions.iter().any(|e| e == file.extension())
    }

    fn attempt(&self, file: &SourceFile) -> Result<CaptureDate> {
        let path = file.path();
        let mut reader = file.open()?;

        let exif = Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| Error::ExifRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        for tag in DATE_TAGS {
            if let Some(field) = exif.get_field(*tag, In::PRIMARY)
                && let Some((date, time)) = parse_exif_datetime(&field.display_value().to_string())
            {
                trace!(?path, ?tag, "Found EXIF date");
                return Ok(CaptureDate::new(date, time, DateSource::Exif));
            }
        }

        Err(Error::ExifRead {
            path: path.to_path_buf(),
            message: "No valid date tag found in EXIF data".to_string(),
        })
    }
}

/// Parse an EXIF date string: "YYYY:MM:DD HH:MM:SS" and the usual variants
///
/// Returns the date and, when present, the time of day.
pub(crate) fn parse_exif_datetime(s: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    // EXIF format: "2024:01:15 14:30:00" or with quotes
    let s = s.trim().trim_matches('"');

    let formats = [
        "%Y:%m:%d %H:%M:%S",
        "%Y:%m:%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some((dt.date(), Some(dt.time())));
        }
    }

    // Some writers drop the time entirely
    for format in ["%Y:%m:%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some((date, None));
        }
    }

    None
}

/// Minimal JPEG carrying a single `DateTimeOriginal` tag, for tests
#[cfg(test)]
pub(crate) fn jpeg_with_date_time_original(value: &str) -> Vec<u8> {
    let mut ascii = value.as_bytes().to_vec();
    ascii.push(0);

    // Little-endian TIFF: IFD0 at 8 holds the Exif IFD pointer, Exif IFD at 26,
    // string data at 44.
    let exif_ifd_offset: u32 = 8 + 18;
    let data_offset: u32 = exif_ifd_offset + 18;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&exif_ifd_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&data_offset.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&ascii);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
