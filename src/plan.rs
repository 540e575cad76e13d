//! Destination layout: `root/YYYY/MM/DD/<original file name>`

use crate::time::CaptureDate;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Build the destination path for a photo (without conflict resolution)
///
/// The file name is kept verbatim, extension case included.
pub fn plan_destination(root: &Path, date: &CaptureDate, file_name: &OsStr) -> PathBuf {
    let mut dest = root.to_path_buf();
    dest.push(format!("{:04}", date.year()));
    dest.push(format!("{:02}", date.month()));
    dest.push(format!("{:02}", date.day()));
    dest.push(file_name);
    dest
}
