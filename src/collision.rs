//! Duplicate handling at the destination

use crate::config::DuplicatePolicy;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What the session should do with a planned destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing at this path yet; copy there
    Copy(PathBuf),
    /// Replace the file already at this path
    Overwrite(PathBuf),
    /// Leave the destination as it is
    Skip,
}

/// Decides how to place a file whose planned path may already be taken
///
/// Existence is checked against the filesystem on every call; files copied
/// earlier in the same run are seen immediately.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    max_attempts: u32,
}

impl CollisionResolver {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    pub fn resolve(&self, planned: &Path, policy: DuplicatePolicy) -> Result<Resolution> {
        if !planned.exists() {
            return Ok(Resolution::Copy(planned.to_path_buf()));
        }

        match policy {
            DuplicatePolicy::SkipExisting => Ok(Resolution::Skip),
            DuplicatePolicy::Overwrite => Ok(Resolution::Overwrite(planned.to_path_buf())),
            DuplicatePolicy::UniqueRename => self.unique_path(planned).map(Resolution::Copy),
        }
    }

    /// First free `stem_N.ext` next to `path`, N counting up from 1
    fn unique_path(&self, path: &Path) -> Result<PathBuf> {
        let stem = path.file_stem().ok_or_else(|| Error::InvalidFileName {
            path: path.to_path_buf(),
        })?;
        let extension = path.extension();
        let parent = path.parent().unwrap_or_else(|| Path::new(""));

        for i in 1..=self.max_attempts {
            let mut name = OsString::from(stem);
            name.push(format!("_{}", i));
            if let Some(ext) = extension {
                name.push(".");
                name.push(ext);
            }

            let candidate = parent.join(name);
            if !candidate.exists() {
                debug!(?path, ?candidate, "Resolved name conflict");
                return Ok(candidate);
            }
        }

        Err(Error::ResolutionExhausted {
            path: path.to_path_buf(),
            attempts: self.max_attempts,
        })
    }
}
