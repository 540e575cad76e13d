//! Import session
//!
//! Handles the core loop of:
//! - Scanning the source tree
//! - Extracting capture dates
//! - Placing each photo under `target/YYYY/MM/DD/`
//! - Counting outcomes and stopping once too many files have failed

use crate::collision::{CollisionResolver, Resolution};
use crate::config::{Config, absolutize};
use crate::error::{Error, Result};
use crate::plan::plan_destination;
use crate::time::{DateSource, MetadataReader, SourceFile, file_system_date};

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Step at which a file failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Listing the source tree
    Enumerate,
    /// Reading the modification time fallback
    Timestamp,
    /// Building the destination path
    Plan,
    /// Finding a free destination name
    Resolve,
    /// Creating destination directories
    CreateDir,
    /// Copying the bytes
    Copy,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Enumerate => "enumerate",
            FailureStage::Timestamp => "timestamp",
            FailureStage::Plan => "plan",
            FailureStage::Resolve => "resolve",
            FailureStage::CreateDir => "create-dir",
            FailureStage::Copy => "copy",
        }
    }
}

/// Why a file was not copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination already holds a file of that name
    AlreadyExists(PathBuf),
    /// The source already is the file at its destination
    AlreadyInPlace(PathBuf),
}

/// Result of handling one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported {
        destination: PathBuf,
        date_source: DateSource,
        overwritten: bool,
    },
    Skipped(SkipReason),
    Failed {
        stage: FailureStage,
        message: String,
    },
}

/// Outcome for one source path
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub source: PathBuf,
    pub outcome: ImportOutcome,
}

/// Everything a run did, in processing order
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub records: Vec<FileRecord>,
    /// Accepted files that were handled (imported, skipped or failed)
    pub processed: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Set when the error budget was exceeded and the run stopped early
    pub aborted: bool,
}

impl ImportReport {
    fn record(&mut self, source: PathBuf, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Imported { .. } => self.imported += 1,
            ImportOutcome::Skipped(_) => self.skipped += 1,
            ImportOutcome::Failed { .. } => self.failed += 1,
        }
        self.records.push(FileRecord { source, outcome });
    }

    /// Outcome recorded for a source path, if any
    pub fn outcome_for(&self, source: &Path) -> Option<&ImportOutcome> {
        self.records
            .iter()
            .find(|r| r.source == source)
            .map(|r| &r.outcome)
    }

    /// Records of files that failed
    pub fn skips(&self) -> impl Iterator<Item = &FileRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ImportOutcome::Skipped(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, ImportOutcome::Failed { .. }))
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Processed: {}, Imported: {}, Skipped: {}, Failed: {}",
            self.processed, self.imported, self.skipped, self.failed
        );
        if self.aborted {
            summary.push_str(" (aborted: error budget exceeded)");
        }
        summary
    }
}

/// One import run over a source tree
pub struct ImportSession {
    config: Config,
    reader: MetadataReader,
    resolver: CollisionResolver,
    report: ImportReport,
}

impl ImportSession {
    /// Session using the built-in EXIF reader and the configured exiftool
    pub fn new(config: &Config) -> Self {
        Self::with_reader(config, MetadataReader::for_config(config))
    }

    /// Session with a caller-supplied metadata reader
    pub fn with_reader(config: &Config, reader: MetadataReader) -> Self {
        Self {
            config: config.clone(),
            reader,
            resolver: CollisionResolver::new(config.rename_attempt_limit),
            report: ImportReport::default(),
        }
    }

    /// Run the import and return the report, partial if the run aborted
    pub fn run(mut self) -> ImportReport {
        let _span = span!(Level::INFO, "import_run").entered();

        info!(
            source = %self.config.source_dir.display(),
            target = %self.config.target_dir.display(),
            policy = self.config.duplicate_policy.as_str(),
            error_budget = self.config.error_budget,
            "Starting import"
        );

        let pruned = nested_target(&self.config.source_dir, &self.config.target_dir);
        if let Some(ref dir) = pruned {
            debug!(?dir, "Target is inside source, excluding it from the scan");
        }
        let walker = WalkDir::new(&self.config.source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| pruned.as_ref().is_none_or(|dir| !e.path().starts_with(dir)));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.config.source_dir.clone());
                    self.report.processed += 1;
                    if self.fail(path, FailureStage::Enumerate, Error::WalkDir(e)) {
                        break;
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let file = SourceFile::new(entry.path());
            if !self.config.is_supported(file.extension()) {
                debug!(path = ?file.path(), "Ignoring unsupported file");
                continue;
            }

            self.report.processed += 1;
            let _file_span = span!(Level::DEBUG, "import_file", path = ?file.path()).entered();

            match self.import_file(&file) {
                Ok(outcome) => self.report.record(file.path().to_path_buf(), outcome),
                Err((stage, e)) => {
                    if self.fail(file.path().to_path_buf(), stage, e) {
                        break;
                    }
                }
            }
        }

        info!("{}", self.report.summary());
        self.report
    }

    /// Handle one accepted file; errors carry the stage they happened at
    fn import_file(&self, file: &SourceFile) -> std::result::Result<ImportOutcome, (FailureStage, Error)> {
        let path = file.path();

        let date = match self.reader.extract(file) {
            Some(date) => date,
            None => {
                let date = file_system_date(path).map_err(at(FailureStage::Timestamp))?;
                warn!(?path, %date, "No capture date in metadata, using modification time");
                date
            }
        };

        let file_name = path.file_name().ok_or_else(|| {
            (
                FailureStage::Plan,
                Error::InvalidFileName {
                    path: path.to_path_buf(),
                },
            )
        })?;
        let planned = plan_destination(&self.config.target_dir, &date, file_name);

        if is_same_file(path, &planned) {
            info!(source = ?path, "Skipping, file is already at its destination");
            return Ok(ImportOutcome::Skipped(SkipReason::AlreadyInPlace(planned)));
        }

        let resolution = self
            .resolver
            .resolve(&planned, self.config.duplicate_policy)
            .map_err(at(FailureStage::Resolve))?;

        let (destination, overwritten) = match resolution {
            Resolution::Skip => {
                info!(source = ?path, destination = ?planned, "Skipping, destination exists");
                return Ok(ImportOutcome::Skipped(SkipReason::AlreadyExists(planned)));
            }
            Resolution::Copy(dest) => (dest, false),
            Resolution::Overwrite(dest) => (dest, true),
        };

        self.transfer(path, &destination)?;

        info!(
            source = ?path,
            destination = ?destination,
            date_source = ?date.source,
            date = %date,
            overwritten,
            "Imported file"
        );

        Ok(ImportOutcome::Imported {
            destination,
            date_source: date.source,
            overwritten,
        })
    }

    /// Copy `source` to `dest`, creating parent directories as needed
    fn transfer(&self, source: &Path, dest: &Path) -> std::result::Result<(), (FailureStage, Error)> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| (FailureStage::CreateDir, Error::Io(e)))?;
        }

        copy_file(source, dest).map_err(at(FailureStage::Copy))?;

        // Preserve modification time
        if self.config.preserve_mtime
            && let Ok(metadata) = fs::metadata(source)
            && let Ok(mtime) = metadata.modified()
            && let Err(e) = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(mtime))
        {
            warn!(?dest, error = %e, "Failed to preserve modification time");
        }

        Ok(())
    }

    /// Record a failure; returns true when the run must stop
    fn fail(&mut self, source: PathBuf, stage: FailureStage, e: Error) -> bool {
        error!(?source, stage = stage.as_str(), error = %e, "Failed to import file");
        self.report.record(
            source,
            ImportOutcome::Failed {
                stage,
                message: e.to_string(),
            },
        );

        if self.report.failed > self.config.error_budget {
            self.report.aborted = true;
            error!(
                failed = self.report.failed,
                error_budget = self.config.error_budget,
                "Aborted: error budget exceeded"
            );
            return true;
        }
        false
    }
}

/// Run an import with the default metadata reader
pub fn import(config: &Config) -> ImportReport {
    ImportSession::new(config).run()
}

/// Whether both paths exist and resolve to the same file
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// The target spelled under `source`, when it is a proper descendant of it
fn nested_target(source: &Path, target: &Path) -> Option<PathBuf> {
    let source_abs = fs::canonicalize(source).ok()?;
    let target_abs = absolutize(target);
    match target_abs.strip_prefix(&source_abs) {
        Ok(rest) if !rest.as_os_str().is_empty() => Some(source.join(rest)),
        _ => None,
    }
}

fn at(stage: FailureStage) -> impl FnOnce(Error) -> (FailureStage, Error) {
    move |e| (stage, e)
}

/// Copy file with buffered I/O
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::time::exif::jpeg_with_date_time_original;
    use chrono::{Local, TimeZone};
    use std::time::SystemTime;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _dir: TempDir,
        source: PathBuf,
        target: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let source = dir.path().join("source");
            let target = dir.path().join("target");
            fs::create_dir_all(&source).unwrap();
            fs::create_dir_all(&target).unwrap();
            Self {
                _dir: dir,
                source,
                target,
            }
        }

        fn config(&self, policy: DuplicatePolicy, error_budget: usize) -> Config {
            let mut config = Config::new(&self.source, &self.target);
            config.duplicate_policy = policy;
            config.error_budget = error_budget;
            config
        }

        fn photo(&self, name: &str, exif_date: &str) -> PathBuf {
            let path = self.source.join(name);
            fs::write(&path, jpeg_with_date_time_original(exif_date)).unwrap();
            path
        }

        fn raw(&self, name: &str, modified: SystemTime) -> PathBuf {
            let path = self.source.join(name);
            fs::write(&path, b"not really a raw file").unwrap();
            filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(modified))
                .unwrap();
            path
        }
    }

    /// Reader whose external tool is never installed
    fn offline_reader(config: &Config) -> MetadataReader {
        MetadataReader::with_provider(config, |_: &Path| -> Result<String> {
            Err(Error::ProviderUnavailable {
                program: "exiftool".into(),
                message: "not installed".into(),
            })
        })
    }

    fn run(config: &Config) -> ImportReport {
        ImportSession::with_reader(config, offline_reader(config)).run()
    }

    fn local_noon(y: i32, m: u32, d: u32) -> SystemTime {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .unwrap()
            .into()
    }

    fn count_files(dir: &Path) -> usize {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_example_run() {
        let fx = Fixture::new();
        fx.photo("IMG_0001.JPG", "2024:03:05 10:00:00");
        fx.raw("IMG_0002.raf", local_noon(2023, 11, 20));

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);
        assert!(!report.aborted);
        assert!(fx.target.join("2024/03/05/IMG_0001.JPG").is_file());
        assert!(fx.target.join("2023/11/20/IMG_0002.raf").is_file());

        match report.outcome_for(&fx.source.join("IMG_0002.raf")) {
            Some(ImportOutcome::Imported { date_source, .. }) => {
                assert_eq!(*date_source, DateSource::FileSystem)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_external_tool_date_is_used_for_raw() {
        let fx = Fixture::new();
        fx.raw("DSCF0001.RAF", local_noon(2020, 1, 1));
        let config = fx.config(DuplicatePolicy::UniqueRename, 10);
        let reader = MetadataReader::with_provider(&config, |_: &Path| -> Result<String> {
            Ok(r#"[{"DateTimeOriginal": "2022:07:14 18:30:00"}]"#.to_string())
        });

        let report = ImportSession::with_reader(&config, reader).run();
        assert_eq!(report.imported, 1);
        assert!(fx.target.join("2022/07/14/DSCF0001.RAF").is_file());
    }

    #[test]
    fn test_unsupported_files_are_ignored() {
        let fx = Fixture::new();
        fx.photo("a.jpeg", "2024:01:01 12:00:00");
        fs::write(fx.source.join("notes.txt"), b"hello").unwrap();
        fs::write(fx.source.join("clip.mp4"), b"video").unwrap();

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));
        assert_eq!(report.processed, 1);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped + report.failed, 0);
    }

    #[test]
    fn test_case_insensitive_extensions() {
        let fx = Fixture::new();
        for name in ["test.jpg", "test.JPG", "test.JPEG", "test.jpeg"] {
            fx.photo(name, "2024:01:01 12:00:00");
        }

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));
        assert_eq!(report.imported, 4);
        assert_eq!(count_files(&fx.target.join("2024/01/01")), 4);
    }

    #[test]
    fn test_nested_source_directories() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.source.join("DCIM/100CANON")).unwrap();
        fx.photo("DCIM/100CANON/IMG_1.jpg", "2021:12:31 23:59:59");

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));
        assert_eq!(report.imported, 1);
        assert!(fx.target.join("2021/12/31/IMG_1.jpg").is_file());
    }

    #[test]
    fn test_skip_existing_rerun_copies_nothing() {
        let fx = Fixture::new();
        let a = fx.photo("a.jpg", "2024:03:05 10:00:00");
        let b = fx.raw("b.raf", local_noon(2023, 11, 20));
        let config = fx.config(DuplicatePolicy::SkipExisting, 10);

        let first = run(&config);
        assert_eq!(first.imported, 2);

        let a_bytes = fs::read(&a).unwrap();
        let a_mtime = fs::metadata(&a).unwrap().modified().unwrap();
        let b_mtime = fs::metadata(&b).unwrap().modified().unwrap();

        let second = run(&config);
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.failed, 0);
        assert_eq!(count_files(&fx.target), 2);

        assert_eq!(fs::read(&a).unwrap(), a_bytes);
        assert_eq!(fs::metadata(&a).unwrap().modified().unwrap(), a_mtime);
        assert_eq!(fs::metadata(&b).unwrap().modified().unwrap(), b_mtime);
        assert!(matches!(
            second.outcome_for(&a),
            Some(ImportOutcome::Skipped(SkipReason::AlreadyExists(_)))
        ));
    }

    #[test]
    fn test_overwrite_replaces_content_in_place() {
        let fx = Fixture::new();
        let src = fx.raw("b.raf", local_noon(2023, 11, 20));
        let config = fx.config(DuplicatePolicy::Overwrite, 10);

        run(&config);
        let dest = fx.target.join("2023/11/20/b.raf");
        assert!(dest.is_file());

        fs::write(&src, b"edited raw bytes").unwrap();
        filetime::set_file_mtime(
            &src,
            filetime::FileTime::from_system_time(local_noon(2023, 11, 20)),
        )
        .unwrap();

        let report = run(&config);
        assert_eq!(report.imported, 1);
        assert_eq!(
            report.outcome_for(&src),
            Some(&ImportOutcome::Imported {
                destination: dest.clone(),
                date_source: DateSource::FileSystem,
                overwritten: true,
            })
        );
        assert_eq!(fs::read(&dest).unwrap(), b"edited raw bytes");
        assert_eq!(count_files(&fx.target.join("2023/11/20")), 1);
    }

    #[test]
    fn test_unique_rename_numbering() {
        let fx = Fixture::new();
        let day = fx.target.join("2024/03/05");
        fs::create_dir_all(&day).unwrap();
        for name in ["a.jpg", "a_1.jpg", "a_2.jpg"] {
            fs::write(day.join(name), b"existing").unwrap();
        }
        fx.photo("a.jpg", "2024:03:05 10:00:00");

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));
        assert_eq!(report.imported, 1);
        assert!(day.join("a_3.jpg").is_file());
        assert_eq!(fs::read(day.join("a.jpg")).unwrap(), b"existing");
    }

    #[test]
    fn test_same_name_twice_in_one_run() {
        let fx = Fixture::new();
        fs::create_dir_all(fx.source.join("x")).unwrap();
        fs::create_dir_all(fx.source.join("y")).unwrap();
        fx.photo("x/IMG.jpg", "2024:03:05 10:00:00");
        fx.photo("y/IMG.jpg", "2024:03:05 11:00:00");

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 10));
        assert_eq!(report.imported, 2);
        assert!(fx.target.join("2024/03/05/IMG.jpg").is_file());
        assert!(fx.target.join("2024/03/05/IMG_1.jpg").is_file());
    }

    #[test]
    fn test_corrupt_metadata_is_not_a_failure() {
        let fx = Fixture::new();
        let path = fx.source.join("broken.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10, b'E']).unwrap();
        filetime::set_file_mtime(
            &path,
            filetime::FileTime::from_system_time(local_noon(2019, 5, 6)),
        )
        .unwrap();

        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 0));
        assert_eq!(report.failed, 0);
        assert_eq!(report.imported, 1);
        assert!(fx.target.join("2019/05/06/broken.jpg").is_file());
    }

    #[test]
    fn test_resolution_exhausted_is_a_failure() {
        let fx = Fixture::new();
        let day = fx.target.join("2024/03/05");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("a.jpg"), b"x").unwrap();
        fs::write(day.join("a_1.jpg"), b"x").unwrap();
        fx.photo("a.jpg", "2024:03:05 10:00:00");

        let mut config = fx.config(DuplicatePolicy::UniqueRename, 10);
        config.rename_attempt_limit = 1;
        let report = run(&config);

        assert_eq!(report.failed, 1);
        assert!(!report.aborted);
        let failure = report.failures().next().unwrap();
        assert!(matches!(
            failure.outcome,
            ImportOutcome::Failed {
                stage: FailureStage::Resolve,
                ..
            }
        ));
    }

    /// a, c and e are dated 2024, whose year directory is blocked by a plain file
    fn failing_fixture() -> Fixture {
        let fx = Fixture::new();
        fs::write(fx.target.join("2024"), b"not a directory").unwrap();
        fx.photo("a.jpg", "2024:03:05 10:00:00");
        fx.photo("b.jpg", "2025:01:01 10:00:00");
        fx.photo("c.jpg", "2024:03:06 10:00:00");
        fx.photo("d.jpg", "2025:01:02 10:00:00");
        fx.photo("e.jpg", "2024:03:07 10:00:00");
        fx
    }

    #[test]
    fn test_failures_within_budget_complete_the_run() {
        let fx = failing_fixture();
        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 3));

        assert!(!report.aborted);
        assert_eq!(report.failed, 3);
        assert_eq!(report.imported, 2);
        assert_eq!(report.processed, 5);
        assert!(fx.target.join("2025/01/02/d.jpg").is_file());
        for record in report.failures() {
            assert!(matches!(
                record.outcome,
                ImportOutcome::Failed {
                    stage: FailureStage::CreateDir,
                    ..
                }
            ));
        }
    }

    #[test]
    fn test_budget_exceeded_aborts_after_budget_plus_one() {
        let fx = failing_fixture();
        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 1));

        assert!(report.aborted);
        assert_eq!(report.failed, 2);
        assert_eq!(report.imported, 1);
        assert_eq!(report.records.len(), 3);
        assert!(report.outcome_for(&fx.source.join("d.jpg")).is_none());
        assert!(!fx.target.join("2025/01/02/d.jpg").exists());
        assert!(report.summary().contains("aborted"));
    }

    #[test]
    fn test_zero_budget_stops_at_first_failure() {
        let fx = failing_fixture();
        let report = run(&fx.config(DuplicatePolicy::UniqueRename, 0));

        assert!(report.aborted);
        assert_eq!(report.failed, 1);
        assert_eq!(report.records.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_source_linked_into_target_is_left_alone() {
        let fx = Fixture::new();
        let day = fx.target.join("2024/03/05");
        fs::create_dir_all(&day).unwrap();
        let bytes = jpeg_with_date_time_original("2024:03:05 10:00:00");
        fs::write(day.join("a.jpg"), &bytes).unwrap();

        let alias = fx._dir.path().join("alias");
        std::os::unix::fs::symlink(&day, &alias).unwrap();

        let mut config = fx.config(DuplicatePolicy::Overwrite, 0);
        config.source_dir = alias.clone();
        let report = run(&config);

        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(fs::read(day.join("a.jpg")).unwrap(), bytes);

        let skip = report.skips().next().unwrap();
        assert_eq!(skip.source, alias.join("a.jpg"));
        assert_eq!(
            skip.outcome,
            ImportOutcome::Skipped(SkipReason::AlreadyInPlace(day.join("a.jpg")))
        );
    }

    #[test]
    fn test_file_already_at_destination_is_skipped_for_every_policy() {
        let fx = Fixture::new();
        let day = fx.target.join("2024/03/05");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("a.jpg"), jpeg_with_date_time_original("2024:03:05 10:00:00")).unwrap();

        for policy in [
            DuplicatePolicy::SkipExisting,
            DuplicatePolicy::Overwrite,
            DuplicatePolicy::UniqueRename,
        ] {
            let mut config = fx.config(policy, 0);
            config.source_dir = fx.target.clone();
            let report = run(&config);

            assert_eq!(report.skipped, 1, "{:?}", policy);
            assert_eq!(report.imported, 0, "{:?}", policy);
            assert_eq!(count_files(&fx.target), 1, "{:?}", policy);
        }
    }

    #[test]
    fn test_source_inside_target_is_scanned() {
        let fx = Fixture::new();
        let inbox = fx.target.join("inbox");
        fs::create_dir_all(&inbox).unwrap();
        fs::write(inbox.join("a.jpg"), jpeg_with_date_time_original("2024:03:05 10:00:00")).unwrap();

        let mut config = fx.config(DuplicatePolicy::UniqueRename, 0);
        config.source_dir = inbox.clone();
        let report = run(&config);

        assert_eq!(report.processed, 1);
        assert_eq!(report.imported, 1);
        assert!(fx.target.join("2024/03/05/a.jpg").is_file());
        assert!(inbox.join("a.jpg").is_file());
    }

    #[test]
    fn test_target_inside_source_is_not_rescanned() {
        let fx = Fixture::new();
        let library = fx.source.join("library");
        fs::create_dir_all(library.join("2020/01/01")).unwrap();
        fs::write(
            library.join("2020/01/01/old.jpg"),
            jpeg_with_date_time_original("2020:01:01 10:00:00"),
        )
        .unwrap();
        fx.photo("new.jpg", "2024:03:05 10:00:00");

        let mut config = fx.config(DuplicatePolicy::UniqueRename, 0);
        config.target_dir = library.clone();
        let report = run(&config);

        assert_eq!(report.processed, 1);
        assert_eq!(report.imported, 1);
        assert!(library.join("2024/03/05/new.jpg").is_file());
        assert_eq!(count_files(&library), 2);
    }
}
