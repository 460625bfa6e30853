//
// transaction.rs
// Dicom-Tagfix
//
// Directory-level protocol around the correction engine: rename the target to a backup,
// rebuild it file by file, then drop or keep the backup. A journal in the backup marks
// an unfinished run so `resume` can complete it.
//

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::correction::{self, FileOutcome};
use crate::detector;
use crate::error::{FixError, Result};
use crate::events::{EventSink, FixEvent};
use crate::journal::{is_journal_file, Journal, Phase};
use crate::models::{FileRecord, FileStatus, RunOutcome, RunReport};
use crate::render::format_tag;
use crate::template::{self, Template};

pub const DEFAULT_SENTINEL: &str = "Error!";
pub const BACKUP_SUFFIX: &str = "_ORIGINAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOptions {
    pub sentinel: String,
    /// Remove `<dir>_ORIGINAL` once the corrected directory is complete.
    pub delete_originals: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            delete_originals: true,
        }
    }
}

/// `<dir>_ORIGINAL`, beside `dir`.
pub fn backup_path(dir: &Path) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .ok_or_else(|| FixError::NotFound(format!("{} has no directory name", dir.display())))?;
    let mut backup = name.to_os_string();
    backup.push(BACKUP_SUFFIX);
    Ok(dir.with_file_name(backup))
}

/// Correct `dir` in place if its representative file carries the sentinel.
///
/// A clean directory is left untouched and reported with `corrected: false`.
pub fn run(
    dir: &Path,
    template_source: &Path,
    options: &FixOptions,
    sink: &dyn EventSink,
) -> Result<RunOutcome> {
    if options.sentinel.is_empty() {
        return Err(FixError::EmptySentinel);
    }
    if !dir.is_dir() {
        return Err(FixError::NotFound(format!(
            "directory to correct does not exist: {}",
            dir.display()
        )));
    }

    let template = template::resolve(template_source)?;

    if !detector::is_directory_corrupted(dir, &options.sentinel, sink)? {
        return Ok(RunOutcome::clean(dir.to_path_buf()));
    }

    let backup = backup_path(dir)?;
    if backup.exists() {
        return Err(FixError::BackupExists(backup));
    }

    let mut journal = stage(dir, &backup, &template, options)?;
    fs::create_dir(dir).map_err(FixError::io(format!("failed to create {}", dir.display())))?;
    info!("moved originals to {}", backup.display());

    journal.phase = Phase::Populating;
    journal.write(&backup)?;

    complete(dir, &backup, &template, &journal, sink)
}

/// Finish a run that was interrupted after the backup was made.
///
/// Whatever was already written to `dir` is discarded and rebuilt from the backup, using the
/// sentinel and delete flag recorded in the journal. Without `template_source` the template
/// recorded in the journal is used.
pub fn resume(
    dir: &Path,
    template_source: Option<&Path>,
    sink: &dyn EventSink,
) -> Result<RunOutcome> {
    let backup = backup_path(dir)?;
    let mut journal = Journal::read(&backup)?.ok_or_else(|| {
        FixError::NotFound(format!("no interrupted run recorded in {}", backup.display()))
    })?;
    info!(
        "resuming run started {} (phase {:?})",
        journal.started_at, journal.phase
    );

    let template_source = template_source.unwrap_or(journal.template_source.as_path());
    let template = template::resolve(template_source)?;

    if dir.exists() {
        warn!("discarding partial output in {}", dir.display());
        fs::remove_dir_all(dir)
            .map_err(FixError::io(format!("failed to clear {}", dir.display())))?;
    }
    fs::create_dir(dir).map_err(FixError::io(format!("failed to create {}", dir.display())))?;

    if journal.phase != Phase::Populating {
        journal.phase = Phase::Populating;
        journal.write(&backup)?;
    }

    complete(dir, &backup, &template, &journal, sink)
}

/// Write the journal into `dir` and move `dir` to `backup`. The journal travels with it.
fn stage(
    dir: &Path,
    backup: &Path,
    template: &Template,
    options: &FixOptions,
) -> Result<Journal> {
    // A file under our name that is not a journal belongs to the user: fail before touching it.
    if Journal::read(dir)?.is_some() {
        warn!("replacing stale journal in {}", dir.display());
    }

    let template_source = journaled_template(template.source(), dir, backup)?;
    let journal = Journal::new(&options.sentinel, options.delete_originals, &template_source);
    journal.write(dir)?;
    if let Err(e) = fs::rename(dir, backup) {
        let _ = Journal::remove(dir);
        return Err(FixError::io(format!(
            "failed to move {} to {}",
            dir.display(),
            backup.display()
        ))(e));
    }
    Ok(journal)
}

/// Absolute template path as it exists after the rename. A template inside `dir` is read
/// from the backup.
fn journaled_template(source: &Path, dir: &Path, backup: &Path) -> Result<PathBuf> {
    let source = absolute(source)?;
    match source.strip_prefix(absolute(dir)?) {
        Ok(relative) => Ok(absolute(backup)?.join(relative)),
        Err(_) => Ok(source),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd =
        std::env::current_dir().map_err(FixError::io("failed to read working directory"))?;
    Ok(cwd.join(path))
}

fn complete(
    dir: &Path,
    backup: &Path,
    template: &Template,
    journal: &Journal,
    sink: &dyn EventSink,
) -> Result<RunOutcome> {
    let report = populate(backup, dir, template, &journal.sentinel, sink)?;

    Journal::remove(backup)?;
    let backup_dir = if journal.delete_originals {
        fs::remove_dir_all(backup)
            .map_err(FixError::io(format!("failed to delete {}", backup.display())))?;
        sink.record(FixEvent::BackupDeleted {
            path: backup.to_path_buf(),
        });
        None
    } else {
        sink.record(FixEvent::BackupRetained {
            path: backup.to_path_buf(),
        });
        Some(backup.to_path_buf())
    };

    Ok(RunOutcome {
        corrected: true,
        result_dir: dir.to_path_buf(),
        backup_dir,
        report,
    })
}

/// Rebuild `dir` from the top-level entries of `backup`.
fn populate(
    backup: &Path,
    dir: &Path,
    template: &Template,
    sentinel: &str,
    sink: &dyn EventSink,
) -> Result<RunReport> {
    let mut report = RunReport::default();

    let entries = WalkDir::new(backup)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in entries {
        let entry = entry.map_err(|e| FixError::Io {
            context: format!("failed to list {}", backup.display()),
            source: e.into(),
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_journal_file(&name) {
            continue;
        }
        let source = entry.path();
        let target = dir.join(entry.file_name());

        let status = if source.is_dir() {
            // Nested directories are relocated, not corrected.
            copy_tree(source, &target)?;
            sink.record(FixEvent::SubdirectoryCopied {
                path: source.to_path_buf(),
            });
            FileStatus::SubdirectoryCopied
        } else {
            migrate_file(source, &target, template, sentinel, sink)?
        };
        report.files.push(FileRecord { name, status });
    }

    Ok(report)
}

fn migrate_file(
    source: &Path,
    target: &Path,
    template: &Template,
    sentinel: &str,
    sink: &dyn EventSink,
) -> Result<FileStatus> {
    match correction::correct_file(source, template, sentinel) {
        FileOutcome::Corrected { bytes, tags } => match fs::write(target, &bytes) {
            Ok(()) => {
                sink.record(FixEvent::FileCorrected {
                    path: source.to_path_buf(),
                    tags: tags.clone(),
                });
                Ok(FileStatus::Corrected {
                    tags: tags.into_iter().map(format_tag).collect(),
                })
            }
            Err(e) => {
                let reason = format!("failed to write {}: {}", target.display(), e);
                fall_back(source, target, reason, sink)
            }
        },
        FileOutcome::Unchanged => {
            copy_file(source, target)?;
            sink.record(FixEvent::FileUnchanged {
                path: source.to_path_buf(),
            });
            Ok(FileStatus::Unchanged)
        }
        FileOutcome::CopyFallback { reason } => fall_back(source, target, reason, sink),
    }
}

/// Keep the original bytes. Failing to do even that is fatal for the run.
fn fall_back(
    source: &Path,
    target: &Path,
    reason: String,
    sink: &dyn EventSink,
) -> Result<FileStatus> {
    copy_file(source, target)?;
    sink.record(FixEvent::FileFallbackCopied {
        path: source.to_path_buf(),
        reason: reason.clone(),
    });
    Ok(FileStatus::FallbackCopied { reason })
}

fn copy_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).map_err(FixError::io(format!(
        "failed to copy {} to {}",
        source.display(),
        target.display()
    )))?;
    Ok(())
}

/// Verbatim recursive copy of `source` to `target`.
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| FixError::Io {
            context: format!("failed to walk {}", source.display()),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(source).unwrap_or(Path::new(""));
        let destination = target.join(relative);
        if entry.path().is_dir() {
            fs::create_dir_all(&destination).map_err(FixError::io(format!(
                "failed to create {}",
                destination.display()
            )))?;
        } else {
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}
