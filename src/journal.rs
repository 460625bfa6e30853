//
// journal.rs
// Dicom-Tagfix
//
// Persisted marker recording an in-flight correction so an interrupted run can be resumed.
//

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FixError, Result};

pub const JOURNAL_FILE_NAME: &str = ".dicom-tagfix-journal.json";
const JOURNAL_TMP_FILE_NAME: &str = ".dicom-tagfix-journal.json.tmp";

/// The journal itself or a leftover temporary from an interrupted write. Nothing else.
pub fn is_journal_file(file_name: &str) -> bool {
    file_name == JOURNAL_FILE_NAME || file_name == JOURNAL_TMP_FILE_NAME
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Written into the target just before it is renamed to the backup.
    Staged,
    /// Backup in place, corrected directory being populated.
    Populating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    pub phase: Phase,
    pub sentinel: String,
    pub delete_originals: bool,
    pub template_source: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl Journal {
    pub fn new(sentinel: &str, delete_originals: bool, template_source: &Path) -> Self {
        Self {
            phase: Phase::Staged,
            sentinel: sentinel.to_string(),
            delete_originals,
            template_source: template_source.to_path_buf(),
            started_at: Utc::now(),
        }
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(JOURNAL_FILE_NAME)
    }

    /// Write via a temporary file and rename, so a reader never sees half a journal.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        let tmp = dir.join(JOURNAL_TMP_FILE_NAME);
        let json = serde_json::to_vec_pretty(self).map_err(|source| FixError::Journal {
            path: path.clone(),
            source,
        })?;
        fs::write(&tmp, json)
            .map_err(FixError::io(format!("failed to write journal {}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(FixError::io(format!("failed to commit journal {}", path.display())))
    }

    /// `Ok(None)` when `dir` holds no journal.
    pub fn read(dir: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(dir);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)
            .map_err(FixError::io(format!("failed to read journal {}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| FixError::Journal { path, source })
    }

    pub fn remove(dir: &Path) -> Result<()> {
        let path = Self::path_in(dir);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(FixError::io(format!("failed to remove journal {}", path.display())))?;
        }
        Ok(())
    }
}
