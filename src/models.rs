//
// models.rs
// Dicom-Tagfix
//
// Serializable run results: the per-file report and the overall outcome of a correction run.
//

use std::path::PathBuf;

use serde::Serialize;

/// What happened to one top-level entry of the backup directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Tags rewritten from the template, formatted as `(GGGG,EEEE)`.
    Corrected { tags: Vec<String> },
    Unchanged,
    FallbackCopied { reason: String },
    SubdirectoryCopied,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub files: Vec<FileRecord>,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }

    pub fn corrected(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Corrected { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::Unchanged))
    }

    pub fn fallback_copied(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::FallbackCopied { .. }))
    }

    pub fn subdirectories(&self) -> usize {
        self.count(|s| matches!(s, FileStatus::SubdirectoryCopied))
    }
}

/// Result of a run: whether anything was rewritten, and where the result lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub corrected: bool,
    pub result_dir: PathBuf,
    /// Kept originals, when the run corrected and was asked to retain them.
    pub backup_dir: Option<PathBuf>,
    pub report: RunReport,
}

impl RunOutcome {
    pub fn clean(dir: PathBuf) -> Self {
        Self {
            corrected: false,
            result_dir: dir,
            backup_dir: None,
            report: RunReport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, status: FileStatus) -> FileRecord {
        FileRecord {
            name: name.to_string(),
            status,
        }
    }

    #[test]
    fn counts_by_status() {
        let report = RunReport {
            files: vec![
                record(
                    "f1.dcm",
                    FileStatus::Corrected {
                        tags: vec!["(0010,0010)".into()],
                    },
                ),
                record("f2.dcm", FileStatus::Unchanged),
                record(
                    "notes.txt",
                    FileStatus::FallbackCopied {
                        reason: "not DICOM".into(),
                    },
                ),
                record("series2", FileStatus::SubdirectoryCopied),
            ],
        };

        assert_eq!(report.corrected(), 1);
        assert_eq!(report.unchanged(), 1);
        assert_eq!(report.fallback_copied(), 1);
        assert_eq!(report.subdirectories(), 1);
    }

    #[test]
    fn report_serializes_with_flat_status() {
        let report = RunReport {
            files: vec![record("f2.dcm", FileStatus::Unchanged)],
        };
        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(
            json,
            serde_json::json!({ "files": [ { "name": "f2.dcm", "status": "unchanged" } ] })
        );
    }
}
