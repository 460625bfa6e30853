//
// scanner.rs
// Dicom-Tagfix
//
// Finds the first parseable DICOM file under a root directory.
//

use std::path::{Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::codec;
use crate::error::{FixError, Result};
use crate::journal::is_journal_file;

/// Index files and our own journal are never candidates.
pub fn is_candidate(file_name: &str) -> bool {
    !file_name.to_lowercase().contains("dicomdir") && !is_journal_file(file_name)
}

/// Walk `root` recursively (sorted by name) and return the first file that parses as DICOM.
///
/// Parse failures only mean "not a DICOM file" and are skipped.
pub fn find_first_valid(root: &Path) -> Result<PathBuf> {
    let candidates = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_candidate(&e.file_name().to_string_lossy()));

    for entry in candidates {
        match codec::open_header(entry.path()) {
            Ok(_) => return Ok(entry.into_path()),
            Err(e) => trace!("skipping {}: {}", entry.path().display(), e),
        }
    }

    Err(FixError::NotFound(format!(
        "no DICOM file under {}",
        root.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JOURNAL_FILE_NAME;
    use crate::testing::{patient, write_dicom};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn skips_dicomdir_and_junk() {
        let dir = tempdir().expect("tempdir");
        // Both sort before the real file.
        write_dicom(&dir.path().join("DICOMDIR"), patient("Index^Only"));
        fs::write(dir.path().join("README"), b"not dicom").expect("write junk");
        let nested = dir.path().join("series1");
        fs::create_dir(&nested).expect("mkdir");
        write_dicom(&nested.join("img001.dcm"), patient("Doe^John"));

        let found = find_first_valid(dir.path()).expect("found");
        assert_eq!(found, nested.join("img001.dcm"));
    }

    #[test]
    fn empty_root_is_not_found() {
        let dir = tempdir().expect("tempdir");
        assert!(matches!(
            find_first_valid(dir.path()),
            Err(FixError::NotFound(_))
        ));
    }

    #[test]
    fn root_with_only_junk_is_not_found() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("a.txt"), b"junk").expect("write");
        fs::write(dir.path().join("dicomdir.bak"), b"junk").expect("write");
        assert!(matches!(
            find_first_valid(dir.path()),
            Err(FixError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_dicomdir_is_still_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().expect("tempdir");
        let index = dir.path().join(OsStr::from_bytes(b"DICOMDIR\xff"));
        write_dicom(&index, patient("Index^Only"));
        write_dicom(&dir.path().join("IM0001"), patient("Doe^John"));

        let found = find_first_valid(dir.path()).expect("found");
        assert_eq!(found, dir.path().join("IM0001"));
    }

    #[test]
    fn candidate_filter_is_case_insensitive() {
        assert!(!is_candidate("DICOMDIR"));
        assert!(!is_candidate("old_DicomDir"));
        assert!(!is_candidate(JOURNAL_FILE_NAME));
        assert!(is_candidate("IM0001"));
    }
}
