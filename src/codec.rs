//
// codec.rs
// Dicom-Tagfix
//
// Thin seam over the DICOM object reader: header-only and full reads, plus in-memory serialization.
//

use std::path::Path;

use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject, OpenFileOptions};

use crate::error::{FixError, Result};

/// Read everything up to (not including) Pixel Data. Enough to tell a DICOM file from junk.
pub fn open_header(path: &Path) -> Result<DefaultDicomObject> {
    OpenFileOptions::new()
        .read_until(tags::PIXEL_DATA)
        .open_file(path)
        .map_err(|source| FixError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Read the whole file, value data included.
pub fn open_full(path: &Path) -> Result<DefaultDicomObject> {
    open_file(path).map_err(|source| FixError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize preamble, file meta group and dataset into memory.
///
/// `origin` is only used for error reporting.
pub fn to_bytes(obj: &DefaultDicomObject, origin: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    obj.write_all(&mut buf).map_err(|source| FixError::Serialize {
        path: origin.to_path_buf(),
        source,
    })?;
    Ok(buf)
}
