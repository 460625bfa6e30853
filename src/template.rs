//
// template.rs
// Dicom-Tagfix
//
// Resolves the trusted template dataset from a file, or from the first DICOM file in a directory.
//

use std::path::{Path, PathBuf};

use dicom::core::Tag;
use dicom::object::mem::InMemElement;
use dicom::object::DefaultDicomObject;
use tracing::debug;

use crate::error::{FixError, Result};
use crate::{codec, scanner};

/// Immutable source of correct tag values for one run.
pub struct Template {
    source: PathBuf,
    object: DefaultDicomObject,
}

impl Template {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn element(&self, tag: Tag) -> Option<&InMemElement> {
        self.object.element(tag).ok()
    }
}

pub fn resolve(source: &Path) -> Result<Template> {
    let file = if source.is_dir() {
        scanner::find_first_valid(source)?
    } else if source.is_file() {
        source.to_path_buf()
    } else {
        return Err(FixError::NotFound(format!(
            "template {} does not exist",
            source.display()
        )));
    };

    let object = codec::open_full(&file)?;
    debug!("using template {}", file.display());
    Ok(Template {
        source: file,
        object,
    })
}
