//
// error.rs
// Dicom-Tagfix
//
// Error taxonomy shared by the scanner, detector, correction engine and transaction controller.
//

use std::io;
use std::path::PathBuf;

use dicom::core::Tag;
use dicom::object::{ReadError, WriteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixError {
    /// Target directory absent, template unresolvable, or no DICOM file under a scanned root.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to parse {} as DICOM", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("failed to serialize {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: WriteError,
    },

    /// A tag matched the sentinel but the template has no value for it.
    #[error("tag {0} is absent from the template")]
    TagAbsentInTemplate(Tag),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("backup directory {} already exists (interrupted run? try `resume`)", .0.display())]
    BackupExists(PathBuf),

    #[error("sentinel must not be empty")]
    EmptySentinel,

    #[error("malformed journal at {}", path.display())]
    Journal {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FixError {
    /// Adapter for `map_err` on filesystem calls.
    pub fn io(context: impl Into<String>) -> impl FnOnce(io::Error) -> FixError {
        let context = context.into();
        move |source| FixError::Io { context, source }
    }
}

pub type Result<T, E = FixError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_adapter_keeps_context_and_source() {
        let err = FixError::io("failed to rename /a")(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.to_string(), "failed to rename /a");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn tag_absent_names_the_tag() {
        let err = FixError::TagAbsentInTemplate(Tag(0x0010, 0x0010));
        let message = err.to_string();
        assert!(message.contains("0010"));
        assert!(message.ends_with("is absent from the template"));
    }
}
