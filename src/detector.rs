//
// detector.rs
// Dicom-Tagfix
//
// Samples one representative file to decide whether a whole directory needs correction.
// Files from one acquisition share the encoding fault, so one sample stands for all.
//

use std::path::Path;

use crate::error::Result;
use crate::events::{EventSink, FixEvent};
use crate::{codec, predicate, scanner};

/// `NotFound` when the directory holds no DICOM file at all: there is nothing to sample.
pub fn is_directory_corrupted(dir: &Path, sentinel: &str, sink: &dyn EventSink) -> Result<bool> {
    let representative = scanner::find_first_valid(dir)?;
    let obj = codec::open_full(&representative)?;
    let corrupted = predicate::any_tag_matches(&obj, sentinel);

    sink.record(FixEvent::CorruptionDecision {
        representative,
        sentinel: sentinel.to_string(),
        corrupted,
    });
    Ok(corrupted)
}
