//
// correction.rs
// Dicom-Tagfix
//
// Per-file tag substitution: every element carrying the sentinel takes the template's
// value for the same tag. Any failure abandons the whole file in favour of a verbatim copy.
//

use std::path::Path;

use dicom::core::{DataElement, Tag};

use crate::error::{FixError, Result};
use crate::template::Template;
use crate::{codec, predicate};

#[derive(Debug)]
pub enum FileOutcome {
    /// Serialized file with the listed tags replaced.
    Corrected { bytes: Vec<u8>, tags: Vec<Tag> },
    /// Parsed fine, nothing matched. The original bytes are kept.
    Unchanged,
    /// Reading, substituting or serializing failed. The original bytes are kept.
    CopyFallback { reason: String },
}

pub fn correct_file(path: &Path, template: &Template, sentinel: &str) -> FileOutcome {
    match try_correct(path, template, sentinel) {
        Ok(Some((bytes, tags))) => FileOutcome::Corrected { bytes, tags },
        Ok(None) => FileOutcome::Unchanged,
        Err(e) => FileOutcome::CopyFallback {
            reason: e.to_string(),
        },
    }
}

fn try_correct(
    path: &Path,
    template: &Template,
    sentinel: &str,
) -> Result<Option<(Vec<u8>, Vec<Tag>)>> {
    let mut obj = codec::open_full(path)?;
    let matched = predicate::matching_tags(&obj, sentinel);
    if matched.is_empty() {
        return Ok(None);
    }

    let mut tags = Vec::with_capacity(matched.len());
    for (tag, vr) in matched {
        let replacement = template
            .element(tag)
            .ok_or(FixError::TagAbsentInTemplate(tag))?;
        // Value only: the file keeps its own VR for the element.
        obj.put(DataElement::new(tag, vr, replacement.value().clone()));
        tags.push(tag);
    }

    let bytes = codec::to_bytes(&obj, path)?;
    Ok(Some((bytes, tags)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;
    use crate::testing::{patient, write_dicom, INSTITUTION_NAME, PATIENT_ID, PATIENT_NAME};
    use dicom::core::{PrimitiveValue, VR};
    use std::fs;
    use tempfile::tempdir;

    fn text(obj: &dicom::object::DefaultDicomObject, tag: Tag) -> String {
        obj.element(tag).expect("element").to_str().unwrap().into_owned()
    }

    #[test]
    fn matched_tag_takes_template_value() {
        let dir = tempdir().expect("tempdir");
        let template_path = dir.path().join("template.dcm");
        write_dicom(&template_path, patient("TEMPLATE"));
        let template = template::resolve(&template_path).expect("template");

        let path = dir.path().join("f1.dcm");
        write_dicom(&path, patient("Mueller Error!"));

        let bytes = match correct_file(&path, &template, "Error!") {
            FileOutcome::Corrected { bytes, tags } => {
                assert_eq!(tags, vec![PATIENT_NAME]);
                bytes
            }
            other => panic!("expected correction, got {other:?}"),
        };

        let out = dir.path().join("out.dcm");
        fs::write(&out, bytes).expect("write");
        let corrected = codec::open_full(&out).expect("open");
        assert_eq!(text(&corrected, PATIENT_NAME), "TEMPLATE");
        assert_eq!(text(&corrected, PATIENT_ID), "PAT123");
    }

    #[test]
    fn clean_file_is_unchanged() {
        let dir = tempdir().expect("tempdir");
        let template_path = dir.path().join("template.dcm");
        write_dicom(&template_path, patient("TEMPLATE"));
        let template = template::resolve(&template_path).expect("template");

        let path = dir.path().join("f2.dcm");
        write_dicom(&path, patient("Schmidt"));

        assert!(matches!(
            correct_file(&path, &template, "Error!"),
            FileOutcome::Unchanged
        ));
    }

    #[test]
    fn tag_missing_from_template_falls_back() {
        let dir = tempdir().expect("tempdir");
        let template_path = dir.path().join("template.dcm");
        write_dicom(&template_path, patient("TEMPLATE"));
        let template = template::resolve(&template_path).expect("template");

        let path = dir.path().join("f1.dcm");
        let mut elements = patient("Mueller Error!");
        elements.push(DataElement::new(
            INSTITUTION_NAME,
            VR::LO,
            PrimitiveValue::from("Kinderspital Error!"),
        ));
        write_dicom(&path, elements);

        match correct_file(&path, &template, "Error!") {
            FileOutcome::CopyFallback { reason } => {
                assert!(reason.contains("absent from the template"))
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_file_falls_back() {
        let dir = tempdir().expect("tempdir");
        let template_path = dir.path().join("template.dcm");
        write_dicom(&template_path, patient("TEMPLATE"));
        let template = template::resolve(&template_path).expect("template");

        let path = dir.path().join("notes.txt");
        fs::write(&path, b"Error! but not DICOM").expect("write");

        assert!(matches!(
            correct_file(&path, &template, "Error!"),
            FileOutcome::CopyFallback { .. }
        ));
    }
}
