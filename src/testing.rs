//
// testing.rs
// Dicom-Tagfix
//
// Fixture builders shared by the unit tests.
//

use std::path::Path;

use dicom::core::{DataElement, Tag};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::mem::InMemElement;
use dicom::object::{FileDicomObject, FileMetaTableBuilder};
use dicom::transfer_syntax::entries::EXPLICIT_VR_LITTLE_ENDIAN;

pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const INSTITUTION_NAME: Tag = Tag(0x0008, 0x0080);

/// Write a small Secondary Capture instance holding `elements`.
pub fn write_dicom(path: &Path, elements: Vec<InMemElement>) {
    let meta = FileMetaTableBuilder::new()
        .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN.uid())
        .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
        .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1")
        .build()
        .expect("meta");

    let mut file_obj = FileDicomObject::new_empty_with_dict_and_meta(StandardDataDictionary, meta);
    for elem in elements {
        file_obj.put(elem);
    }
    file_obj.write_to_file(path).expect("write test dicom");
}

pub fn patient(name: &str) -> Vec<InMemElement> {
    use dicom::core::{PrimitiveValue, VR};

    vec![
        DataElement::new(PATIENT_NAME, VR::PN, PrimitiveValue::from(name)),
        DataElement::new(PATIENT_ID, VR::LO, PrimitiveValue::from("PAT123")),
    ]
}
