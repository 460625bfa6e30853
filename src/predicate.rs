//
// predicate.rs
// Dicom-Tagfix
//
// Decides whether a sentinel substring appears in an element's value, across scalar,
// multi-value and nested-sequence shapes.
//

use std::fmt::{Display, Write};

use dicom::core::header::Header;
use dicom::core::value::Value;
use dicom::core::{PrimitiveValue, Tag, VR};
use dicom::object::mem::InMemElement;
use dicom::object::InMemDicomObject;

use crate::render::{primitive_text, render_dataset};

/// Anything that has a string form the sentinel can be searched in.
pub trait Searchable {
    fn contains_text(&self, needle: &str) -> bool;
}

impl Searchable for PrimitiveValue {
    fn contains_text(&self, needle: &str) -> bool {
        match self {
            // Strings and byte blobs are scalars; every other shape is tested item by item
            // so that a match never spans the `\` separator.
            PrimitiveValue::Str(_) | PrimitiveValue::U8(_) => {
                primitive_text(self).contains(needle)
            }
            PrimitiveValue::Strs(items) => items.iter().any(|item| item.contains(needle)),
            PrimitiveValue::I16(items) => any_number_contains(items, needle),
            PrimitiveValue::U16(items) => any_number_contains(items, needle),
            PrimitiveValue::I32(items) => any_number_contains(items, needle),
            PrimitiveValue::U32(items) => any_number_contains(items, needle),
            PrimitiveValue::I64(items) => any_number_contains(items, needle),
            PrimitiveValue::U64(items) => any_number_contains(items, needle),
            PrimitiveValue::F32(items) => any_number_contains(items, needle),
            PrimitiveValue::F64(items) => any_number_contains(items, needle),
            other => other.to_multi_str().iter().any(|item| item.contains(needle)),
        }
    }
}

/// Numeric samples (OW pixel data among them) are formatted one at a time into a single
/// buffer. A needle with characters no number prints cannot match, so the samples are skipped.
fn any_number_contains<T: Display>(items: &[T], needle: &str) -> bool {
    if !needle.chars().all(|c| c.is_ascii_digit() || "+-.eEinfNa".contains(c)) {
        return false;
    }
    let mut buf = String::new();
    items.iter().any(|item| {
        buf.clear();
        let _ = write!(buf, "{item}");
        buf.contains(needle)
    })
}

/// A sequence item matches on its whole printable form, not field by field.
impl Searchable for InMemDicomObject {
    fn contains_text(&self, needle: &str) -> bool {
        render_dataset(self).contains(needle)
    }
}

impl<P: AsRef<[u8]>> Searchable for Value<InMemDicomObject, P> {
    fn contains_text(&self, needle: &str) -> bool {
        match self {
            Value::Primitive(p) => p.contains_text(needle),
            Value::Sequence(seq) => seq.items().iter().any(|item| item.contains_text(needle)),
            Value::PixelSequence(p) => p
                .fragments()
                .iter()
                .any(|f| String::from_utf8_lossy(f.as_ref()).contains(needle)),
        }
    }
}

pub fn contains_sentinel(element: &InMemElement, sentinel: &str) -> bool {
    element.value().contains_text(sentinel)
}

/// Document-order scan, stopping at the first matching element.
pub fn any_tag_matches(obj: &InMemDicomObject, sentinel: &str) -> bool {
    obj.iter().any(|elem| contains_sentinel(elem, sentinel))
}

/// Every top-level element whose value contains the sentinel, with its VR, in document order.
pub fn matching_tags(obj: &InMemDicomObject, sentinel: &str) -> Vec<(Tag, VR)> {
    obj.iter()
        .filter(|elem| contains_sentinel(elem, sentinel))
        .map(|elem| (elem.tag(), elem.vr()))
        .collect()
}
