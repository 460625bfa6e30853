//
// render.rs
// Dicom-Tagfix
//
// Renders a nested dataset as text, one element per line, recursing through sequences.
// This is the printable form that sequence items are searched through.
//

use std::borrow::Cow;
use std::fmt::Write;

use dicom::core::dictionary::DataDictionary;
use dicom::core::value::Value;
use dicom::core::{PrimitiveValue, Tag};
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::InMemDicomObject;

/// Full textual form of a dataset: no depth limit, no value truncation.
pub fn render_dataset(obj: &InMemDicomObject) -> String {
    let mut out = String::new();
    render_object(obj, 0, &mut out);
    out
}

fn render_object(obj: &InMemDicomObject, depth: usize, out: &mut String) {
    // Sequence items are matched against this text, so every nesting level and every value
    // is written in full. A cut here would hide a sentinel from the predicate.
    for elem in obj.iter() {
        let tag = elem.header().tag;
        let vr = elem.header().vr;
        let name = tag_name(tag);
        let indent = "  ".repeat(depth);

        match elem.value() {
            Value::Primitive(p) => {
                let _ = writeln!(
                    out,
                    "{}{} {} {} {}",
                    indent,
                    format_tag(tag),
                    name,
                    vr,
                    primitive_text(p)
                );
            }
            Value::Sequence(seq) => {
                let _ = writeln!(
                    out,
                    "{}{} {} {} [sequence: {} item(s)]",
                    indent,
                    format_tag(tag),
                    name,
                    vr,
                    seq.items().len()
                );
                for (idx, item) in seq.items().iter().enumerate() {
                    let _ = writeln!(out, "{}  Item {}", indent, idx + 1);
                    render_object(item, depth + 2, out);
                }
            }
            Value::PixelSequence(p) => {
                let _ = writeln!(
                    out,
                    "{}{} {} {} [encapsulated: {} fragment(s)]",
                    indent,
                    format_tag(tag),
                    name,
                    vr,
                    p.fragments().len()
                );
            }
        }
    }
}

/// String form of a primitive value. Raw bytes are decoded as lossy UTF-8.
pub fn primitive_text(value: &PrimitiveValue) -> Cow<'_, str> {
    match value {
        PrimitiveValue::U8(bytes) => String::from_utf8_lossy(bytes),
        other => other.to_str(),
    }
}

pub fn format_tag(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

fn tag_name(tag: Tag) -> String {
    StandardDataDictionary::default()
        .by_tag(tag)
        .map(|e| e.alias.to_string())
        .unwrap_or_else(|| "UnknownTag".to_string())
}
