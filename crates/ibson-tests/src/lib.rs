//! Shared helpers for the integration tests and benches.
//!
//! - [`encode`] and [`reference_decode`] drive the `bson` crate, which
//!   serves as the reference implementation.
//! - [`from_reference`] converts its output into this workspace's
//!   [`Document`] so the two decoders can be compared with `==`.
//! - [`nested`] writes deeply nested documents directly, without building
//!   them through a recursive encoder.
//! - [`doc`], [`elem`] and [`string`] hand-build wire bytes for cases the
//!   reference encoder cannot produce.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]

use bson::Bson;
use ibson_types::{Decimal128, Document, ObjectId, Value};

/// Serialise a reference document to wire bytes.
#[must_use]
pub fn encode(doc: &bson::Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.to_writer(&mut buf)
        .expect("reference encoder accepts the document");
    buf
}

/// Decode wire bytes with the reference decoder.
#[must_use]
pub fn reference_decode(bytes: &[u8]) -> bson::Document {
    bson::Document::from_reader(bytes).expect("reference decoder accepts the bytes")
}

/// Convert a reference document into a [`Document`], keeping field order.
#[must_use]
pub fn from_reference(doc: &bson::Document) -> Document {
    doc.iter()
        .map(|(key, value)| (key.clone(), value_from_reference(value)))
        .collect()
}

/// Convert one reference value.
///
/// # Panics
///
/// On `DbPointer`, whose fields the `bson` crate keeps private; tests
/// build those bytes by hand instead.
#[must_use]
pub fn value_from_reference(value: &Bson) -> Value {
    match value {
        Bson::Double(d) => Value::Double(*d),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Document(doc) => Value::Document(from_reference(doc)),
        Bson::Array(items) => Value::Array(items.iter().map(value_from_reference).collect()),
        Bson::Binary(binary) => Value::Binary {
            subtype: u8::from(binary.subtype),
            bytes: binary.bytes.clone(),
        },
        Bson::Undefined => Value::Undefined,
        Bson::ObjectId(id) => Value::ObjectId(ObjectId::from_bytes(id.bytes())),
        Bson::Boolean(b) => Value::Boolean(*b),
        Bson::DateTime(dt) => Value::DateTime(dt.timestamp_millis()),
        Bson::Null => Value::Null,
        Bson::RegularExpression(regex) => Value::Regex {
            pattern: regex.pattern.clone(),
            flags: regex.options.clone(),
        },
        Bson::JavaScriptCode(source) => Value::Code {
            source: source.clone(),
        },
        Bson::Symbol(name) => Value::Symbol { name: name.clone() },
        Bson::JavaScriptCodeWithScope(cws) => Value::CodeWithScope {
            source: cws.code.clone(),
            scope: from_reference(&cws.scope),
        },
        Bson::Int32(n) => Value::Int32(*n),
        Bson::Timestamp(ts) => Value::Timestamp((u64::from(ts.time) << 32) | u64::from(ts.increment)),
        Bson::Int64(n) => Value::Int64(*n),
        Bson::Decimal128(d) => Value::Decimal128(Decimal128::from_le_bytes(d.bytes())),
        Bson::MinKey => Value::MinKey,
        Bson::MaxKey => Value::MaxKey,
        other => panic!("no conversion for reference value {other:?}"),
    }
}

// ── Hand-built wire bytes ─────────────────────────────────────────────────────

/// Wrap an element list in a length prefix and terminator.
#[must_use]
pub fn doc(body: &[u8]) -> Vec<u8> {
    let mut out = i32::try_from(body.len() + 5)
        .expect("fixture fits in i32")
        .to_le_bytes()
        .to_vec();
    out.extend_from_slice(body);
    out.push(0);
    out
}

/// One element: type byte, NUL-terminated name, value bytes.
#[must_use]
pub fn elem(tag: u8, name: &str, value: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(name.as_bytes());
    out.push(0);
    out.extend_from_slice(value);
    out
}

/// A length-prefixed string payload.
#[must_use]
pub fn string(s: &str) -> Vec<u8> {
    let mut out = i32::try_from(s.len() + 1)
        .expect("fixture fits in i32")
        .to_le_bytes()
        .to_vec();
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    out
}

/// A document nested `depth` containers deep: every container holds a
/// single element named `"0"` of type `tag` (document or array), down to
/// an empty innermost container.
///
/// ```text
/// depth 2, document:  { "0": { "0": {} } }
/// depth 2, array:     { "0": [ [] ] }
/// ```
#[must_use]
pub fn nested(depth: usize, tag: u8) -> Vec<u8> {
    // each level adds: length (4) + tag (1) + "0\0" (2) + terminator (1)
    const LEVEL: usize = 8;
    const EMPTY: usize = 5;

    let total = EMPTY + depth * LEVEL;
    let mut out = Vec::with_capacity(total);
    for level in (1..=depth).rev() {
        let length = i32::try_from(EMPTY + level * LEVEL).expect("nesting fits in i32");
        out.extend_from_slice(&length.to_le_bytes());
        out.push(tag);
        out.extend_from_slice(b"0\0");
    }
    out.extend_from_slice(&[5, 0, 0, 0, 0]);
    out.resize(total, 0);
    out
}

/// Walk the `"0"` chain written by [`nested`] and count its containers.
#[must_use]
pub fn nested_depth(doc: &Document) -> usize {
    let mut depth = 0;
    let mut current = doc.get("0");
    while let Some(value) = current {
        depth += 1;
        current = match value {
            Value::Document(inner) => inner.get("0"),
            Value::Array(items) => items.first(),
            _ => None,
        };
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn nested_matches_reference_encoding() {
        let expected = encode(&doc! { "0": { "0": {} } });
        assert_eq!(nested(2, 0x03), expected);
    }

    #[test]
    fn conversion_keeps_order() {
        let converted = from_reference(&doc! { "z": 1, "a": "x" });
        assert_eq!(converted.keys().collect::<Vec<_>>(), ["z", "a"]);
    }
}
