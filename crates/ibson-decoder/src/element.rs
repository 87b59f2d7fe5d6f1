use ibson_types::{Decimal128, ElementType, ObjectId, Value};
use ibson_wire::WireError;
use ibson_wire::bytes::{
    Utf8Mode, copy_bytes, read_array, read_cstring, read_f64_le, read_i32_le, read_i64_le, read_length,
    read_string, read_u8, read_u64_le,
};

use crate::error::DecodeError;
use crate::queue::ContainerKind;

/// Result of decoding one element's value.
#[derive(Debug, PartialEq)]
pub(crate) enum DecodedElement {
    /// A finished leaf.
    Leaf(Value),
    /// A document or array whose children still need their own pass.
    Container(ContainerKind),
    /// Code-with-scope: the source is decoded, the scope is not.
    /// `code_length` is the code string's length prefix, needed to find
    /// the scope.
    CodeWithScope { source: String, code_length: usize },
}

/// Decode the value bytes of one element.
///
/// `value` is exactly the element's value payload as sized by the
/// enumerator; `base` is its absolute offset, used only for errors.
///
/// # Errors
///
/// [`DecodeError::MalformedLength`] if an inner length prefix runs past
/// the payload, [`DecodeError::InvalidUtf8`] in strict mode, or
/// [`DecodeError::Malformed`] for a string without its terminator.
pub(crate) fn decode_element(
    element_type: ElementType,
    value: &[u8],
    base: usize,
    utf8: Utf8Mode,
) -> Result<DecodedElement, DecodeError> {
    decode_value(element_type, value, utf8).map_err(|e| DecodeError::from_wire(e, base))
}

fn decode_value(element_type: ElementType, v: &[u8], utf8: Utf8Mode) -> Result<DecodedElement, WireError> {
    let leaf = match element_type {
        ElementType::Document => return Ok(DecodedElement::Container(ContainerKind::Map)),
        ElementType::Array => return Ok(DecodedElement::Container(ContainerKind::Sequence)),
        ElementType::CodeWithScope => {
            // int32 total, then the code string
            let (source, consumed) = read_string(v, 4, utf8)?;
            return Ok(DecodedElement::CodeWithScope {
                source,
                code_length: consumed - 4,
            });
        }

        ElementType::Double => Value::Double(read_f64_le(v, 0)?),
        ElementType::String => Value::String(read_string(v, 0, utf8)?.0),
        ElementType::Binary => {
            let len = read_length(v, 0)?;
            Value::Binary {
                subtype: read_u8(v, 4)?,
                bytes: copy_bytes(v, 5, len)?,
            }
        }
        ElementType::Undefined => Value::Undefined,
        ElementType::ObjectId => Value::ObjectId(ObjectId::from_bytes(read_array(v, 0)?)),
        ElementType::Boolean => Value::Boolean(read_u8(v, 0)? != 0),
        ElementType::DateTime => Value::DateTime(read_i64_le(v, 0)?),
        ElementType::Null => Value::Null,
        ElementType::Regex => {
            let (pattern, consumed) = read_cstring(v, 0, utf8)?;
            let (flags, _) = read_cstring(v, consumed, utf8)?;
            Value::Regex { pattern, flags }
        }
        ElementType::DbPointer => {
            // id starts right after the namespace string: 4 + its length
            let (namespace, consumed) = read_string(v, 0, utf8)?;
            Value::DbPointer {
                namespace,
                id: ObjectId::from_bytes(read_array(v, consumed)?),
            }
        }
        ElementType::Code => Value::Code {
            source: read_string(v, 0, utf8)?.0,
        },
        ElementType::Symbol => Value::Symbol {
            name: read_string(v, 0, utf8)?.0,
        },
        ElementType::Int32 => Value::Int32(read_i32_le(v, 0)?),
        ElementType::Timestamp => Value::Timestamp(read_u64_le(v, 0)?),
        ElementType::Int64 => Value::Int64(read_i64_le(v, 0)?),
        ElementType::Decimal128 => Value::Decimal128(Decimal128::from_le_bytes(read_array(v, 0)?)),
        ElementType::MinKey => Value::MinKey,
        ElementType::MaxKey => Value::MaxKey,
    };
    Ok(DecodedElement::Leaf(leaf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::string;

    fn leaf(element_type: ElementType, value: &[u8]) -> Value {
        match decode_element(element_type, value, 0, Utf8Mode::Strict).unwrap() {
            DecodedElement::Leaf(v) => v,
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn fixed_width_scalars() {
        assert_eq!(leaf(ElementType::Double, &1.25f64.to_le_bytes()), Value::Double(1.25));
        assert_eq!(leaf(ElementType::Int32, &(-7i32).to_le_bytes()), Value::Int32(-7));
        assert_eq!(leaf(ElementType::Int64, &(1i64 << 40).to_le_bytes()), Value::Int64(1 << 40));
        assert_eq!(leaf(ElementType::DateTime, &(-1i64).to_le_bytes()), Value::DateTime(-1));
        assert_eq!(leaf(ElementType::Boolean, &[0]), Value::Boolean(false));
        assert_eq!(leaf(ElementType::Boolean, &[2]), Value::Boolean(true));
    }

    #[test]
    fn zero_width_values() {
        assert_eq!(leaf(ElementType::Null, &[]), Value::Null);
        assert_eq!(leaf(ElementType::Undefined, &[]), Value::Undefined);
        assert_eq!(leaf(ElementType::MinKey, &[]), Value::MinKey);
        assert_eq!(leaf(ElementType::MaxKey, &[]), Value::MaxKey);
    }

    #[test]
    fn timestamp_keeps_raw_bits() {
        let raw = (1_700_000_000u64 << 32) | 5;
        let value = leaf(ElementType::Timestamp, &raw.to_le_bytes());
        assert_eq!(value, Value::Timestamp(raw));
        assert_eq!(value.timestamp_time(), Some(1_700_000_000));
        assert_eq!(value.timestamp_increment(), Some(5));
    }

    #[test]
    fn decimal128_halves() {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&42u64.to_le_bytes());
        bytes[8..].copy_from_slice(&0x3040_0000_0000_0000u64.to_le_bytes());
        let Value::Decimal128(d) = leaf(ElementType::Decimal128, &bytes) else {
            panic!("expected decimal128");
        };
        assert_eq!(d.low, 42);
        assert_eq!(d.high, 0x3040_0000_0000_0000);
        assert_eq!(d.to_le_bytes(), bytes);
    }

    #[test]
    fn string_like_values() {
        let s = string("hi");
        assert_eq!(leaf(ElementType::String, &s), Value::from("hi"));
        assert_eq!(
            leaf(ElementType::Code, &s),
            Value::Code {
                source: "hi".into()
            }
        );
        assert_eq!(leaf(ElementType::Symbol, &s), Value::Symbol { name: "hi".into() });
    }

    #[test]
    fn binary_copies_payload() {
        let mut v = 3i32.to_le_bytes().to_vec();
        v.push(0x04);
        v.extend_from_slice(&[9, 8, 7]);
        assert_eq!(
            leaf(ElementType::Binary, &v),
            Value::Binary {
                subtype: 4,
                bytes: vec![9, 8, 7]
            }
        );
    }

    #[test]
    fn regex_pattern_and_flags() {
        assert_eq!(
            leaf(ElementType::Regex, b"^a.c$\0imx\0"),
            Value::Regex {
                pattern: "^a.c$".into(),
                flags: "imx".into()
            }
        );
    }

    #[test]
    fn db_pointer_id_follows_namespace() {
        let mut v = string("db.things");
        v.extend_from_slice(&[0x11; 12]);
        assert_eq!(
            leaf(ElementType::DbPointer, &v),
            Value::DbPointer {
                namespace: "db.things".into(),
                id: ObjectId::from_bytes([0x11; 12]),
            }
        );
    }

    #[test]
    fn containers_are_placeholders() {
        assert_eq!(
            decode_element(ElementType::Array, &[5, 0, 0, 0, 0], 0, Utf8Mode::Strict).unwrap(),
            DecodedElement::Container(ContainerKind::Sequence)
        );
    }

    #[test]
    fn code_with_scope_reports_code_length() {
        let mut v = 0i32.to_le_bytes().to_vec();
        v.extend(string("f()"));
        v.extend_from_slice(&[5, 0, 0, 0, 0]);
        let total = i32::try_from(v.len()).unwrap().to_le_bytes();
        v[..4].copy_from_slice(&total);

        assert_eq!(
            decode_element(ElementType::CodeWithScope, &v, 0, Utf8Mode::Strict).unwrap(),
            DecodedElement::CodeWithScope {
                source: "f()".into(),
                code_length: 4
            }
        );
    }

    #[test]
    fn inner_length_past_payload_is_malformed_length() {
        // binary claims 10 bytes, payload has 2
        let mut v = 10i32.to_le_bytes().to_vec();
        v.extend_from_slice(&[0, 1, 2]);
        let err = decode_element(ElementType::Binary, &v, 50, Utf8Mode::Strict).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedLength { offset: 55, declared: 10, .. }));
    }

    #[test]
    fn utf8_mode_is_honoured() {
        let v = [3, 0, 0, 0, b'a', 0xFF, 0];
        assert!(matches!(
            decode_element(ElementType::String, &v, 20, Utf8Mode::Strict),
            Err(DecodeError::InvalidUtf8 { offset: 25 })
        ));
        assert_eq!(
            decode_element(ElementType::String, &v, 20, Utf8Mode::Lossy).unwrap(),
            DecodedElement::Leaf(Value::from("a\u{FFFD}"))
        );
    }
}
