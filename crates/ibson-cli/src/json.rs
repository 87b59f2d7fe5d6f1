/// Extended-JSON rendering of decoded documents for `ibson decode`.
///
/// Values JSON can hold natively become plain JSON. Everything else gets
/// a single-key `$`-wrapper object so no information is lost:
///
/// ```text
/// ┌──────────────────────┬───────────────────────────────────────────────┐
/// │ Value                │ JSON                                          │
/// ├──────────────────────┼───────────────────────────────────────────────┤
/// │ Double (finite)      │ number                                        │
/// │ Double (NaN, ±inf)   │ {"$numberDouble": "NaN" | "Infinity" | ...}   │
/// │ Int32 / Int64        │ number                                        │
/// │ ObjectId             │ {"$oid": hex}                                 │
/// │ DateTime             │ {"$date": {"$numberLong": "<ms>"}}            │
/// │ Binary               │ {"$binary": {"hex": ..., "subType": "xx"}}    │
/// │ Regex                │ {"$regularExpression": {pattern, options}}    │
/// │ DbPointer            │ {"$dbPointer": {"$ref": ns, "$id": {"$oid"}}} │
/// │ Code / CodeWithScope │ {"$code": src} / {"$code", "$scope"}          │
/// │ Symbol               │ {"$symbol": name}                             │
/// │ Timestamp            │ {"$timestamp": {"t": secs, "i": increment}}   │
/// │ Decimal128           │ {"$numberDecimalBytes": hex, little-endian}   │
/// │ Undefined            │ {"$undefined": true}                          │
/// │ MinKey / MaxKey      │ {"$minKey": 1} / {"$maxKey": 1}               │
/// └──────────────────────┴───────────────────────────────────────────────┘
/// ```
///
/// Rendering recurses once per nesting level, so callers bound the depth
/// when decoding.
use ibson_types::{Document, Value};
use serde_json::{Map, Value as Json, json};

/// Render a document as a JSON object, keeping field order.
pub fn document(doc: &Document) -> Json {
    Json::Object(
        doc.iter()
            .map(|(key, value)| (key.clone(), render(value)))
            .collect::<Map<_, _>>(),
    )
}

/// Render one value.
pub fn render(value: &Value) -> Json {
    match value {
        Value::Double(d) => double(*d),
        Value::String(s) => json!(s),
        Value::Document(doc) => document(doc),
        Value::Array(items) => Json::Array(items.iter().map(render).collect()),
        Value::Binary { subtype, bytes } => json!({
            "$binary": { "hex": hex::encode(bytes), "subType": format!("{subtype:02x}") }
        }),
        Value::Undefined => json!({ "$undefined": true }),
        Value::ObjectId(id) => json!({ "$oid": id.to_hex() }),
        Value::Boolean(b) => json!(b),
        Value::DateTime(ms) => json!({ "$date": { "$numberLong": ms.to_string() } }),
        Value::Null => Json::Null,
        Value::Regex { pattern, flags } => json!({
            "$regularExpression": { "pattern": pattern, "options": flags }
        }),
        Value::DbPointer { namespace, id } => json!({
            "$dbPointer": { "$ref": namespace, "$id": { "$oid": id.to_hex() } }
        }),
        Value::Code { source } => json!({ "$code": source }),
        Value::Symbol { name } => json!({ "$symbol": name }),
        Value::CodeWithScope { source, scope } => json!({
            "$code": source,
            "$scope": document(scope)
        }),
        Value::Int32(n) => json!(n),
        Value::Timestamp(ts) => json!({ "$timestamp": { "t": ts >> 32, "i": ts & 0xFFFF_FFFF } }),
        Value::Int64(n) => json!(n),
        Value::Decimal128(d) => json!({ "$numberDecimalBytes": hex::encode(d.to_le_bytes()) }),
        Value::MinKey => json!({ "$minKey": 1 }),
        Value::MaxKey => json!({ "$maxKey": 1 }),
    }
}

fn double(d: f64) -> Json {
    if let Some(n) = serde_json::Number::from_f64(d) {
        return Json::Number(n);
    }
    let text = if d.is_nan() {
        "NaN"
    } else if d.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    };
    json!({ "$numberDouble": text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibson_types::{Decimal128, ObjectId};
    use insta::assert_snapshot;

    fn compact(value: &Value) -> String {
        render(value).to_string()
    }

    #[test]
    fn plain_values_stay_plain() {
        let doc: Document = [
            ("b", Value::Boolean(true)),
            ("a", Value::Int32(1)),
            ("s", Value::from("x")),
            ("n", Value::Null),
            ("l", Value::Int64(-5)),
            ("d", Value::Double(1.5)),
        ]
        .into_iter()
        .collect();
        assert_snapshot!(document(&doc).to_string(), @r#"{"b":true,"a":1,"s":"x","n":null,"l":-5,"d":1.5}"#);
    }

    #[test]
    fn nested_containers() {
        let inner: Document = [("k", Value::Array(vec![Value::Int32(1), Value::Int32(2)]))]
            .into_iter()
            .collect();
        let doc: Document = [("outer", Value::Document(inner))].into_iter().collect();
        assert_snapshot!(document(&doc).to_string(), @r#"{"outer":{"k":[1,2]}}"#);
    }

    #[test]
    fn wrapped_values() {
        let id = ObjectId::from_bytes([0x50, 0x7f, 0x1f, 0x77, 0xbc, 0xf8, 0x6c, 0xd7, 0x99, 0x43, 0x90, 0x11]);
        assert_snapshot!(compact(&Value::ObjectId(id)), @r#"{"$oid":"507f1f77bcf86cd799439011"}"#);
        assert_snapshot!(compact(&Value::DateTime(1_000)), @r#"{"$date":{"$numberLong":"1000"}}"#);
        assert_snapshot!(
            compact(&Value::Binary { subtype: 4, bytes: vec![0xde, 0xad] }),
            @r#"{"$binary":{"hex":"dead","subType":"04"}}"#
        );
        assert_snapshot!(
            compact(&Value::Regex { pattern: "^a".into(), flags: "im".into() }),
            @r#"{"$regularExpression":{"pattern":"^a","options":"im"}}"#
        );
        assert_snapshot!(compact(&Value::Timestamp((7 << 32) | 3)), @r#"{"$timestamp":{"t":7,"i":3}}"#);
        assert_snapshot!(compact(&Value::MinKey), @r#"{"$minKey":1}"#);
        assert_snapshot!(compact(&Value::MaxKey), @r#"{"$maxKey":1}"#);
        assert_snapshot!(compact(&Value::Undefined), @r#"{"$undefined":true}"#);
    }

    #[test]
    fn code_with_scope_renders_scope() {
        let scope: Document = [("x", Value::Int32(1))].into_iter().collect();
        let value = Value::CodeWithScope {
            source: "x + 1".into(),
            scope,
        };
        assert_snapshot!(compact(&value), @r#"{"$code":"x + 1","$scope":{"x":1}}"#);
    }

    #[test]
    fn non_finite_doubles() {
        assert_snapshot!(compact(&Value::Double(f64::NAN)), @r#"{"$numberDouble":"NaN"}"#);
        assert_snapshot!(compact(&Value::Double(f64::NEG_INFINITY)), @r#"{"$numberDouble":"-Infinity"}"#);
    }

    #[test]
    fn decimal_keeps_raw_bytes() {
        let mut bytes = [0u8; 16];
        bytes[0] = 1;
        bytes[15] = 0x30;
        let value = Value::Decimal128(Decimal128::from_le_bytes(bytes));
        assert_snapshot!(compact(&value), @r#"{"$numberDecimalBytes":"01000000000000000000000000000030"}"#);
    }
}
