//! Structural properties of the iterative decoder that hold for any input:
//! offsets nest, the work queue drains, order is preserved, sentinels stay
//! distinct, malformed lengths are fatal, and depth costs no stack.

use bson::{Bson, JavaScriptCodeWithScope, doc};
use ibson_decoder::{
    ContainerKind, DecodeError, DecoderConfig, ElementEvent, IterDecoder, TraversalOrder, traverse,
};
use ibson_tests::{elem, encode, nested, nested_depth};
use ibson_types::{ElementType, Value};

fn sample() -> Vec<u8> {
    encode(&doc! {
        "name": "sample",
        "list": [1, [2, 3], { "in": "array" }],
        "map": { "a": { "b": { "c": [true, false] } } },
        "fn": Bson::JavaScriptCodeWithScope(JavaScriptCodeWithScope {
            code: "f()".to_string(),
            scope: doc! { "s": { "t": 1 } },
        }),
        "tail": Bson::Null,
    })
}

fn events(bytes: &[u8]) -> Vec<ElementEvent> {
    let mut out = Vec::new();
    let mut observer = |e: &ElementEvent| out.push(*e);
    IterDecoder::default()
        .decode_observed(bytes, &mut observer)
        .unwrap();
    out
}

// ── Offsets ───────────────────────────────────────────────────────────────────

#[test]
fn child_offsets_lie_inside_their_container() {
    let bytes = sample();
    for e in events(&bytes) {
        let container_end = e.container_offset + e.container_length;
        // type byte sits just before the name, after the length prefix
        assert!(e.name_offset - 1 > e.container_offset + 3, "{e:?}");
        assert!(e.value_offset > e.name_offset, "{e:?}");
        // the container's own terminator follows the last value
        assert!(e.value_offset + e.value_length < container_end, "{e:?}");
    }
}

#[test]
fn nested_containers_start_at_their_parent_value() {
    let bytes = sample();
    let all = events(&bytes);
    for e in &all {
        if matches!(e.element_type, ElementType::Document | ElementType::Array) {
            let child = all
                .iter()
                .find(|c| c.container_offset == e.value_offset)
                .map(|c| c.container_length);
            // empty containers produce no child events
            if let Some(length) = child {
                assert_eq!(length, e.value_length);
            }
        }
    }
}

#[test]
fn traverse_reports_same_offsets_as_decoder() {
    let bytes = sample();
    let mut walked = Vec::new();
    let mut observer = |e: &ElementEvent| walked.push((e.name_offset, e.value_offset, e.value_length));
    traverse(&bytes, TraversalOrder::Fifo, &mut observer).unwrap();

    let decoded: Vec<_> = events(&bytes)
        .iter()
        .map(|e| (e.name_offset, e.value_offset, e.value_length))
        .collect();
    assert_eq!(walked, decoded);
}

// ── Queue drains ──────────────────────────────────────────────────────────────

#[test]
fn every_enqueued_job_is_processed() {
    let decoded = IterDecoder::default()
        .decode_observed(&sample(), &mut ibson_decoder::NoopObserver)
        .unwrap();
    let stats = decoded.stats;
    // root, list, [2, 3], { in }, map, a, b, c, scope, s
    assert_eq!(stats.jobs_enqueued, 10);
    assert_eq!(stats.jobs_processed, stats.jobs_enqueued);
}

#[test]
fn breadth_first_visits_shallow_containers_first() {
    let depths: Vec<_> = events(&sample()).iter().map(|e| e.depth).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]), "{depths:?}");
}

// ── Order ─────────────────────────────────────────────────────────────────────

#[test]
fn keys_iterate_in_wire_order() {
    let doc = IterDecoder::decode(&encode(&doc! { "a": 1, "b": 2, "c": 3 })).unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
}

#[test]
fn sequence_keeps_positions() {
    let doc = IterDecoder::decode(&encode(&doc! { "xs": [1, 2, 3, 4, 5, 6, 7, 8] })).unwrap();
    let xs: Vec<_> = doc
        .get("xs")
        .and_then(Value::as_array)
        .unwrap()
        .iter()
        .filter_map(Value::as_i32)
        .collect();
    assert_eq!(xs, [1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn sequence_ignores_wire_keys() {
    // keys "9" and "x" instead of "0" and "1"
    let array = ibson_tests::doc(
        &[
            elem(0x10, "9", &1i32.to_le_bytes()),
            elem(0x10, "x", &2i32.to_le_bytes()),
        ]
        .concat(),
    );
    let bytes = ibson_tests::doc(&elem(0x04, "arr", &array));
    let doc = IterDecoder::decode(&bytes).unwrap();
    assert_eq!(doc.get("arr"), Some(&Value::Array(vec![Value::Int32(1), Value::Int32(2)])));
}

#[test]
fn duplicate_keys_keep_last_value_in_first_position() {
    let body = [
        elem(0x10, "k", &1i32.to_le_bytes()),
        elem(0x10, "other", &0i32.to_le_bytes()),
        elem(0x10, "k", &2i32.to_le_bytes()),
    ]
    .concat();
    let doc = IterDecoder::decode(&ibson_tests::doc(&body)).unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.keys().collect::<Vec<_>>(), ["k", "other"]);
    assert_eq!(doc.get("k"), Some(&Value::Int32(2)));
}

// ── Sentinels ─────────────────────────────────────────────────────────────────

#[test]
fn min_and_max_key_stay_distinct() {
    let doc = IterDecoder::decode(&encode(&doc! {
        "min": Bson::MinKey,
        "max": Bson::MaxKey,
        "null": Bson::Null,
        "empty": "",
        "zero": 0,
    }))
    .unwrap();
    let min = doc.get("min").unwrap();
    let max = doc.get("max").unwrap();
    assert_eq!(min, &Value::MinKey);
    assert_eq!(max, &Value::MaxKey);
    assert_ne!(min, max);
    for other in ["null", "empty", "zero"] {
        let value = doc.get(other).unwrap();
        assert_ne!(min, value);
        assert_ne!(max, value);
    }
}

// ── Malformed input ───────────────────────────────────────────────────────────

#[test]
fn dropping_a_byte_at_any_container_boundary_is_malformed_length() {
    let bytes = sample();
    let all = events(&bytes);

    // starts and terminators of every non-root container, plus the root's
    let mut boundaries = vec![0, bytes.len() - 1];
    for e in &all {
        if matches!(e.element_type, ElementType::Document | ElementType::Array) {
            boundaries.push(e.value_offset);
            boundaries.push(e.value_offset + e.value_length - 1);
        }
    }

    for at in boundaries {
        let mut cut = bytes.clone();
        cut.remove(at);
        let err = IterDecoder::decode(&cut).unwrap_err();
        assert!(
            matches!(err, DecodeError::MalformedLength { .. }),
            "removing byte {at}: {err:?}"
        );
    }
}

#[test]
fn truncation_anywhere_fails() {
    let bytes = sample();
    for len in 0..bytes.len() {
        assert!(IterDecoder::decode(&bytes[..len]).is_err(), "prefix of {len} bytes decoded");
    }
}

#[test]
fn trailing_bytes_follow_configuration() {
    let mut bytes = sample();
    bytes.extend_from_slice(&[1, 2, 3]);
    assert!(matches!(
        IterDecoder::decode(&bytes),
        Err(DecodeError::TrailingData { extra_bytes: 3 })
    ));
    let lenient = IterDecoder::new(DecoderConfig::default().with_trailing_bytes(true));
    assert!(lenient.decode_with(&bytes).is_ok());
}

// ── Depth ─────────────────────────────────────────────────────────────────────

#[test]
fn deep_documents_decode_without_recursion() {
    let depth = 20_000;
    let doc = IterDecoder::decode(&nested(depth, 0x03)).unwrap();
    assert_eq!(nested_depth(&doc), depth);
}

#[test]
fn deep_arrays_decode_without_recursion() {
    let depth = 20_000;
    let doc = IterDecoder::decode(&nested(depth, 0x04)).unwrap();
    assert_eq!(nested_depth(&doc), depth);
}

#[test]
fn deep_traversal_in_both_orders() {
    let bytes = nested(20_000, 0x03);
    for order in [TraversalOrder::Fifo, TraversalOrder::Lifo] {
        let stats = traverse(&bytes, order, &mut ibson_decoder::NoopObserver).unwrap();
        assert_eq!(stats.max_depth, 20_000);
        assert_eq!(stats.containers, 20_001);
    }
}

#[test]
fn depth_limit_rejects_deeper_input() {
    let config = DecoderConfig::default().with_max_depth(64);
    let decoder = IterDecoder::new(config);
    assert!(decoder.decode_with(&nested(64, 0x03)).is_ok());
    assert!(matches!(
        decoder.decode_with(&nested(65, 0x03)),
        Err(DecodeError::DepthLimitExceeded { limit: 64, .. })
    ));
}

#[test]
fn deep_decoded_tree_clones_and_compares_on_a_small_stack() {
    let bytes = nested(100_000, 0x04);
    std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || {
            let doc = IterDecoder::decode(&bytes).unwrap();
            let copy = doc.clone();
            assert!(copy == doc);
            assert_eq!(nested_depth(&copy), 100_000);
        })
        .unwrap()
        .join()
        .unwrap();
}

// ── Error messages ────────────────────────────────────────────────────────────

#[test]
fn error_messages() {
    let mut trailing = sample();
    trailing.extend_from_slice(&[1, 2, 3]);
    insta::assert_snapshot!(
        IterDecoder::decode(&trailing).unwrap_err().to_string(),
        @"unexpected data after root document (3 bytes)"
    );

    let limited = IterDecoder::new(DecoderConfig::default().with_max_depth(64));
    insta::assert_snapshot!(
        limited.decode_with(&nested(65, 0x03)).unwrap_err().to_string(),
        @"nesting depth exceeds limit of 64 at offset 455"
    );

    let unknown = ibson_tests::doc(&elem(0x42, "a", &[]));
    insta::assert_snapshot!(
        IterDecoder::decode(&unknown).unwrap_err().to_string(),
        @"unknown element type 0x42 at offset 4"
    );
}

#[test]
fn container_kinds_reported() {
    let kinds: Vec<_> = events(&encode(&doc! { "a": [{ "b": 1 }] }))
        .iter()
        .map(|e| e.container_kind)
        .collect();
    assert_eq!(kinds, [ContainerKind::Map, ContainerKind::Sequence, ContainerKind::Map]);
}
