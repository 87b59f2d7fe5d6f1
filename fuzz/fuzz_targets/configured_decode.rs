#![no_main]

use arbitrary::Arbitrary;
use ibson_decoder::{DecoderConfig, IterDecoder, Utf8Mode};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    lossy: bool,
    trailing: bool,
    max_depth: Option<u8>,
    bytes: Vec<u8>,
}

// Fuzz target: decoding under every configuration combination.
//
// A depth limit may only turn success into DepthLimitExceeded, never
// into a different outcome.
fuzz_target!(|input: Input| {
    let utf8 = if input.lossy { Utf8Mode::Lossy } else { Utf8Mode::Strict };
    let base = DecoderConfig::default()
        .with_utf8(utf8)
        .with_trailing_bytes(input.trailing);

    let unlimited = IterDecoder::new(base.clone()).decode_with(&input.bytes);
    let Some(limit) = input.max_depth else {
        return;
    };
    let limited = IterDecoder::new(base.with_max_depth(usize::from(limit))).decode_with(&input.bytes);

    match (&unlimited, &limited) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Ok(_), Err(ibson_decoder::DecodeError::DepthLimitExceeded { .. })) | (Err(_), Err(_)) => {}
        (Err(e), Ok(_)) => panic!("depth limit turned {e:?} into success"),
        (Ok(_), Err(e)) => panic!("depth limit produced {e:?}"),
    }
});
