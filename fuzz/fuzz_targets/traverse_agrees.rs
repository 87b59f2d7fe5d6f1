#![no_main]

use ibson_decoder::{ElementEvent, IterDecoder, TraversalOrder, Utf8Mode};
use libfuzzer_sys::fuzz_target;

// Fuzz target: traverse (FIFO) and the tree builder must see the same
// elements whenever the tree builder succeeds.
//
// Lossy UTF-8 keeps the decoder from rejecting input the traversal, which
// never validates strings, would accept.
fuzz_target!(|data: &[u8]| {
    let decoder = IterDecoder::new(
        ibson_decoder::DecoderConfig::default()
            .with_utf8(Utf8Mode::Lossy)
            .with_trailing_bytes(true),
    );
    let mut built = Vec::new();
    let mut on_build = |e: &ElementEvent| built.push(*e);
    if decoder.decode_observed(data, &mut on_build).is_err() {
        return;
    }

    let mut walked = Vec::new();
    let mut on_walk = |e: &ElementEvent| walked.push(*e);
    ibson_decoder::traverse(data, TraversalOrder::Fifo, &mut on_walk)
        .expect("traversal accepts whatever the decoder accepts");
    assert_eq!(built, walked);
});
