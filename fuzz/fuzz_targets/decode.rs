#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: IterDecoder::decode on arbitrary bytes.
//
// Catches bugs in:
// - Length prefixes pointing outside the buffer
// - Code-with-scope length arithmetic
// - Unterminated names and strings
// - Queue/arena bookkeeping on partial failure
fuzz_target!(|data: &[u8]| {
    let _ = ibson_decoder::IterDecoder::decode(data);
});
