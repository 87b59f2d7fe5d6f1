#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: splitting concatenated documents, then decoding each.
fuzz_target!(|data: &[u8]| {
    let mut covered = 0;
    for part in ibson_wire::split_documents(data) {
        let Ok((offset, bytes)) = part else {
            break;
        };
        assert_eq!(offset, covered);
        covered += bytes.len();
        let _ = ibson_decoder::IterDecoder::decode(bytes);
    }
    assert!(covered <= data.len());
});
