#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: the element framer in ibson-wire.
//
// Every yielded element must lie inside the container, after the previous
// one.
fuzz_target!(|data: &[u8]| {
    let Ok(elements) = ibson_wire::Elements::new(data) else {
        return;
    };
    let mut previous_end = 4;
    for element in elements {
        let Ok(element) = element else {
            break;
        };
        assert!(element.start() >= previous_end);
        assert!(element.end() < data.len());
        previous_end = element.end();
    }
});
