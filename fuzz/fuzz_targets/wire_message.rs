#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{decode_message, encode_message, peek_kind, Limits};

fuzz_target!(|data: &[u8]| {
    let limits = Limits::for_testing();
    let Ok(message) = decode_message(data, &limits) else {
        return;
    };
    assert_eq!(peek_kind(data), Ok(message.kind()));

    // Anything that decodes re-encodes to the same bytes.
    let encoded = encode_message(&message, &limits).expect("decoded message re-encodes");
    assert_eq!(encoded, data);
});
