//! Random-input fuzzer for frame decoding.
//!
//! Arbitrary bytes must decode to a frame or fail with an error, never panic.
//! Whatever decodes must re-encode to bytes that decode to the same frame, and
//! the unwrap utility must agree with the full decoder on routing frames.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use netifi_proto::{Frame, unwrap_metadata};

fuzz_target!(|data: &[u8]| {
    let input = Bytes::copy_from_slice(data);

    let Ok(frame) = Frame::decode(&input) else {
        return;
    };

    // INVARIANT 1: unwrap agrees with the full decoder
    match (frame.metadata(), unwrap_metadata(&input)) {
        (Some(expected), Ok(unwrapped)) => assert_eq!(expected, &unwrapped),
        (None, Err(_)) => {},
        (expected, unwrapped) => {
            panic!("unwrap disagrees with decode: {expected:?} vs {unwrapped:?}")
        },
    }

    // INVARIANT 2: decode(encode(frame)) == frame
    let encoded = frame.to_bytes().expect("decoded frame fits the metadata limit");
    assert_eq!(encoded.len(), frame.encoded_len());

    let decoded = Frame::decode(&encoded).expect("re-encoded frame must decode");
    assert_eq!(decoded, frame);
});
