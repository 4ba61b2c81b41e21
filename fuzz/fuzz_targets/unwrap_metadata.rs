//! Structured fuzzer for the wrap/unwrap pair.
//!
//! The input picks a routing frame kind and is split into group, metadata and
//! shard key. Unwrapping the encoded frame must return the metadata exactly.

#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use netifi_proto::{Broadcast, FrameBody, Group, Shard, Tags, unwrap_metadata};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let kind = data[0] % 3;
    let group_len = usize::from(data[1]).min(data.len() - 3);
    let key_len = usize::from(data[2]).min(data.len() - 3 - group_len);

    let rest = &data[3..];
    let group = String::from_utf8_lossy(&rest[..group_len]).into_owned();
    let shard_key = Bytes::copy_from_slice(&rest[group_len..group_len + key_len]);
    let metadata = Bytes::copy_from_slice(&rest[group_len + key_len..]);

    let tags: Tags = [("com.netifi.destination", "fuzz")].into_iter().collect();
    let wrapped = match kind {
        0 => Group::new(group, metadata.clone(), tags).to_bytes(),
        1 => Broadcast::new(group, metadata.clone(), tags).to_bytes(),
        _ => Shard::new(group, metadata.clone(), shard_key, tags).to_bytes(),
    }
    .expect("fuzz input is far below the metadata limit");

    // INVARIANT: unwrap(wrap(m)) == m
    let unwrapped = unwrap_metadata(&wrapped).expect("wrapped metadata must unwrap");
    assert_eq!(unwrapped, metadata);

    // Raw input is also fair game for unwrap and must never panic
    let _ = unwrap_metadata(&Bytes::copy_from_slice(data));
});
