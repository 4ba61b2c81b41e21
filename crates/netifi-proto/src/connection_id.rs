//! Connection identifier wire encoding.
//!
//! Connection ids are 128-bit UUIDs written as 16 raw bytes in network order:
//! the `time_low`, `time_mid` and `time_hi_and_version` groups Big Endian,
//! the clock sequence and node bytes as-is. This matches a JVM peer writing
//! the most and least significant halves as two Big Endian `i64`s.
//!
//! GUID-style APIs hand out the same value in mixed-endian order (first three
//! groups Little Endian). [`swap_byte_order`] converts between the two layouts
//! and is its own inverse.

use uuid::Uuid;

/// Encoded size of a connection id
pub const SIZE: usize = 16;

/// Swap the first three groups between mixed-endian and network order.
///
/// Reverses bytes `0..4`, `4..6` and `6..8`; bytes `8..16` are untouched.
pub fn swap_byte_order(bytes: &mut [u8; SIZE]) {
    bytes[0..4].reverse();
    bytes[4..6].reverse();
    bytes[6..8].reverse();
}

/// Encode a connection id for the wire.
#[must_use]
pub fn to_wire(id: &Uuid) -> [u8; SIZE] {
    let mut bytes = id.to_bytes_le();
    swap_byte_order(&mut bytes);
    bytes
}

/// Decode a connection id read from the wire.
#[must_use]
pub fn from_wire(mut bytes: [u8; SIZE]) -> Uuid {
    swap_byte_order(&mut bytes);
    Uuid::from_bytes_le(bytes)
}
