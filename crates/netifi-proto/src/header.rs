//! Frame header with zero-copy parsing.
//!
//! Every frame starts with the same 6-byte preamble: major version, minor
//! version and frame type, each a Big Endian `u16`.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    FrameType,
    errors::{ProtocolError, Result},
};

/// Fixed 6-byte frame header (Big Endian network byte order)
///
/// Fields are stored as raw byte arrays so the layout has no padding and every
/// 6-byte pattern is a valid header.
///
/// # Compatibility
///
/// Encoders always write [`FrameHeader::MAJOR_VERSION`] and
/// [`FrameHeader::MINOR_VERSION`]. Decoders accept any version pair, and keep
/// the frame type as a raw `u16` until a dispatcher interprets it, so newer
/// peers are not rejected at the header.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    major_version: [u8; 2],
    minor_version: [u8; 2],
    frame_type: [u8; 2],
}

impl FrameHeader {
    /// Size of the serialized header (6 bytes)
    pub const SIZE: usize = 6;

    /// Major version written by this implementation
    pub const MAJOR_VERSION: u16 = 1;

    /// Minor version written by this implementation
    pub const MINOR_VERSION: u16 = 0;

    /// Create a header for the given frame type at the current version.
    #[must_use]
    pub const fn new(frame_type: FrameType) -> Self {
        Self::with_versions(Self::MAJOR_VERSION, Self::MINOR_VERSION, frame_type.to_u16())
    }

    /// Create a header from raw field values.
    ///
    /// Used to build headers from other protocol revisions, and by tests that
    /// need unknown frame types on the wire.
    #[must_use]
    pub const fn with_versions(major_version: u16, minor_version: u16, frame_type: u16) -> Self {
        Self {
            major_version: major_version.to_be_bytes(),
            minor_version: minor_version.to_be_bytes(),
            frame_type: frame_type.to_be_bytes(),
        }
    }

    /// Parse header from network bytes (zero-copy, safe)
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedFrame`] if fewer than 6 bytes are
    /// available. No other validation happens here.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _)| header)
            .map_err(|_| ProtocolError::MalformedFrame {
                field: "header",
                needed: Self::SIZE,
                remaining: bytes.len(),
            })
    }

    /// Serialize header to bytes
    #[must_use]
    #[allow(clippy::wrong_self_convention)]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Get the major version
    #[must_use]
    pub fn major_version(&self) -> u16 {
        u16::from_be_bytes(self.major_version)
    }

    /// Get the minor version
    #[must_use]
    pub fn minor_version(&self) -> u16 {
        u16::from_be_bytes(self.minor_version)
    }

    /// Get the raw frame type
    #[must_use]
    pub fn frame_type(&self) -> u16 {
        u16::from_be_bytes(self.frame_type)
    }

    /// Get the frame type as an enum (if known)
    #[must_use]
    pub fn frame_type_enum(&self) -> Option<FrameType> {
        FrameType::from_u16(self.frame_type())
    }

    /// Interpret the frame type, failing on values outside the known set.
    pub fn known_frame_type(&self) -> Result<FrameType> {
        self.frame_type_enum().ok_or(ProtocolError::UnknownFrameType(self.frame_type()))
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("major_version", &self.major_version())
            .field("minor_version", &self.minor_version())
            .field("frame_type", &format!("{:#06x}", self.frame_type()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn header_size() {
        assert_eq!(std::mem::size_of::<FrameHeader>(), FrameHeader::SIZE);
    }

    #[test]
    fn new_header_layout() {
        let header = FrameHeader::new(FrameType::Shard);
        assert_eq!(header.to_bytes(), [0x00, 0x01, 0x00, 0x00, 0x00, 0x05]);
        assert_eq!(header.frame_type_enum(), Some(FrameType::Shard));
    }

    proptest! {
        #[test]
        fn header_round_trip(major in any::<u16>(), minor in any::<u16>(), frame_type in any::<u16>()) {
            let header = FrameHeader::with_versions(major, minor, frame_type);
            let bytes = header.to_bytes();
            let parsed = FrameHeader::from_bytes(&bytes).expect("should parse");
            prop_assert_eq!(parsed.major_version(), major);
            prop_assert_eq!(parsed.minor_version(), minor);
            prop_assert_eq!(parsed.frame_type(), frame_type);
        }
    }

    #[test]
    fn accepts_unknown_minor_version() {
        let bytes = [0x00, 0x01, 0x00, 0x07, 0x00, 0x03];
        let header = FrameHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.minor_version(), 7);
        assert_eq!(header.frame_type_enum(), Some(FrameType::Group));
    }

    #[test]
    fn keeps_unknown_frame_type_raw() {
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x12, 0x34];
        let header = FrameHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.frame_type(), 0x1234);
        assert_eq!(header.known_frame_type(), Err(ProtocolError::UnknownFrameType(0x1234)));
    }

    #[test]
    fn reject_short_buffer() {
        let result = FrameHeader::from_bytes(&[0x00, 0x01, 0x00]);
        assert_eq!(
            result,
            Err(ProtocolError::MalformedFrame { field: "header", needed: 6, remaining: 3 })
        );
    }
}
