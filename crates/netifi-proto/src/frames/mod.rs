//! Frame variants.
//!
//! Each variant is a short-lived value: built right before one encode, or
//! produced by one decode. Opaque fields (`access_token`, `metadata`,
//! `shard_key`) are [`Bytes`] slices of the decoded buffer, so decoding does
//! not copy them.
//!
//! # Layouts (after the 6-byte header, all integers Big Endian)
//!
//! | Frame | Fields |
//! |---|---|
//! | [`BrokerSetup`] | broker id, cluster id, `i64` access key, access token |
//! | [`DestinationSetup`] | address (0/4/16), group, `i64` access key, access token, 16-byte connection id, `i16` flags, tags |
//! | [`Group`] | group, metadata, tags |
//! | [`Broadcast`] | group, metadata, tags |
//! | [`Shard`] | group, metadata, shard key, tags |
//!
//! Strings and opaque fields carry an `i32` length prefix. Tags run to the end
//! of the frame.

mod broker_setup;
mod destination_setup;
mod routing;

use bytes::{BufMut, Bytes, BytesMut};

pub use broker_setup::BrokerSetup;
pub use destination_setup::DestinationSetup;
pub use routing::{Broadcast, Group, Shard, wrap_broadcast, wrap_group, wrap_shard};

use crate::{
    FrameHeader, FrameType,
    codec::Reader,
    errors::{ProtocolError, Result},
};

/// Largest encoded frame the transport can carry as metadata (24-bit length).
pub const MAX_METADATA_LENGTH: usize = 0x00FF_FFFF;

/// Header-prefixed frame body.
///
/// Implementors describe their fields; the provided methods add the header,
/// the size limit and buffer management.
pub trait FrameBody: Sized {
    /// Type tag written in the header
    const FRAME_TYPE: FrameType;

    /// Encoded size of the fields after the header
    fn body_len(&self) -> usize;

    /// Write the fields after the header
    fn write_body(&self, dst: &mut impl BufMut);

    /// Read the fields after the header, up to the end of `src`
    fn read_body(src: &mut Reader<'_>) -> Result<Self>;

    /// Exact encoded size, header included
    fn encoded_len(&self) -> usize {
        FrameHeader::SIZE + self.body_len()
    }

    /// Write header and fields, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::FrameTooLarge`] if the frame exceeds
    /// [`MAX_METADATA_LENGTH`]. Nothing is written in that case.
    fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        let len = checked_len(self.body_len())?;
        dst.put_slice(&FrameHeader::new(Self::FRAME_TYPE).to_bytes());
        self.write_body(dst);
        Ok(len)
    }

    /// Encode into a freshly allocated buffer sized to fit.
    fn to_bytes(&self) -> Result<Bytes> {
        encode_to_bytes(Self::FRAME_TYPE, self.body_len(), |dst| self.write_body(dst))
    }

    /// Decode the fields that follow an already-read header.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnexpectedFrameType`] if `header` names a
    /// different variant, or any field error from the body.
    fn decode(header: &FrameHeader, src: &mut Reader<'_>) -> Result<Self> {
        if header.frame_type() != Self::FRAME_TYPE.to_u16() {
            return Err(ProtocolError::UnexpectedFrameType {
                expected: Self::FRAME_TYPE,
                actual: header.frame_type(),
            });
        }
        Self::read_body(src)
    }

    /// Decode a complete frame from `bytes`, header included.
    fn from_bytes(bytes: &Bytes) -> Result<Self> {
        let mut src = Reader::new(bytes);
        let header = src.read_header()?;
        Self::decode(&header, &mut src)
    }
}

/// Full frame length for a body of `body_len`, or [`ProtocolError::FrameTooLarge`].
fn checked_len(body_len: usize) -> Result<usize> {
    let len = FrameHeader::SIZE + body_len;
    if len > MAX_METADATA_LENGTH {
        return Err(ProtocolError::FrameTooLarge { size: len, max: MAX_METADATA_LENGTH });
    }
    Ok(len)
}

/// Encode a header and a body written by `write_body` into a new buffer.
///
/// `body_len` must be the exact number of bytes `write_body` produces.
fn encode_to_bytes(
    frame_type: FrameType,
    body_len: usize,
    write_body: impl FnOnce(&mut BytesMut),
) -> Result<Bytes> {
    let len = checked_len(body_len)?;
    let mut buf = BytesMut::with_capacity(len);
    buf.put_slice(&FrameHeader::new(frame_type).to_bytes());
    write_body(&mut buf);
    Ok(buf.freeze())
}
