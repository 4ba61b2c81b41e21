//! Strip a routing frame back off call metadata.
//!
//! The inverse of wrapping: for any routing frame built around metadata `m`,
//! [`unwrap_metadata`] of its encoding returns exactly `m`.

use bytes::Bytes;

use crate::{
    FrameType,
    codec::Reader,
    errors::{ProtocolError, Result},
    frames::{Broadcast, FrameBody, Group, Shard},
};

/// Return the application metadata embedded in a routing frame.
///
/// The returned [`Bytes`] is a slice of `metadata`; nothing is copied.
///
/// # Errors
///
/// - [`ProtocolError::MalformedFrame`] if the header or a field is cut short
/// - [`ProtocolError::UnknownFrameType`] for a type outside the known set
/// - [`ProtocolError::UnsupportedFrameType`] for setup or undefined frames
pub fn unwrap_metadata(metadata: &Bytes) -> Result<Bytes> {
    let mut src = Reader::new(metadata);
    let header = src.read_header()?;

    match header.known_frame_type()? {
        FrameType::Group => Group::decode(&header, &mut src).map(|frame| frame.metadata),
        FrameType::Broadcast => Broadcast::decode(&header, &mut src).map(|frame| frame.metadata),
        FrameType::Shard => Shard::decode(&header, &mut src).map(|frame| frame.metadata),
        other @ (FrameType::Undefined | FrameType::BrokerSetup | FrameType::DestinationSetup) => {
            Err(ProtocolError::UnsupportedFrameType(other))
        },
    }
}
