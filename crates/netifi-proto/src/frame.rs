//! Any frame, dispatched on the header type.

use bytes::{BufMut, Bytes};

use crate::{
    FrameHeader, FrameType,
    codec::Reader,
    errors::{ProtocolError, Result},
    frames::{Broadcast, BrokerSetup, DestinationSetup, FrameBody, Group, Shard},
};

/// One decoded frame of any kind.
///
/// Decoding reads the header once and matches on its type; adding a variant
/// breaks every exhaustive `match` here until it is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Broker-to-broker setup
    BrokerSetup(BrokerSetup),
    /// Client setup
    DestinationSetup(DestinationSetup),
    /// Route to one group member
    Group(Group),
    /// Route to all group members
    Broadcast(Broadcast),
    /// Route by shard key
    Shard(Shard),
}

impl Frame {
    /// Type tag written for this frame
    #[must_use]
    pub const fn frame_type(&self) -> FrameType {
        match self {
            Self::BrokerSetup(_) => FrameType::BrokerSetup,
            Self::DestinationSetup(_) => FrameType::DestinationSetup,
            Self::Group(_) => FrameType::Group,
            Self::Broadcast(_) => FrameType::Broadcast,
            Self::Shard(_) => FrameType::Shard,
        }
    }

    /// Exact encoded size, header included
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::BrokerSetup(frame) => frame.encoded_len(),
            Self::DestinationSetup(frame) => frame.encoded_len(),
            Self::Group(frame) => frame.encoded_len(),
            Self::Broadcast(frame) => frame.encoded_len(),
            Self::Shard(frame) => frame.encoded_len(),
        }
    }

    /// Write the frame, returning the number of bytes written.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        match self {
            Self::BrokerSetup(frame) => frame.encode(dst),
            Self::DestinationSetup(frame) => frame.encode(dst),
            Self::Group(frame) => frame.encode(dst),
            Self::Broadcast(frame) => frame.encode(dst),
            Self::Shard(frame) => frame.encode(dst),
        }
    }

    /// Encode into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Self::BrokerSetup(frame) => frame.to_bytes(),
            Self::DestinationSetup(frame) => frame.to_bytes(),
            Self::Group(frame) => frame.to_bytes(),
            Self::Broadcast(frame) => frame.to_bytes(),
            Self::Shard(frame) => frame.to_bytes(),
        }
    }

    /// Decode a complete frame. The buffer length is the frame length.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::UnknownFrameType`] for a type outside the known set
    /// - [`ProtocolError::UnsupportedFrameType`] for `Undefined`
    /// - any field error from the variant decoder
    pub fn decode(bytes: &Bytes) -> Result<Self> {
        let mut src = Reader::new(bytes);
        let header = src.read_header()?;
        Self::decode_body(&header, &mut src)
    }

    /// Decode the variant named by an already-read header.
    pub fn decode_body(header: &FrameHeader, src: &mut Reader<'_>) -> Result<Self> {
        match header.known_frame_type()? {
            FrameType::Undefined => Err(ProtocolError::UnsupportedFrameType(FrameType::Undefined)),
            FrameType::BrokerSetup => BrokerSetup::decode(header, src).map(Self::BrokerSetup),
            FrameType::DestinationSetup => {
                DestinationSetup::decode(header, src).map(Self::DestinationSetup)
            },
            FrameType::Group => Group::decode(header, src).map(Self::Group),
            FrameType::Broadcast => Broadcast::decode(header, src).map(Self::Broadcast),
            FrameType::Shard => Shard::decode(header, src).map(Self::Shard),
        }
    }

    /// Application metadata carried by a routing frame
    #[must_use]
    pub fn metadata(&self) -> Option<&Bytes> {
        match self {
            Self::Group(frame) => Some(&frame.metadata),
            Self::Broadcast(frame) => Some(&frame.metadata),
            Self::Shard(frame) => Some(&frame.metadata),
            Self::BrokerSetup(_) | Self::DestinationSetup(_) => None,
        }
    }

    /// Target group of a routing or destination setup frame
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::DestinationSetup(frame) => Some(&frame.group),
            Self::Group(frame) => Some(&frame.group),
            Self::Broadcast(frame) => Some(&frame.group),
            Self::Shard(frame) => Some(&frame.group),
            Self::BrokerSetup(_) => None,
        }
    }
}

impl From<BrokerSetup> for Frame {
    fn from(frame: BrokerSetup) -> Self {
        Self::BrokerSetup(frame)
    }
}

impl From<DestinationSetup> for Frame {
    fn from(frame: DestinationSetup) -> Self {
        Self::DestinationSetup(frame)
    }
}

impl From<Group> for Frame {
    fn from(frame: Group) -> Self {
        Self::Group(frame)
    }
}

impl From<Broadcast> for Frame {
    fn from(frame: Broadcast) -> Self {
        Self::Broadcast(frame)
    }
}

impl From<Shard> for Frame {
    fn from(frame: Shard) -> Self {
        Self::Shard(frame)
    }
}
