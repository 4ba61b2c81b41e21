//! Frame type tags.
//!
//! The type tag is the third `u16` of every header. The set is closed: an
//! unrecognised value is a decode error at the dispatcher, never skipped.
//!
//! | Value | Frame |
//! |---|---|
//! | `0x00` | Undefined |
//! | `0x01` | Broker setup |
//! | `0x02` | Destination setup |
//! | `0x03` | Group route |
//! | `0x04` | Broadcast route |
//! | `0x05` | Shard route |

/// Frame type carried in the header.
///
/// `#[repr(u16)]` pins the numeric values for wire compatibility with other
/// broker clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FrameType {
    /// Reserved zero value, never sent
    Undefined = 0x00,
    /// Broker-to-broker identification
    BrokerSetup = 0x01,
    /// Client identification on connect
    DestinationSetup = 0x02,
    /// Route to one member of a group
    Group = 0x03,
    /// Route to every member of a group
    Broadcast = 0x04,
    /// Route to the member owning a shard key
    Shard = 0x05,
}

impl FrameType {
    /// Convert to raw u16 value
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self as u16
    }

    /// Convert from raw u16 value
    ///
    /// Returns `None` for values outside the known set. Callers surface that
    /// as [`ProtocolError::UnknownFrameType`](crate::ProtocolError::UnknownFrameType).
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x00 => Some(Self::Undefined),
            0x01 => Some(Self::BrokerSetup),
            0x02 => Some(Self::DestinationSetup),
            0x03 => Some(Self::Group),
            0x04 => Some(Self::Broadcast),
            0x05 => Some(Self::Shard),
            _ => None,
        }
    }

    /// True for the three frames injected in front of call metadata
    #[must_use]
    pub const fn is_routing(self) -> bool {
        matches!(self, Self::Group | Self::Broadcast | Self::Shard)
    }
}
