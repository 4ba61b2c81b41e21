//! Client setup frame sent as the transport handshake metadata.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{BufMut, Bytes};
use uuid::Uuid;

use super::FrameBody;
use crate::{
    FrameType, Tags,
    codec::{Reader, prefixed_len, put_prefixed, put_str},
    connection_id,
    errors::{ProtocolError, Result},
    tags::decode_tags,
};

/// Identifies a client connecting to a broker.
///
/// The client layer adds the reserved
/// [`DESTINATION_TAG`](crate::DESTINATION_TAG) before sending; this type
/// carries whatever tags it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSetup {
    /// Address the client advertises, if any
    pub ip_address: Option<IpAddr>,
    /// Group the client joins
    pub group: String,
    /// Access key id
    pub access_key: i64,
    /// Opaque access token, never interpreted here
    pub access_token: Bytes,
    /// Unique id of this connection
    pub connection_id: Uuid,
    /// Feature flags, passed through untouched
    pub additional_flags: i16,
    /// Client tags, sorted by key when built locally
    pub tags: Tags,
}

impl DestinationSetup {
    fn address_len(&self) -> usize {
        match self.ip_address {
            None => 0,
            Some(IpAddr::V4(_)) => 4,
            Some(IpAddr::V6(_)) => 16,
        }
    }
}

impl FrameBody for DestinationSetup {
    const FRAME_TYPE: FrameType = FrameType::DestinationSetup;

    fn body_len(&self) -> usize {
        prefixed_len(self.address_len())
            + prefixed_len(self.group.len())
            + size_of::<i64>()
            + prefixed_len(self.access_token.len())
            + connection_id::SIZE
            + size_of::<i16>()
            + self.tags.encoded_len()
    }

    fn write_body(&self, dst: &mut impl BufMut) {
        match self.ip_address {
            None => dst.put_i32(0),
            Some(IpAddr::V4(addr)) => put_prefixed(dst, &addr.octets()),
            Some(IpAddr::V6(addr)) => put_prefixed(dst, &addr.octets()),
        }
        put_str(dst, &self.group);
        dst.put_i64(self.access_key);
        put_prefixed(dst, &self.access_token);
        dst.put_slice(&connection_id::to_wire(&self.connection_id));
        dst.put_i16(self.additional_flags);
        self.tags.encode(dst);
    }

    fn read_body(src: &mut Reader<'_>) -> Result<Self> {
        let ip_address = read_address(src)?;
        let group = src.read_string("group")?;
        let access_key = src.read_i64("access_key")?;
        let access_token = src.read_prefixed("access_token")?;
        let connection_id = connection_id::from_wire(src.read_array("connection_id")?);
        let additional_flags = src.read_i16("additional_flags")?;
        let end = src.end();
        let tags = decode_tags(src, end)?;

        Ok(Self {
            ip_address,
            group,
            access_key,
            access_token,
            connection_id,
            additional_flags,
            tags,
        })
    }
}

fn read_address(src: &mut Reader<'_>) -> Result<Option<IpAddr>> {
    let len = src.read_len("ip_address")?;
    match len {
        0 => Ok(None),
        4 => Ok(Some(IpAddr::V4(Ipv4Addr::from(src.read_array::<4>("ip_address")?)))),
        16 => Ok(Some(IpAddr::V6(Ipv6Addr::from(src.read_array::<16>("ip_address")?)))),
        other => Err(ProtocolError::InvalidAddressLength(other)),
    }
}
