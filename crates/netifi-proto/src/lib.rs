//! Routing metadata wire format for the Netifi broker.
//!
//! A client attaches one of these frames as the metadata of every request.
//! The broker reads the frame to pick a destination; the receiving side
//! strips it again with [`unwrap_metadata`] so the application only sees its
//! own metadata.
//!
//! Every frame starts with a 6-byte [`FrameHeader`] (major version, minor
//! version, frame type; each a Big Endian `u16`). The body layout depends on
//! the type. A frame has no overall length field: the enclosing metadata
//! buffer delimits it, and the trailing tag map runs to the end of that
//! buffer.
//!
//! Decoding never copies opaque fields. `metadata`, `shard_key` and
//! `access_token` come back as [`bytes::Bytes`] slices of the input.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod connection_id;
pub mod errors;
pub mod frame;
pub mod frame_type;
pub mod frames;
pub mod header;
pub mod tags;
pub mod unwrap;

pub use codec::Reader;
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use frame_type::FrameType;
pub use frames::{
    Broadcast, BrokerSetup, DestinationSetup, FrameBody, Group, MAX_METADATA_LENGTH, Shard,
    wrap_broadcast, wrap_group, wrap_shard,
};
pub use header::FrameHeader;
pub use tags::{DESTINATION_TAG, Tags, decode_tags, encode_tags};
pub use unwrap::unwrap_metadata;
