//! Routing frames injected in front of call metadata.
//!
//! All three carry the target group, the caller's application metadata and
//! tags. [`Shard`] adds the shard key between metadata and tags. [`Group`] and
//! [`Broadcast`] share a layout and differ only in the header type.

use bytes::{BufMut, Bytes};

use super::{FrameBody, encode_to_bytes};
use crate::{
    FrameType, Tags,
    codec::{Reader, prefixed_len, put_prefixed, put_str},
    errors::Result,
    tags::decode_tags,
};

/// Route a call to one member of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Target group
    pub group: String,
    /// Application metadata, delivered unchanged after unwrapping
    pub metadata: Bytes,
    /// Tags narrowing the candidate members
    pub tags: Tags,
}

/// Route a call to every member of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Target group
    pub group: String,
    /// Application metadata, delivered unchanged after unwrapping
    pub metadata: Bytes,
    /// Tags narrowing the candidate members
    pub tags: Tags,
}

/// Route a call to the group member owning a shard key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    /// Target group
    pub group: String,
    /// Application metadata, delivered unchanged after unwrapping
    pub metadata: Bytes,
    /// Opaque key the broker hashes to pick a member
    pub shard_key: Bytes,
    /// Tags narrowing the candidate members
    pub tags: Tags,
}

impl Group {
    /// Create a group routing frame
    pub fn new(group: impl Into<String>, metadata: impl Into<Bytes>, tags: Tags) -> Self {
        Self { group: group.into(), metadata: metadata.into(), tags }
    }
}

impl Broadcast {
    /// Create a broadcast routing frame
    pub fn new(group: impl Into<String>, metadata: impl Into<Bytes>, tags: Tags) -> Self {
        Self { group: group.into(), metadata: metadata.into(), tags }
    }
}

impl Shard {
    /// Create a shard routing frame
    pub fn new(
        group: impl Into<String>,
        metadata: impl Into<Bytes>,
        shard_key: impl Into<Bytes>,
        tags: Tags,
    ) -> Self {
        Self { group: group.into(), metadata: metadata.into(), shard_key: shard_key.into(), tags }
    }
}

fn group_body_len(group: &str, metadata: &[u8], tags: &Tags) -> usize {
    prefixed_len(group.len()) + prefixed_len(metadata.len()) + tags.encoded_len()
}

fn write_group_body(dst: &mut impl BufMut, group: &str, metadata: &[u8], tags: &Tags) {
    put_str(dst, group);
    put_prefixed(dst, metadata);
    tags.encode(dst);
}

fn shard_body_len(group: &str, metadata: &[u8], shard_key: &[u8], tags: &Tags) -> usize {
    prefixed_len(group.len())
        + prefixed_len(metadata.len())
        + prefixed_len(shard_key.len())
        + tags.encoded_len()
}

fn write_shard_body(
    dst: &mut impl BufMut,
    group: &str,
    metadata: &[u8],
    shard_key: &[u8],
    tags: &Tags,
) {
    put_str(dst, group);
    put_prefixed(dst, metadata);
    put_prefixed(dst, shard_key);
    tags.encode(dst);
}

/// Encode a [`Group`] frame around `metadata` from borrowed fields.
///
/// Produces the same bytes as [`Group::to_bytes`] without building a frame.
pub fn wrap_group(group: &str, metadata: &[u8], tags: &Tags) -> Result<Bytes> {
    encode_to_bytes(FrameType::Group, group_body_len(group, metadata, tags), |dst| {
        write_group_body(dst, group, metadata, tags);
    })
}

/// Encode a [`Broadcast`] frame around `metadata` from borrowed fields.
pub fn wrap_broadcast(group: &str, metadata: &[u8], tags: &Tags) -> Result<Bytes> {
    encode_to_bytes(FrameType::Broadcast, group_body_len(group, metadata, tags), |dst| {
        write_group_body(dst, group, metadata, tags);
    })
}

/// Encode a [`Shard`] frame around `metadata` from borrowed fields.
pub fn wrap_shard(group: &str, metadata: &[u8], shard_key: &[u8], tags: &Tags) -> Result<Bytes> {
    let body_len = shard_body_len(group, metadata, shard_key, tags);
    encode_to_bytes(FrameType::Shard, body_len, |dst| {
        write_shard_body(dst, group, metadata, shard_key, tags);
    })
}

fn read_group_body(src: &mut Reader<'_>) -> Result<(String, Bytes, Tags)> {
    let group = src.read_string("group")?;
    let metadata = src.read_prefixed("metadata")?;
    let end = src.end();
    let tags = decode_tags(src, end)?;
    Ok((group, metadata, tags))
}

impl FrameBody for Group {
    const FRAME_TYPE: FrameType = FrameType::Group;

    fn body_len(&self) -> usize {
        group_body_len(&self.group, &self.metadata, &self.tags)
    }

    fn write_body(&self, dst: &mut impl BufMut) {
        write_group_body(dst, &self.group, &self.metadata, &self.tags);
    }

    fn read_body(src: &mut Reader<'_>) -> Result<Self> {
        let (group, metadata, tags) = read_group_body(src)?;
        Ok(Self { group, metadata, tags })
    }
}

impl FrameBody for Broadcast {
    const FRAME_TYPE: FrameType = FrameType::Broadcast;

    fn body_len(&self) -> usize {
        group_body_len(&self.group, &self.metadata, &self.tags)
    }

    fn write_body(&self, dst: &mut impl BufMut) {
        write_group_body(dst, &self.group, &self.metadata, &self.tags);
    }

    fn read_body(src: &mut Reader<'_>) -> Result<Self> {
        let (group, metadata, tags) = read_group_body(src)?;
        Ok(Self { group, metadata, tags })
    }
}

impl FrameBody for Shard {
    const FRAME_TYPE: FrameType = FrameType::Shard;

    fn body_len(&self) -> usize {
        shard_body_len(&self.group, &self.metadata, &self.shard_key, &self.tags)
    }

    fn write_body(&self, dst: &mut impl BufMut) {
        write_shard_body(dst, &self.group, &self.metadata, &self.shard_key, &self.tags);
    }

    fn read_body(src: &mut Reader<'_>) -> Result<Self> {
        let group = src.read_string("group")?;
        let metadata = src.read_prefixed("metadata")?;
        let shard_key = src.read_prefixed("shard_key")?;
        let end = src.end();
        let tags = decode_tags(src, end)?;
        Ok(Self { group, metadata, shard_key, tags })
    }
}
