//! Routing socket.
//!
//! [`BrokerSocket`] wraps a connected socket and replaces the metadata of
//! every outgoing call with a routing frame that embeds it. The route is fixed
//! at construction; the wrapper keeps no per-call state, so one instance can
//! serve any number of concurrent calls.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    future,
    stream::{self, StreamExt},
};
use netifi_proto::{FrameType, Tags, wrap_broadcast, wrap_group, wrap_shard};
use tracing::trace;

use crate::{Payload, PayloadStream, RSocket, RSocketError, SourceStream};

/// Where the broker should deliver a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// One member of `group`
    Group {
        /// Target group
        group: String,
        /// Tags narrowing the candidate members
        tags: Tags,
    },
    /// Every member of `group`
    Broadcast {
        /// Target group
        group: String,
        /// Tags narrowing the candidate members
        tags: Tags,
    },
    /// The member of `group` owning `shard_key`
    Shard {
        /// Target group
        group: String,
        /// Opaque key hashed by the broker
        shard_key: Bytes,
        /// Tags narrowing the candidate members
        tags: Tags,
    },
}

impl Route {
    /// Route to one member of a group
    pub fn group(group: impl Into<String>, tags: Tags) -> Self {
        Self::Group { group: group.into(), tags }
    }

    /// Route to every member of a group
    pub fn broadcast(group: impl Into<String>, tags: Tags) -> Self {
        Self::Broadcast { group: group.into(), tags }
    }

    /// Route by shard key within a group
    pub fn shard(group: impl Into<String>, shard_key: impl Into<Bytes>, tags: Tags) -> Self {
        Self::Shard { group: group.into(), shard_key: shard_key.into(), tags }
    }

    /// Frame type written in front of routed metadata
    pub const fn frame_type(&self) -> FrameType {
        match self {
            Self::Group { .. } => FrameType::Group,
            Self::Broadcast { .. } => FrameType::Broadcast,
            Self::Shard { .. } => FrameType::Shard,
        }
    }

    /// Target group
    pub fn target(&self) -> &str {
        match self {
            Self::Group { group, .. } | Self::Broadcast { group, .. } | Self::Shard { group, .. } => {
                group
            },
        }
    }

    /// Tags attached to every routed call
    pub fn tags(&self) -> &Tags {
        match self {
            Self::Group { tags, .. } | Self::Broadcast { tags, .. } | Self::Shard { tags, .. } => {
                tags
            },
        }
    }

    /// Encode the routing frame carrying `metadata`.
    ///
    /// Encodes straight from the route's fields; nothing is cloned per call.
    pub fn wrap(&self, metadata: &[u8]) -> netifi_proto::Result<Bytes> {
        match self {
            Self::Group { group, tags } => wrap_group(group, metadata, tags),
            Self::Broadcast { group, tags } => wrap_broadcast(group, metadata, tags),
            Self::Shard { group, shard_key, tags } => wrap_shard(group, metadata, shard_key, tags),
        }
    }
}

/// Socket that routes every call through the broker.
///
/// Data, channel sources and mapping functions pass through unchanged; only
/// the metadata of the initiating payload is rewritten.
#[derive(Debug, Clone)]
pub struct BrokerSocket<S> {
    inner: S,
    route: Route,
}

impl<S> BrokerSocket<S> {
    /// Wrap an already connected socket
    pub fn new(inner: S, route: Route) -> Self {
        Self { inner, route }
    }

    /// Route applied to every call
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Unwrap the underlying socket
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn wrap(&self, mut payload: Payload) -> Result<Payload, RSocketError> {
        let metadata_len = payload.metadata.len();
        payload.metadata = self.route.wrap(&payload.metadata)?;

        trace!(
            route = ?self.route.frame_type(),
            group = self.route.target(),
            metadata_len,
            frame_len = payload.metadata.len(),
            "routing call"
        );
        Ok(payload)
    }
}

fn failed(err: RSocketError) -> PayloadStream {
    stream::once(future::ready(Err(err))).boxed()
}

#[async_trait]
impl<S: RSocket> RSocket for BrokerSocket<S> {
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
        let payload = self.wrap(payload)?;
        self.inner.request_response(payload).await
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        match self.wrap(payload) {
            Ok(payload) => self.inner.request_stream(payload),
            Err(err) => failed(err),
        }
    }

    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
        match self.wrap(payload) {
            Ok(payload) => self.inner.request_channel(payload, source),
            Err(err) => failed(err),
        }
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError> {
        let payload = self.wrap(payload)?;
        self.inner.fire_and_forget(payload).await
    }
}
