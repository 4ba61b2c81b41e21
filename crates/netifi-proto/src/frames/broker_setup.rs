//! Broker-to-broker setup frame.

use bytes::{BufMut, Bytes};

use super::FrameBody;
use crate::{
    FrameType,
    codec::{Reader, prefixed_len, put_prefixed, put_str},
    errors::{ProtocolError, Result},
};

/// Identifies a broker node to another broker when they connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSetup {
    /// Id of the connecting broker
    pub broker_id: String,
    /// Cluster the broker belongs to
    pub cluster_id: String,
    /// Access key id
    pub access_key: i64,
    /// Opaque access token, never interpreted here
    pub access_token: Bytes,
}

impl BrokerSetup {
    /// Create a broker setup frame
    pub fn new(
        broker_id: impl Into<String>,
        cluster_id: impl Into<String>,
        access_key: i64,
        access_token: impl Into<Bytes>,
    ) -> Self {
        Self {
            broker_id: broker_id.into(),
            cluster_id: cluster_id.into(),
            access_key,
            access_token: access_token.into(),
        }
    }
}

impl FrameBody for BrokerSetup {
    const FRAME_TYPE: FrameType = FrameType::BrokerSetup;

    fn body_len(&self) -> usize {
        prefixed_len(self.broker_id.len())
            + prefixed_len(self.cluster_id.len())
            + size_of::<i64>()
            + prefixed_len(self.access_token.len())
    }

    fn write_body(&self, dst: &mut impl BufMut) {
        put_str(dst, &self.broker_id);
        put_str(dst, &self.cluster_id);
        dst.put_i64(self.access_key);
        put_prefixed(dst, &self.access_token);
    }

    fn read_body(src: &mut Reader<'_>) -> Result<Self> {
        let frame = Self {
            broker_id: src.read_string("broker_id")?,
            cluster_id: src.read_string("cluster_id")?,
            access_key: src.read_i64("access_key")?,
            access_token: src.read_prefixed("access_token")?,
        };

        // No tag map follows, so the access token must end the frame
        if !src.is_empty() {
            return Err(ProtocolError::TrailingBytes {
                frame_type: Self::FRAME_TYPE,
                remaining: src.remaining(),
            });
        }
        Ok(frame)
    }
}
