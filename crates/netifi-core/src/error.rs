//! Errors surfaced by request calls.

use std::io;

use netifi_proto::ProtocolError;
use thiserror::Error;

/// Failure of a request-response, stream, channel or fire-and-forget call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RSocketError {
    /// Routing metadata could not be built or read
    #[error("routing metadata: {0}")]
    Protocol(#[from] ProtocolError),

    /// Underlying transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Peer answered with an error frame
    #[error("rejected by peer ({code:#010x}): {message}")]
    Rejected {
        /// Error code sent by the peer
        code: u32,
        /// Error message sent by the peer
        message: String,
    },

    /// Connection is not established or already gone
    #[error("connection closed")]
    Closed,
}

impl RSocketError {
    /// Returns true if the call may succeed on a fresh connection.
    ///
    /// Malformed routing metadata and peer rejections fail the same way every
    /// time; only transport loss is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Closed)
    }
}

impl From<io::Error> for RSocketError {
    fn from(err: io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
