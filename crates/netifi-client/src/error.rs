//! Client error type.

use netifi_core::RSocketError;
use netifi_proto::ProtocolError;
use thiserror::Error;

/// Failure constructing or connecting a [`BrokerClient`](crate::BrokerClient).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Access token text is not standard base64
    #[error("access token is not valid base64: {0}")]
    InvalidAccessToken(#[from] base64::DecodeError),

    /// `connect` was called on a client that already connected
    #[error("client is already connected")]
    AlreadyConnected,

    /// Setup frame could not be encoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Transport refused or lost the connection
    #[error(transparent)]
    RSocket(#[from] RSocketError),
}

impl ClientError {
    /// Returns true if connecting again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RSocket(err) => err.is_transient(),
            Self::InvalidAccessToken(_) | Self::AlreadyConnected | Self::Protocol(_) => false,
        }
    }
}
