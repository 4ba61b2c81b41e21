//! Broker client: one handshake, then any number of routed sockets.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use netifi_core::{
    BrokerSocket, ClientTransport, RSocket, Route, SetupOptions, UnwrappingResponder,
};
use netifi_proto::{DESTINATION_TAG, DestinationSetup, FrameBody, Tags};
use tracing::debug;
use uuid::Uuid;

use crate::{BrokerClientConfig, ClientDefaults, ClientError};

/// Connection to the broker over transport `T`.
///
/// Construction resolves every default and fixes the setup frame;
/// [`connect`](Self::connect) sends it. Routed sockets can be created before
/// or after connecting and share the one transport.
pub struct BrokerClient<T> {
    transport: Arc<T>,
    setup: DestinationSetup,
    options: SetupOptions,
    destination: String,
    connected: AtomicBool,
}

impl<T: ClientTransport> BrokerClient<T> {
    /// Build a client.
    ///
    /// The access token is decoded from base64, a missing connection id is
    /// generated, a missing destination is taken from `defaults`, and the
    /// destination is added to the tags under [`DESTINATION_TAG`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidAccessToken`] if the token is not base64.
    pub fn new(
        config: BrokerClientConfig,
        defaults: &ClientDefaults,
        transport: T,
    ) -> Result<Self, ClientError> {
        let access_token = STANDARD.decode(config.access_token.as_bytes())?;
        let destination = config.destination.unwrap_or_else(|| defaults.destination().to_string());

        let mut tags = config.tags;
        tags.insert(DESTINATION_TAG, destination.clone());

        let setup = DestinationSetup {
            ip_address: config.ip_address,
            group: config.group,
            access_key: config.access_key,
            access_token: Bytes::from(access_token),
            connection_id: config.connection_id.unwrap_or_else(Uuid::new_v4),
            additional_flags: config.additional_flags,
            tags,
        };

        Ok(Self {
            transport: Arc::new(transport),
            setup,
            options: config.setup,
            destination,
            connected: AtomicBool::new(false),
        })
    }

    /// Perform the destination setup handshake.
    ///
    /// A client connects at most once. A failed attempt may be retried.
    ///
    /// # Errors
    ///
    /// - [`ClientError::AlreadyConnected`] if a previous call succeeded or is
    ///   still in progress
    /// - [`ClientError::RSocket`] if the transport fails to connect
    pub async fn connect(&self) -> Result<(), ClientError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            return Err(ClientError::AlreadyConnected);
        }

        let result = self.handshake().await;
        if result.is_err() {
            self.connected.store(false, Ordering::Release);
        }
        result
    }

    async fn handshake(&self) -> Result<(), ClientError> {
        let metadata = self.setup.to_bytes()?;
        debug!(
            group = %self.setup.group,
            destination = %self.destination,
            connection_id = %self.setup.connection_id,
            setup_len = metadata.len(),
            "connecting to broker"
        );

        self.transport.connect(&self.options, metadata).await?;

        debug!(
            group = %self.setup.group,
            destination = %self.destination,
            connection_id = %self.setup.connection_id,
            "connected to broker"
        );
        Ok(())
    }

    /// Socket routing every call to one member of `group`.
    pub fn group(&self, group: impl Into<String>, tags: Tags) -> BrokerSocket<Arc<T>> {
        BrokerSocket::new(Arc::clone(&self.transport), Route::group(group, tags))
    }

    /// Socket routing every call to all members of `group`.
    pub fn broadcast(&self, group: impl Into<String>, tags: Tags) -> BrokerSocket<Arc<T>> {
        BrokerSocket::new(Arc::clone(&self.transport), Route::broadcast(group, tags))
    }

    /// Socket routing every call to the member of `group` owning `shard_key`.
    pub fn shard(
        &self,
        group: impl Into<String>,
        shard_key: impl Into<Bytes>,
        tags: Tags,
    ) -> BrokerSocket<Arc<T>> {
        BrokerSocket::new(Arc::clone(&self.transport), Route::shard(group, shard_key, tags))
    }

    /// Serve inbound calls with `service`.
    ///
    /// The broker delivers calls with the routing frame still in front of the
    /// metadata; the service receives only the caller's own metadata.
    pub fn add_service<S: RSocket>(&self, service: S) {
        debug!(group = %self.setup.group, destination = %self.destination, "registering service");
        self.transport.register_responder(Arc::new(UnwrappingResponder::new(service)));
    }
}

impl<T> BrokerClient<T> {
    /// Setup frame sent by [`connect`](Self::connect)
    pub fn setup_frame(&self) -> &DestinationSetup {
        &self.setup
    }

    /// Effective destination name
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Connection id sent to the broker
    pub fn connection_id(&self) -> Uuid {
        self.setup.connection_id
    }

    /// Whether a connect attempt has succeeded or is in flight
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
