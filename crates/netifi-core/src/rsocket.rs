//! Request surface consumed from the underlying transport.
//!
//! The broker client does not implement a transport. It needs a connected
//! socket offering the four interaction models and a way to hand the
//! transport a responder for inbound calls; everything here is expressed in
//! terms of those two traits.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};

use crate::{RSocketError, SetupOptions};

/// Responses of a request-stream or request-channel call.
pub type PayloadStream = BoxStream<'static, Result<Payload, RSocketError>>;

/// Outbound items of a request-channel call after the first.
pub type SourceStream = BoxStream<'static, Payload>;

/// Data and metadata of one call or one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    /// Application data
    pub data: Bytes,
    /// Application metadata
    pub metadata: Bytes,
}

impl Payload {
    /// Create a payload
    pub fn new(data: impl Into<Bytes>, metadata: impl Into<Bytes>) -> Self {
        Self { data: data.into(), metadata: metadata.into() }
    }

    /// Create a payload with empty metadata
    pub fn from_data(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), metadata: Bytes::new() }
    }
}

/// The four interaction models of a connected socket.
///
/// Implemented by transports for outbound calls and by services for inbound
/// ones. Implementations must tolerate concurrent calls.
#[async_trait]
pub trait RSocket: Send + Sync + 'static {
    /// Send one payload and await one response.
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError>;

    /// Send one payload and receive a stream of responses.
    fn request_stream(&self, payload: Payload) -> PayloadStream;

    /// Send `payload` followed by every item of `source`, receiving a stream
    /// of responses.
    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream;

    /// Send one payload without waiting for a response.
    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError>;
}

#[async_trait]
impl<S: RSocket + ?Sized> RSocket for Arc<S> {
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
        (**self).request_response(payload).await
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        (**self).request_stream(payload)
    }

    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
        (**self).request_channel(payload, source)
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError> {
        (**self).fire_and_forget(payload).await
    }
}

/// Client side of a transport: a socket that first has to be connected.
///
/// Calls made before [`connect`](ClientTransport::connect) completes fail the
/// way the transport decides, typically with [`RSocketError::Closed`].
#[async_trait]
pub trait ClientTransport: RSocket {
    /// Establish the connection, sending `setup_metadata` verbatim as the
    /// metadata of the setup frame.
    async fn connect(
        &self,
        options: &SetupOptions,
        setup_metadata: Bytes,
    ) -> Result<(), RSocketError>;

    /// Install the handler for calls the peer initiates.
    ///
    /// A later registration replaces the earlier one.
    fn register_responder(&self, responder: Arc<dyn RSocket>);
}

/// Mapping helpers on top of [`RSocket`].
///
/// These convert outgoing items into payloads and responses into caller
/// types, leaving the socket itself untouched. A routing socket therefore
/// gets them for free.
#[async_trait]
pub trait RSocketExt: RSocket {
    /// Request-response with the response mapped through `mapper`.
    async fn request_response_with<T, F>(
        &self,
        payload: Payload,
        mapper: F,
    ) -> Result<T, RSocketError>
    where
        F: FnOnce(Payload) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.request_response(payload).await.map(mapper)
    }

    /// Request-stream with every response mapped through `mapper`.
    fn request_stream_with<T, F>(
        &self,
        payload: Payload,
        mut mapper: F,
    ) -> BoxStream<'static, Result<T, RSocketError>>
    where
        F: FnMut(Payload) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.request_stream(payload).map(move |item| item.map(&mut mapper)).boxed()
    }

    /// Request-channel over an arbitrary source, mapping items on the way out
    /// and responses on the way in.
    fn request_channel_with<I, T, M, F>(
        &self,
        payload: Payload,
        source: I,
        source_mapper: M,
        mut result_mapper: F,
    ) -> BoxStream<'static, Result<T, RSocketError>>
    where
        I: Stream + Send + 'static,
        M: FnMut(I::Item) -> Payload + Send + 'static,
        F: FnMut(Payload) -> T + Send + 'static,
        T: Send + 'static,
    {
        let source = source.map(source_mapper).boxed();
        self.request_channel(payload, source).map(move |item| item.map(&mut result_mapper)).boxed()
    }
}

impl<S: RSocket + ?Sized> RSocketExt for S {}
