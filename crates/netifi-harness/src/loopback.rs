//! Loopback transport.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    future,
    stream::{self, StreamExt},
};
use netifi_core::{
    ClientTransport, Payload, PayloadStream, RSocket, RSocketError, SetupOptions, SourceStream,
};
use netifi_proto::{DestinationSetup, Frame, FrameBody, ProtocolError};
use tracing::debug;

/// In-memory transport that plays the broker.
///
/// `connect` records the setup metadata instead of sending it. Every call
/// after that is recorded with its metadata exactly as the client produced it,
/// then delivered to the registered responder as a broker would, routing
/// frame included. Without a responder the call is echoed back.
///
/// Clones share state, so a test can keep one handle and give another to the
/// client under test.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    inner: Arc<Mutex<LoopbackInner>>,
}

#[derive(Default)]
struct LoopbackInner {
    /// Options and metadata of the accepted setup
    setup: Option<(SetupOptions, Bytes)>,

    /// Error returned by the next connect attempt
    connect_failure: Option<RSocketError>,

    responder: Option<Arc<dyn RSocket>>,

    /// Outbound calls in order, metadata untouched
    sent: Vec<Payload>,
}

impl LoopbackTransport {
    /// Create an unconnected transport
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `connect` fail with `err`.
    pub fn fail_next_connect(&self, err: RSocketError) {
        self.lock().connect_failure = Some(err);
    }

    /// Whether a setup has been accepted
    pub fn is_connected(&self) -> bool {
        self.lock().setup.is_some()
    }

    /// Whether a responder is registered
    pub fn has_responder(&self) -> bool {
        self.lock().responder.is_some()
    }

    /// Options sent with the accepted setup
    pub fn setup_options(&self) -> Option<SetupOptions> {
        self.lock().setup.as_ref().map(|(options, _)| options.clone())
    }

    /// Raw setup metadata
    pub fn setup_metadata(&self) -> Option<Bytes> {
        self.lock().setup.as_ref().map(|(_, metadata)| metadata.clone())
    }

    /// Setup metadata decoded as the broker would.
    pub fn setup_frame(&self) -> Option<Result<DestinationSetup, ProtocolError>> {
        self.setup_metadata().map(|metadata| DestinationSetup::from_bytes(&metadata))
    }

    /// Outbound calls in the order they were made
    pub fn sent(&self) -> Vec<Payload> {
        self.lock().sent.clone()
    }

    /// Routing frames of every outbound call, decoded.
    pub fn routed_frames(&self) -> Result<Vec<Frame>, ProtocolError> {
        self.lock().sent.iter().map(|payload| Frame::decode(&payload.metadata)).collect()
    }

    fn accept_setup(&self, options: &SetupOptions, metadata: Bytes) -> Result<(), RSocketError> {
        let mut inner = self.lock();
        if let Some(err) = inner.connect_failure.take() {
            debug!(error = %err, "loopback refusing setup");
            return Err(err);
        }

        debug!(setup_len = metadata.len(), "loopback accepted setup");
        inner.setup = Some((options.clone(), metadata));
        Ok(())
    }

    /// Record an outbound call and pick who answers it.
    fn deliver(&self, payload: &Payload) -> Result<Option<Arc<dyn RSocket>>, RSocketError> {
        let mut inner = self.lock();
        if inner.setup.is_none() {
            return Err(RSocketError::Closed);
        }

        inner.sent.push(payload.clone());
        Ok(inner.responder.clone())
    }
}

#[async_trait]
impl RSocket for LoopbackTransport {
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
        match self.deliver(&payload)? {
            Some(responder) => responder.request_response(payload).await,
            None => Ok(payload),
        }
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        match self.deliver(&payload) {
            Ok(Some(responder)) => responder.request_stream(payload),
            Ok(None) => stream::iter([Ok(payload)]).boxed(),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
        match self.deliver(&payload) {
            Ok(Some(responder)) => responder.request_channel(payload, source),
            Ok(None) => stream::once(future::ready(payload)).chain(source).map(Ok).boxed(),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError> {
        match self.deliver(&payload)? {
            Some(responder) => responder.fire_and_forget(payload).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClientTransport for LoopbackTransport {
    async fn connect(
        &self,
        options: &SetupOptions,
        setup_metadata: Bytes,
    ) -> Result<(), RSocketError> {
        self.accept_setup(options, setup_metadata)
    }

    fn register_responder(&self, responder: Arc<dyn RSocket>) {
        self.lock().responder = Some(responder);
    }
}

#[cfg(test)]
mod tests {
    use netifi_proto::{FrameType, Group, Tags};

    use super::*;

    struct Constant;

    #[async_trait]
    impl RSocket for Constant {
        async fn request_response(&self, _payload: Payload) -> Result<Payload, RSocketError> {
            Ok(Payload::from_data("constant"))
        }

        fn request_stream(&self, _payload: Payload) -> PayloadStream {
            stream::empty().boxed()
        }

        fn request_channel(&self, _payload: Payload, _source: SourceStream) -> PayloadStream {
            stream::empty().boxed()
        }

        async fn fire_and_forget(&self, _payload: Payload) -> Result<(), RSocketError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn calls_before_connect_are_closed() {
        let transport = LoopbackTransport::new();

        let result = transport.request_response(Payload::from_data("early")).await;
        assert_eq!(result, Err(RSocketError::Closed));

        let streamed: Vec<_> = transport.request_stream(Payload::from_data("early")).collect().await;
        assert_eq!(streamed, vec![Err(RSocketError::Closed)]);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn records_setup_and_echoes() {
        let transport = LoopbackTransport::new();
        let handle = transport.clone();

        transport.connect(&SetupOptions::default(), Bytes::from_static(b"setup")).await.unwrap();
        assert!(handle.is_connected());
        assert_eq!(handle.setup_metadata(), Some(Bytes::from_static(b"setup")));
        assert_eq!(handle.setup_options(), Some(SetupOptions::default()));

        let response = transport.request_response(Payload::new("d", "m")).await.unwrap();
        assert_eq!(response, Payload::new("d", "m"));
        assert_eq!(handle.sent(), vec![Payload::new("d", "m")]);
    }

    #[tokio::test]
    async fn delivers_to_responder() {
        let transport = LoopbackTransport::new();
        transport.connect(&SetupOptions::default(), Bytes::new()).await.unwrap();
        transport.register_responder(Arc::new(Constant));
        assert!(transport.has_responder());

        let response = transport.request_response(Payload::from_data("x")).await.unwrap();
        assert_eq!(response, Payload::from_data("constant"));
    }

    #[tokio::test]
    async fn connect_failure_is_one_shot() {
        let transport = LoopbackTransport::new();
        transport.fail_next_connect(RSocketError::Transport("refused".to_string()));

        let first = transport.connect(&SetupOptions::default(), Bytes::new()).await;
        assert_eq!(first, Err(RSocketError::Transport("refused".to_string())));
        assert!(!transport.is_connected());

        transport.connect(&SetupOptions::default(), Bytes::new()).await.unwrap();
        assert!(transport.is_connected());
    }

    #[tokio::test]
    async fn decodes_routed_frames() {
        let transport = LoopbackTransport::new();
        transport.connect(&SetupOptions::default(), Bytes::new()).await.unwrap();

        let metadata = Group::new("svc", &b"m"[..], Tags::new()).to_bytes().unwrap();
        transport.fire_and_forget(Payload::new("d", metadata)).await.unwrap();

        let frames = transport.routed_frames().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_type(), FrameType::Group);
        assert_eq!(frames[0].group(), Some("svc"));
    }
}
