//! Service-side counterpart of [`BrokerSocket`](crate::BrokerSocket).

use async_trait::async_trait;
use futures::{
    future,
    stream::{self, StreamExt},
};
use netifi_proto::unwrap_metadata;
use tracing::warn;

use crate::{Payload, PayloadStream, RSocket, RSocketError, SourceStream};

/// Strips the broker routing frame from inbound calls before delegating.
///
/// Calls routed by the broker arrive with a Group, Broadcast or Shard frame as
/// metadata. The wrapped service only ever sees the metadata the original
/// caller sent. A call whose metadata is not a routing frame is refused with
/// [`RSocketError::Protocol`] and never reaches the service.
#[derive(Debug, Clone)]
pub struct UnwrappingResponder<S> {
    inner: S,
}

impl<S> UnwrappingResponder<S> {
    /// Wrap a service
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Unwrap the service
    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn unwrap_payload(call: &'static str, mut payload: Payload) -> Result<Payload, RSocketError> {
    match unwrap_metadata(&payload.metadata) {
        Ok(metadata) => {
            payload.metadata = metadata;
            Ok(payload)
        },
        Err(err) => {
            warn!(call, error = %err, metadata_len = payload.metadata.len(), "refusing inbound call");
            Err(err.into())
        },
    }
}

#[async_trait]
impl<S: RSocket> RSocket for UnwrappingResponder<S> {
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
        let payload = unwrap_payload("request_response", payload)?;
        self.inner.request_response(payload).await
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        match unwrap_payload("request_stream", payload) {
            Ok(payload) => self.inner.request_stream(payload),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
        match unwrap_payload("request_channel", payload) {
            Ok(payload) => self.inner.request_channel(payload, source),
            Err(err) => stream::once(future::ready(Err(err))).boxed(),
        }
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError> {
        let payload = unwrap_payload("fire_and_forget", payload)?;
        self.inner.fire_and_forget(payload).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use netifi_proto::{BrokerSetup, FrameBody, FrameType, ProtocolError, Tags};

    use super::*;
    use crate::Route;

    /// Answers with the metadata it was given as data.
    #[derive(Default)]
    struct MetadataEcho {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RSocket for MetadataEcho {
        async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Payload::from_data(payload.metadata))
        }

        fn request_stream(&self, payload: Payload) -> PayloadStream {
            self.calls.fetch_add(1, Ordering::SeqCst);
            stream::iter([Ok(Payload::from_data(payload.metadata))]).boxed()
        }

        fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
            self.calls.fetch_add(1, Ordering::SeqCst);
            stream::once(future::ready(payload))
                .chain(source)
                .map(|payload| Ok(Payload::from_data(payload.metadata)))
                .boxed()
        }

        async fn fire_and_forget(&self, _payload: Payload) -> Result<(), RSocketError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn routed(route: &Route, metadata: &'static [u8]) -> Payload {
        Payload::new("data", route.wrap(metadata).unwrap())
    }

    #[tokio::test]
    async fn service_sees_caller_metadata() {
        let responder = UnwrappingResponder::new(MetadataEcho::default());

        for route in [
            Route::group("svc", Tags::new()),
            Route::broadcast("svc", Tags::new()),
            Route::shard("svc", "k", Tags::new()),
        ] {
            let response = responder.request_response(routed(&route, b"rpc")).await.unwrap();
            assert_eq!(&response.data[..], b"rpc");
        }
    }

    #[tokio::test]
    async fn stream_and_channel_unwrap_first_payload() {
        let responder = UnwrappingResponder::new(MetadataEcho::default());
        let route = Route::group("svc", Tags::new());

        let streamed: Vec<_> = responder.request_stream(routed(&route, b"s")).collect().await;
        assert_eq!(streamed, vec![Ok(Payload::from_data("s"))]);

        let source = stream::iter([Payload::new("d", "plain")]).boxed();
        let channel: Vec<_> = responder.request_channel(routed(&route, b"c"), source).collect().await;
        assert_eq!(channel, vec![Ok(Payload::from_data("c")), Ok(Payload::from_data("plain"))]);
    }

    #[tokio::test]
    async fn refuse_setup_frame_metadata() {
        let service = MetadataEcho::default();
        let responder = UnwrappingResponder::new(service);
        let setup = BrokerSetup::new("b", "c", 1, Bytes::new()).to_bytes().unwrap();

        let result = responder.fire_and_forget(Payload::new("d", setup)).await;
        assert_eq!(
            result,
            Err(RSocketError::Protocol(ProtocolError::UnsupportedFrameType(FrameType::BrokerSetup)))
        );
        assert_eq!(responder.into_inner().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refuse_garbage_metadata() {
        let responder = UnwrappingResponder::new(MetadataEcho::default());

        let streamed: Vec<_> =
            responder.request_stream(Payload::new("d", "not a frame")).collect().await;
        assert!(matches!(streamed.as_slice(), [Err(RSocketError::Protocol(_))]));
        assert_eq!(responder.into_inner().calls.load(Ordering::SeqCst), 0);
    }
}
