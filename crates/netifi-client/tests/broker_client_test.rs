//! Broker client end to end against the loopback transport.
//!
//! The loopback plays the broker: it keeps the setup metadata, records every
//! routed call exactly as it left the client, and delivers it to the
//! registered service with the routing frame still attached.

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use netifi_client::{BrokerClient, BrokerClientConfig, ClientDefaults, ClientError};
use netifi_core::{
    Payload, PayloadStream, RSocket, RSocketError, RSocketExt, SetupOptions, SourceStream,
};
use netifi_harness::LoopbackTransport;
use netifi_proto::{DESTINATION_TAG, Frame, FrameType, Tags};
use uuid::Uuid;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Service that records what it was called with and echoes it back.
#[derive(Default)]
struct RecordingService {
    seen: Mutex<Vec<Payload>>,
}

impl RecordingService {
    fn record(&self, payload: &Payload) {
        self.seen.lock().unwrap().push(payload.clone());
    }

    fn seen(&self) -> Vec<Payload> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl RSocket for RecordingService {
    async fn request_response(&self, payload: Payload) -> Result<Payload, RSocketError> {
        self.record(&payload);
        Ok(payload)
    }

    fn request_stream(&self, payload: Payload) -> PayloadStream {
        self.record(&payload);
        stream::iter([Ok(payload.clone()), Ok(payload)]).boxed()
    }

    fn request_channel(&self, payload: Payload, source: SourceStream) -> PayloadStream {
        self.record(&payload);
        stream::once(future::ready(payload)).chain(source).map(Ok).boxed()
    }

    async fn fire_and_forget(&self, payload: Payload) -> Result<(), RSocketError> {
        self.record(&payload);
        Ok(())
    }
}

fn scenario_config() -> BrokerClientConfig {
    BrokerClientConfig::builder("group")
        .access_key(9_007_199_254_740_991)
        .access_token("YWNjZXNzIHRva2Vu")
        .additional_flags(1)
        .tag("destination", "destination")
        .build()
}

fn new_client() -> (BrokerClient<LoopbackTransport>, LoopbackTransport) {
    let transport = LoopbackTransport::new();
    let client =
        BrokerClient::new(scenario_config(), &ClientDefaults::generate(), transport.clone())
            .unwrap();
    (client, transport)
}

#[tokio::test]
async fn destination_setup_reaches_broker() {
    init_tracing();
    let defaults = ClientDefaults::new("orders-service-1");
    let transport = LoopbackTransport::new();
    let client = BrokerClient::new(scenario_config(), &defaults, transport.clone()).unwrap();

    client.connect().await.unwrap();

    let setup = transport.setup_frame().unwrap().unwrap();
    assert_eq!(setup.ip_address, None);
    assert_eq!(setup.group, "group");
    assert_eq!(setup.access_key, 9_007_199_254_740_991);
    assert_eq!(&setup.access_token[..], b"access token");
    assert_eq!(setup.connection_id, client.connection_id());
    assert_ne!(setup.connection_id, Uuid::nil());
    assert_eq!(setup.additional_flags, 1);

    let tags: Vec<_> = setup.tags.iter().collect();
    assert_eq!(tags, [(DESTINATION_TAG, "orders-service-1"), ("destination", "destination")]);
    assert_eq!(&setup, client.setup_frame());
    assert_eq!(transport.setup_options(), Some(SetupOptions::default()));
}

#[tokio::test]
async fn configured_identity_is_sent_verbatim() {
    let id = Uuid::new_v4();
    let config = BrokerClientConfig::builder("group")
        .access_token("")
        .connection_id(id)
        .ip_address(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7)))
        .destination("worker-7")
        .build();
    let transport = LoopbackTransport::new();
    let client = BrokerClient::new(config, &ClientDefaults::generate(), transport.clone()).unwrap();

    client.connect().await.unwrap();

    let setup = transport.setup_frame().unwrap().unwrap();
    assert_eq!(setup.connection_id, id);
    assert_eq!(setup.ip_address, Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7))));
    assert!(setup.access_token.is_empty());
    assert_eq!(setup.tags.get(DESTINATION_TAG), Some("worker-7"));
}

#[tokio::test]
async fn second_connect_is_rejected() {
    let (client, transport) = new_client();

    client.connect().await.unwrap();
    let first_setup = transport.setup_metadata();

    assert_eq!(client.connect().await, Err(ClientError::AlreadyConnected));
    assert_eq!(transport.setup_metadata(), first_setup);
    assert!(client.is_connected());
}

#[tokio::test]
async fn failed_connect_can_be_retried() {
    let (client, transport) = new_client();
    transport.fail_next_connect(RSocketError::Transport("connection refused".to_string()));

    let err = client.connect().await.unwrap_err();
    assert!(err.is_transient());
    assert!(!client.is_connected());

    client.connect().await.unwrap();
    assert!(transport.is_connected());
}

#[tokio::test]
async fn calls_before_connect_fail() {
    let (client, transport) = new_client();
    let socket = client.group("accounts", Tags::new());

    let result = socket.request_response(Payload::new("d", "m")).await;
    assert_eq!(result, Err(RSocketError::Closed));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn group_call_reaches_service_with_caller_metadata() {
    init_tracing();
    let (client, transport) = new_client();
    let service = Arc::new(RecordingService::default());
    client.add_service(Arc::clone(&service));
    client.connect().await.unwrap();

    let tags: Tags = [("region", "eu")].into_iter().collect();
    let socket = client.group("accounts", tags.clone());
    let response = socket.request_response(Payload::new("ping", "rpc-metadata")).await.unwrap();

    assert_eq!(response, Payload::new("ping", "rpc-metadata"));
    assert_eq!(service.seen(), vec![Payload::new("ping", "rpc-metadata")]);

    let frames = transport.routed_frames().unwrap();
    let Frame::Group(frame) = &frames[0] else {
        panic!("expected a group frame");
    };
    assert_eq!(frame.group, "accounts");
    assert_eq!(frame.tags, tags);
    assert_eq!(&frame.metadata[..], b"rpc-metadata");
}

#[tokio::test]
async fn broadcast_fire_and_forget() {
    let (client, transport) = new_client();
    let service = Arc::new(RecordingService::default());
    client.add_service(Arc::clone(&service));
    client.connect().await.unwrap();

    client
        .broadcast("chat", Tags::new())
        .fire_and_forget(Payload::new("hello", ""))
        .await
        .unwrap();

    assert_eq!(service.seen(), vec![Payload::from_data("hello")]);
    assert_eq!(transport.routed_frames().unwrap()[0].frame_type(), FrameType::Broadcast);
}

#[tokio::test]
async fn shard_stream_with_mapper() {
    let (client, transport) = new_client();
    client.add_service(RecordingService::default());
    client.connect().await.unwrap();

    let socket = client.shard("ledger", "customer-42", Tags::new());
    let lens: Vec<_> = socket
        .request_stream_with(Payload::new("entry", "m"), |payload| payload.data.len())
        .collect()
        .await;
    assert_eq!(lens, vec![Ok(5), Ok(5)]);

    let frames = transport.routed_frames().unwrap();
    let Frame::Shard(frame) = &frames[0] else {
        panic!("expected a shard frame");
    };
    assert_eq!(&frame.shard_key[..], b"customer-42");
}

#[tokio::test]
async fn channel_routes_only_the_first_payload() {
    let (client, transport) = new_client();
    let service = Arc::new(RecordingService::default());
    client.add_service(Arc::clone(&service));
    client.connect().await.unwrap();

    let responses: Vec<Payload> = client
        .group("chat", Tags::new())
        .request_channel_with(
            Payload::new("open", "channel-metadata"),
            stream::iter(["one", "two"]),
            Payload::from_data,
            |payload| payload,
        )
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(
        responses,
        [
            Payload::new("open", "channel-metadata"),
            Payload::from_data("one"),
            Payload::from_data("two"),
        ]
    );
    assert_eq!(transport.sent().len(), 1);
    assert_eq!(service.seen(), vec![Payload::new("open", "channel-metadata")]);
}

#[tokio::test]
async fn service_refuses_unrouted_call() {
    let (client, transport) = new_client();
    let service = Arc::new(RecordingService::default());
    client.add_service(Arc::clone(&service));
    client.connect().await.unwrap();

    // Bypass the routing socket: the broker would never deliver this.
    let result = transport.request_response(Payload::new("d", "plain metadata")).await;

    assert!(matches!(result, Err(RSocketError::Protocol(_))));
    assert!(service.seen().is_empty());
}
