//! Client for the Netifi broker.
//!
//! A [`BrokerClient`] introduces itself to the broker once, with a destination
//! setup frame sent as the transport's setup metadata, and then hands out
//! routed sockets. Each socket wraps the metadata of every call in a Group,
//! Broadcast or Shard frame so the broker knows where to deliver it.
//!
//! ```no_run
//! # async fn run<T: netifi_core::ClientTransport>(transport: T) -> Result<(), netifi_client::ClientError> {
//! use netifi_client::{BrokerClient, BrokerClientConfig, ClientDefaults};
//! use netifi_core::{Payload, RSocket};
//! use netifi_proto::Tags;
//!
//! let defaults = ClientDefaults::generate();
//! let config = BrokerClientConfig::builder("quickstart.clients")
//!     .access_key(9_007_199_254_740_991)
//!     .access_token("kTBDVtfRBO4tHOnZzSyY5ym2kfY=")
//!     .build();
//!
//! let client = BrokerClient::new(config, &defaults, transport)?;
//! client.connect().await?;
//!
//! let services = client.group("quickstart.services", Tags::new());
//! let _response = services.request_response(Payload::new("hello", "")).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;

pub use client::BrokerClient;
pub use config::{BrokerClientConfig, BrokerClientConfigBuilder, ClientDefaults};
pub use error::ClientError;
