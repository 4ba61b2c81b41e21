//! Request surface and routing for the Netifi broker client.
//!
//! The transport is a collaborator, not part of this crate: anything that
//! implements [`ClientTransport`] can carry broker traffic. On top of it this
//! crate provides the two metadata transforms the broker needs.
//!
//! - [`BrokerSocket`] wraps outgoing call metadata in a routing frame
//! - [`UnwrappingResponder`] strips that frame from inbound calls
//!
//! # Components
//!
//! - [`rsocket`]: Payload, the four-call [`RSocket`] trait, transport trait
//! - [`socket`]: Route and the routing socket
//! - [`responder`]: Service-side unwrapping
//! - [`options`]: Handshake options
//! - [`error`]: Call error type

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod options;
pub mod responder;
pub mod rsocket;
pub mod socket;

pub use error::RSocketError;
pub use options::{DEFAULT_MIME_TYPE, SetupOptions};
pub use responder::UnwrappingResponder;
pub use rsocket::{ClientTransport, Payload, PayloadStream, RSocket, RSocketExt, SourceStream};
pub use socket::{BrokerSocket, Route};
