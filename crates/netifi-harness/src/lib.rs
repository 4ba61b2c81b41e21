//! Test harness for broker clients.
//!
//! [`LoopbackTransport`] implements the client transport in memory so client
//! behavior can be tested without a broker or a network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod loopback;

pub use loopback::LoopbackTransport;
