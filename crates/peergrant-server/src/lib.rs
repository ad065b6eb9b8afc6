//! peergrant broker library entry.
//!
//! This crate wires the registration directory, policy, remote peer
//! operations, access control programming and the `ac` resource endpoint
//! into one authorization broker. The CoAP stack, the registration store and
//! the downlink sender are supplied by the embedder through the
//! `RegistrationDirectory` and `RequestSender` traits.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. A misbehaving
//! device yields a forbidden outcome, never a crashed broker.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod acl;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod obs;
pub mod peer;
pub mod policy;
pub mod transport;

pub use app_state::AppState;
pub use auth::AuthHandler;
pub use directory::{InMemoryDirectory, Registration, RegistrationDirectory};
pub use transport::endpoint::{AuthResource, OutboundResponse};
pub use transport::sender::RequestSender;
