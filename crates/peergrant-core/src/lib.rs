//! peergrant core: device-to-device authorization primitives shared by the
//! broker, its transport bindings and test tooling.
//!
//! This crate defines the grant model, the authorization request/response
//! values, the typed LwM2M resource model used for downlink calls, and the
//! CBOR grant payload codec. It carries no runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed payloads from devices surface as `PeerGrantError`, never as a
//! crashed broker.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod grant;
pub mod model;
pub mod protocol;
pub mod request;
pub mod response;

/// Shared result type.
pub use error::{PeerGrantError, ResponseCode, Result};
pub use grant::{Access, AccessGrant, ObjectPath};
pub use request::{AuthRequest, Identity, SecurityBinding};
pub use response::{AuthResponse, AuthResultKind};
