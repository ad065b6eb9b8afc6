//! Wire-level contracts.
//!
//! - `ids`: well-known object and resource identifiers that must match what
//!   devices implement.
//! - `payload`: the CBOR grant map carried by authorization requests.
//! - `downlink`: request/response shapes sent from the broker to devices.
//!
//! Decoders are panic-free: malformed input is reported as `PeerGrantError`.

pub mod downlink;
pub mod ids;
pub mod payload;
