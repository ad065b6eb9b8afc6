//! Transport layer.
//!
//! - `sender`: the downlink boundary every remote read/create/update goes
//!   through.
//! - `codec`: decode-once parsing of an inbound authorization request.
//! - `endpoint`: the `ac` resource that maps requests to the handler and
//!   outcomes back to response codes.

pub mod codec;
pub mod endpoint;
pub mod sender;
