//! Policy layer (authorization decision).
//!
//! The orchestrator only calls `Authorizer::decide`; the built-in
//! `AllowlistAuthorizer` compiles `requester -> host` rules from config.

pub mod allowlist;
pub mod authorizer;

pub use authorizer::{AllowlistAuthorizer, Authorizer};
