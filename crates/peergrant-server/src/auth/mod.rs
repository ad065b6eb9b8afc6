//! Authorization orchestration.
//!
//! - `handler`: the resolve / decide / validate / provision / commit pipeline
//! - `saga`: compensation log for partially applied provisioning
//! - `locks`: per-device serialization of the scan-then-create sequence

pub mod handler;
pub mod locks;
pub mod saga;

pub use handler::AuthHandler;
pub use saga::{ProvisionLog, RollbackReport};
