//! Top-level facade crate for peergrant.
//!
//! Re-exports the core types and the broker library so embedders can depend
//! on a single crate.

pub mod core {
    pub use peergrant_core::*;
}

pub mod server {
    pub use peergrant_server::*;
}
