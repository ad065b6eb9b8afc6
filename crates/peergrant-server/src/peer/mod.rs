//! Remote peer operations.
//!
//! Everything the broker does to one device goes through `PeerClient`:
//! reading the client registry, create-or-update of peer accounts, and the
//! single ACL create. Each call is bound by the configured timeout.

pub mod account;
pub mod client;
pub mod scan;

use std::fmt;

pub use account::{lookup_short_id, set_account, AccountOutcome};
pub use client::PeerClient;
pub use scan::{find_client, ScanOutcome};

/// Short server id naming one peer inside another peer's registry.
///
/// Valid ids are `1..=65534`; 0 and 65535 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShortId(u16);

impl ShortId {
    pub const MIN: ShortId = ShortId(1);
    pub const MAX: ShortId = ShortId(65534);

    pub fn new(raw: i64) -> Option<Self> {
        let v = u16::try_from(raw).ok()?;
        (Self::MIN.0..=Self::MAX.0).contains(&v).then_some(ShortId(v))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Next id after `self`, `None` once the range is exhausted.
    pub fn next(self) -> Option<Self> {
        Self::new(i64::from(self.0) + 1)
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
