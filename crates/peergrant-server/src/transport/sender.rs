use std::time::Duration;

use async_trait::async_trait;

use peergrant_core::error::Result;
use peergrant_core::protocol::downlink::{DownlinkRequest, DownlinkResponse};

use crate::directory::Registration;

/// Sends one request to a registered device and waits for its response.
///
/// Implementations own retransmission and must give up on their own after
/// `timeout`, returning `PeerGrantError::Timeout`. Callers never cancel an
/// in-flight send. Must be safe for concurrent use.
#[async_trait]
pub trait RequestSender: Send + Sync {
    async fn send(
        &self,
        target: &Registration,
        request: DownlinkRequest,
        timeout: Duration,
    ) -> Result<DownlinkResponse>;
}
