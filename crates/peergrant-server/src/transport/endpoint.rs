//! The `ac` resource: inbound authorization requests in, response codes out.

use peergrant_core::error::{PeerGrantError, ResponseCode};
use peergrant_core::request::AuthRequest;
use peergrant_core::response::AuthResponse;

use crate::app_state::AppState;

use super::codec::{self, HostTarget, InboundRequest, MessageType, Method};

/// What goes back onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub code: ResponseCode,
    pub payload: Option<String>,
}

impl OutboundResponse {
    pub fn new(code: ResponseCode, payload: Option<String>) -> Self {
        Self { code, payload }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ResponseCode::BadRequest, Some(msg.into()))
    }
}

impl From<&AuthResponse> for OutboundResponse {
    fn from(resp: &AuthResponse) -> Self {
        let payload = if resp.is_success() { None } else { resp.message().map(str::to_string) };
        Self::new(resp.code(), payload)
    }
}

pub struct AuthResource {
    state: AppState,
}

impl AuthResource {
    pub const NAME: &'static str = "ac";
    pub const RESOURCE_TYPE: &'static str = "lwm2m.auth";
    pub const DESCRIPTION: &'static str = "Authorization endpoint";

    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn handle(&self, req: InboundRequest) -> OutboundResponse {
        match req.method {
            Method::Get => {
                OutboundResponse::new(ResponseCode::Content, Some(Self::DESCRIPTION.into()))
            }
            Method::Post => self.handle_post(req).await,
            Method::Put | Method::Delete => {
                OutboundResponse::new(ResponseCode::MethodNotAllowed, None)
            }
        }
    }

    async fn handle_post(&self, req: InboundRequest) -> OutboundResponse {
        tracing::trace!(
            source = %req.source.peer_address(),
            query = ?req.uri_query,
            "POST received"
        );

        if req.message_type != MessageType::Confirmable {
            return OutboundResponse::bad_request("CON CoAP type expected");
        }

        let decoded = match codec::decode(&req) {
            Ok(d) => d,
            Err(e) => {
                self.state.metrics().decode_errors.inc(&[]);
                tracing::debug!(
                    source = %req.source.peer_address(),
                    error = %e,
                    "invalid authorization request"
                );
                return OutboundResponse::bad_request(e.to_string());
            }
        };

        let host_endpoint = match decoded.host {
            HostTarget::Endpoint(name) => name,
            HostTarget::Address(addr) => match self.state.directory().by_address(&addr) {
                Some(reg) => reg.endpoint().to_string(),
                None => {
                    return OutboundResponse::bad_request(format!(
                        "no device registered at {addr}"
                    ))
                }
            },
        };

        let request = match AuthRequest::new(
            req.source,
            host_endpoint,
            decoded.grants,
            decoded.credentials_requested,
        ) {
            Ok(r) => r,
            Err(e) => return Self::reject(e),
        };

        let resp = self.state.handler().auth(&request).await;
        OutboundResponse::from(&resp)
    }

    fn reject(e: PeerGrantError) -> OutboundResponse {
        OutboundResponse::from(&AuthResponse::from_error(&e))
    }
}
