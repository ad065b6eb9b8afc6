//! Shared error type across peergrant crates.

use std::fmt;

use thiserror::Error;

/// CoAP response codes seen on the authorization interface and on downlink
/// responses from devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// 2.01
    Created,
    /// 2.02
    Deleted,
    /// 2.04
    Changed,
    /// 2.05
    Content,
    /// 4.00
    BadRequest,
    /// 4.01
    Unauthorized,
    /// 4.03
    Forbidden,
    /// 4.04
    NotFound,
    /// 4.05
    MethodNotAllowed,
    /// 4.12
    PreconditionFailed,
    /// 5.00
    InternalServerError,
}

impl ResponseCode {
    /// Code class (2, 4 or 5).
    pub fn class(self) -> u8 {
        match self {
            ResponseCode::Created
            | ResponseCode::Deleted
            | ResponseCode::Changed
            | ResponseCode::Content => 2,
            ResponseCode::InternalServerError => 5,
            _ => 4,
        }
    }

    /// Code detail (the `xx` in `c.xx`).
    pub fn detail(self) -> u8 {
        match self {
            ResponseCode::Created => 1,
            ResponseCode::Deleted => 2,
            ResponseCode::Changed => 4,
            ResponseCode::Content => 5,
            ResponseCode::BadRequest => 0,
            ResponseCode::Unauthorized => 1,
            ResponseCode::Forbidden => 3,
            ResponseCode::NotFound => 4,
            ResponseCode::MethodNotAllowed => 5,
            ResponseCode::PreconditionFailed => 12,
            ResponseCode::InternalServerError => 0,
        }
    }

    /// Single-byte wire form (`class << 5 | detail`).
    pub fn to_u8(self) -> u8 {
        (self.class() << 5) | self.detail()
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        const ALL: [ResponseCode; 11] = [
            ResponseCode::Created,
            ResponseCode::Deleted,
            ResponseCode::Changed,
            ResponseCode::Content,
            ResponseCode::BadRequest,
            ResponseCode::Unauthorized,
            ResponseCode::Forbidden,
            ResponseCode::NotFound,
            ResponseCode::MethodNotAllowed,
            ResponseCode::PreconditionFailed,
            ResponseCode::InternalServerError,
        ];
        ALL.into_iter().find(|c| c.to_u8() == raw)
    }

    pub fn is_success(self) -> bool {
        self.class() == 2
    }

    /// Stable name used in logs, metrics labels and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCode::Created => "CREATED",
            ResponseCode::Deleted => "DELETED",
            ResponseCode::Changed => "CHANGED",
            ResponseCode::Content => "CONTENT",
            ResponseCode::BadRequest => "BAD_REQUEST",
            ResponseCode::Unauthorized => "UNAUTHORIZED",
            ResponseCode::Forbidden => "FORBIDDEN",
            ResponseCode::NotFound => "NOT_FOUND",
            ResponseCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ResponseCode::PreconditionFailed => "PRECONDITION_FAILED",
            ResponseCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02} {}", self.class(), self.detail(), self.as_str())
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PeerGrantError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PeerGrantError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),
    #[error("remote call timed out: {0}")]
    Timeout(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("device answered {op} with {code}")]
    UnexpectedResponse { op: &'static str, code: ResponseCode },
    #[error("internal: {0}")]
    Internal(String),
}

impl PeerGrantError {
    /// Map an error to the code reported to the requesting device.
    ///
    /// Every remote failure is reported as forbidden: the requester learns
    /// that access was not granted, never why a third device misbehaved.
    pub fn response_code(&self) -> ResponseCode {
        match self {
            PeerGrantError::BadRequest(_) => ResponseCode::BadRequest,
            PeerGrantError::Forbidden(_)
            | PeerGrantError::Timeout(_)
            | PeerGrantError::Transport(_)
            | PeerGrantError::UnexpectedResponse { .. } => ResponseCode::Forbidden,
            PeerGrantError::PreconditionFailed(_) => ResponseCode::PreconditionFailed,
            PeerGrantError::Internal(_) => ResponseCode::InternalServerError,
        }
    }

    /// True for failures that happened while talking to a device.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            PeerGrantError::Timeout(_)
                | PeerGrantError::Transport(_)
                | PeerGrantError::UnexpectedResponse { .. }
        )
    }
}
