//! Outcome of one authorization request.

use crate::error::{PeerGrantError, ResponseCode};

/// Result kinds the authorization handler can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResultKind {
    Success,
    BadRequest,
    Forbidden,
    PreconditionFailed,
    InternalError,
}

impl AuthResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthResultKind::Success => "success",
            AuthResultKind::BadRequest => "bad_request",
            AuthResultKind::Forbidden => "forbidden",
            AuthResultKind::PreconditionFailed => "precondition_failed",
            AuthResultKind::InternalError => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    kind: AuthResultKind,
    message: Option<String>,
}

impl AuthResponse {
    pub fn success() -> Self {
        Self { kind: AuthResultKind::Success, message: None }
    }

    pub fn bad_request(message: Option<String>) -> Self {
        Self { kind: AuthResultKind::BadRequest, message }
    }

    pub fn forbidden(message: Option<String>) -> Self {
        Self { kind: AuthResultKind::Forbidden, message }
    }

    pub fn precondition_failed(message: Option<String>) -> Self {
        Self { kind: AuthResultKind::PreconditionFailed, message }
    }

    pub fn internal_server_error(message: Option<String>) -> Self {
        Self { kind: AuthResultKind::InternalError, message }
    }

    /// Rebuild a response from its wire code. Codes outside the handler's
    /// vocabulary yield `None`.
    pub fn from_code(code: ResponseCode, message: Option<String>) -> Option<Self> {
        let kind = match code {
            ResponseCode::Created => AuthResultKind::Success,
            ResponseCode::BadRequest => AuthResultKind::BadRequest,
            ResponseCode::Forbidden => AuthResultKind::Forbidden,
            ResponseCode::PreconditionFailed => AuthResultKind::PreconditionFailed,
            ResponseCode::InternalServerError => AuthResultKind::InternalError,
            _ => return None,
        };
        let message = if kind == AuthResultKind::Success { None } else { message };
        Some(Self { kind, message })
    }

    pub fn from_error(err: &PeerGrantError) -> Self {
        let message = Some(err.to_string());
        match err.response_code() {
            ResponseCode::BadRequest => Self::bad_request(message),
            ResponseCode::PreconditionFailed => Self::precondition_failed(message),
            ResponseCode::InternalServerError => Self::internal_server_error(message),
            _ => Self::forbidden(message),
        }
    }

    pub fn kind(&self) -> AuthResultKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Success is 2.01 Created, kept apart from the 2.04 Changed used by
    /// ordinary write acknowledgements.
    pub fn code(&self) -> ResponseCode {
        match self.kind {
            AuthResultKind::Success => ResponseCode::Created,
            AuthResultKind::BadRequest => ResponseCode::BadRequest,
            AuthResultKind::Forbidden => ResponseCode::Forbidden,
            AuthResultKind::PreconditionFailed => ResponseCode::PreconditionFailed,
            AuthResultKind::InternalError => ResponseCode::InternalServerError,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code() == ResponseCode::Created
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Whether `code` is one this handler may legitimately answer with.
    pub fn is_valid_code(code: ResponseCode) -> bool {
        matches!(
            code,
            ResponseCode::Created
                | ResponseCode::BadRequest
                | ResponseCode::Forbidden
                | ResponseCode::PreconditionFailed
                | ResponseCode::InternalServerError
        )
    }

    pub fn is_valid(&self) -> bool {
        Self::is_valid_code(self.code())
    }
}
