//! Gateway error types

use thiserror::Error;

/// Flashcard service failure with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::AuthExpired, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::NotFound, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Server, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidResponse, message)
    }

    /// The linked credential no longer works; the user has to relink
    pub fn is_auth_expired(&self) -> bool {
        self.kind == GatewayErrorKind::AuthExpired
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Token rejected (401, 403)
    AuthExpired,
    /// Unknown set, class or user (404)
    NotFound,
    /// Timeouts, connection failures
    Network,
    /// Any other non-success status
    Server,
    /// Body did not match the expected shape
    InvalidResponse,
}
