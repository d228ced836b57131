//! Gateway error types

use alloy_primitives::U256;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] fhevm_core::Error),

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Unknown handle: {0:#x}")]
    UnknownHandle(U256),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::FORBIDDEN,
            GatewayError::UnknownHandle(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GatewayError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::Unauthorized("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(GatewayError::UnknownHandle(U256::from(1u8)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            GatewayError::InvalidInput(fhevm_core::Error::InvalidCiphertext("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unknown_handle_message_is_hex() {
        let err = GatewayError::UnknownHandle(U256::from(255u32));
        assert!(err.to_string().ends_with("ff"));
    }
}
