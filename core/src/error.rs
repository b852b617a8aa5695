//! Errors returned by `ApiClient` parse methods.
//!
//! The server's structured error body decides the variant where it can:
//! 400 is `InvalidInput`, 404 is `UserNotFound` or `NotFound` depending on
//! the reported kind. Anything else lands in `HttpError` with the raw status
//! and body.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: the server rejected the payload or path.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 404: the requested user or todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// 404 on todo creation: the referenced user does not exist.
    #[error("referenced user not found: {0}")]
    UserNotFound(String),

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
