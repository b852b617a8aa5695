//! Error type shared by the store and the HTTP layer.
//!
//! | Error | HTTP Status | `error` kind |
//! |-------|-------------|--------------|
//! | InvalidInput | 400 | `invalid_input` |
//! | NotFound | 404 | `not_found` |
//! | UserNotFound | 404 | `user_not_found` |
//! | RouteNotFound | 404 | `not_found` |
//! | MethodNotAllowed | 405 | `method_not_allowed` |
//! | Timeout | 408 | `timeout` |
//! | Internal | 500 | `internal` |
//!
//! Every response body has the shape `{"error": kind, "message": text}`.

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Which collection a lookup missed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    User,
    Todo,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::User => write!(f, "user"),
            Entity::Todo => write!(f, "todo"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed, missing, or empty request data.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// No record with the requested id.
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: u64 },

    /// A todo referenced a user that does not exist.
    #[error("user {user_id} referenced by todo does not exist")]
    UserNotFound { user_id: u64 },

    #[error("no route for {path}")]
    RouteNotFound { path: String },

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("request timed out")]
    Timeout,

    /// The storage backend or a middleware failed.
    #[error("internal error: {message}")]
    Internal { message: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn missing_user(id: u64) -> Self {
        Self::NotFound {
            entity: Entity::User,
            id,
        }
    }

    pub fn missing_todo(id: u64) -> Self {
        Self::NotFound {
            entity: Entity::Todo,
            id,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Machine-readable kind reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput { .. } => "invalid_input",
            Error::NotFound { .. } | Error::RouteNotFound { .. } => "not_found",
            Error::UserNotFound { .. } => "user_not_found",
            Error::MethodNotAllowed { .. } => "method_not_allowed",
            Error::Timeout => "timeout",
            Error::Internal { .. } => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } | Error::UserNotFound { .. } | Error::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Error::Timeout => StatusCode::REQUEST_TIMEOUT,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind(), status = status.as_u16(), error = %self, "request failed");
        } else {
            warn!(kind = self.kind(), status = status.as_u16(), error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}
