use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{auth::GateRejection, models::ErrorBody};

/// StorageError
///
/// Failures of the durable key-value store that holds the session record.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be mapped onto the backing store (empty, path-like, ...).
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// I/O failure while reading, writing or removing a record.
    #[error("I/O error on key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The store refused the operation (used by the in-memory store in failing mode).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// DirectoryError
///
/// Failures of the account directory. The demo directory never produces one;
/// a networked directory would map transport errors here.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("account directory unavailable: {0}")]
    Unavailable(String),
}

/// SessionError
///
/// Everything that can go wrong inside a session-mutating operation. When one of
/// these is returned the in-memory session has not been touched.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to persist session: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to encode session record: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Returned by `Role::from_str` for anything that is not a wire role name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct ParseRoleError(pub String);

/// ApiError
///
/// The HTTP-facing error of the shell handlers. Every variant maps onto a
/// status code and an `ErrorBody` payload.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Gate(#[from] GateRejection),

    /// Login resolved to `false`. Never says which part failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Another session-mutating operation is still pending.
    #[error("another session operation is in progress")]
    Busy,

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gate(rejection) => rejection.into_response(),
            ApiError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new(
                    "authentication_failed",
                    "Authentication failed. Please check your credentials.",
                )),
            )
                .into_response(),
            ApiError::Busy => (
                StatusCode::CONFLICT,
                Json(ErrorBody::new(
                    "operation_in_progress",
                    "Another session operation is still in progress.",
                )),
            )
                .into_response(),
            ApiError::UserNotFound(id) => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody::new("user_not_found", format!("No user with id {id}."))),
            )
                .into_response(),
            ApiError::Session(e) => {
                tracing::error!(error = %e, "session operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(
                        "session_error",
                        "The session could not be updated.",
                    )),
                )
                    .into_response()
            }
        }
    }
}
