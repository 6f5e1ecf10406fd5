//! Error-to-HTTP mapping for the derrick daemon.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derrick::error::Error as CoreError;
use thiserror::Error;

/// Errors surfaced to API clients.
///
/// Core errors collapse into a few client-visible categories: a missing
/// issue, a snapshot the store handed over in a corrupt state, and a store
/// that failed to produce a snapshot at all. The corruption category maps to
/// 502 because the daemon itself is healthy; the upstream data is not. Town
/// observation failures get their own category so a broken town workspace
/// is distinguishable from a broken issue store.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested issue is absent from the current snapshot.
    #[error("{0}")]
    NotFound(String),

    /// The snapshot failed validation (dangling edge, cycle, bad enum
    /// value, duplicate id).
    #[error("{0}")]
    SnapshotInvalid(String),

    /// The store could not produce a snapshot.
    #[error("{0}")]
    Store(String),

    /// The requested rig does not exist in the town.
    #[error("rig not found: {0}")]
    RigNotFound(String),

    /// The town workspace could not be observed.
    #[error("{0}")]
    Town(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::DanglingReference { .. }
            | CoreError::Cycle { .. }
            | CoreError::InvalidStatus { .. }
            | CoreError::InvalidPriority { .. }
            | CoreError::DuplicateId(_) => ApiError::SnapshotInvalid(err.to_string()),
            CoreError::Store(_) | CoreError::Io(_) | CoreError::Json(_) => {
                ApiError::Store(err.to_string())
            }
        }
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "ISSUE_NOT_FOUND",
            ApiError::SnapshotInvalid(_) => "SNAPSHOT_INVALID",
            ApiError::Store(_) => "STORE_ERROR",
            ApiError::RigNotFound(_) => "RIG_NOT_FOUND",
            ApiError::Town(_) => "TOWN_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) | ApiError::RigNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SnapshotInvalid(_) => StatusCode::BAD_GATEWAY,
            ApiError::Store(_) | ApiError::Town(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }

        (
            status,
            Json(serde_json::json!({ "code": code, "error": message })),
        )
            .into_response()
    }
}
