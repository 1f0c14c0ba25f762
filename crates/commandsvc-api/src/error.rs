//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use commandsvc_core::error::{ArchiveError, CommandError};
use serde::Serialize;
use thiserror::Error;

/// Startup errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The archive could not be opened or prepared.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// The metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// Errors produced while handling one request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body is empty, oversized, or not a command request.
    #[error("{0}")]
    Decode(String),

    /// The request is missing a field every command needs.
    #[error("{0}")]
    Validation(String),

    /// The command service failed.
    #[error(transparent)]
    Service(#[from] CommandError),

    /// The call did not run to completion.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Maps the error to its response status. Anything not listed is a 500.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Validation(_) | Self::Service(CommandError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a short, stable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Validation(_) => "validation",
            Self::Service(err) => err.kind(),
            Self::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
