//! JSON response envelope and HTTP error mapping.
//!
//! Every body is an object with a `message`. Successes add
//! `status: "success"` and `data`; failures add a stable `error` detail that
//! never carries raw store errors.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::storage::{DatabaseError, StoreError};

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub message: &'static str,
    pub data: T,
}

/// A success envelope paired with its status code.
pub struct Success<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> Success<T> {
    pub const fn ok(message: &'static str, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub const fn created(message: &'static str, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, data)
    }

    const fn with_status(status: StatusCode, message: &'static str, data: T) -> Self {
        Self {
            status,
            body: Envelope {
                status: "success",
                message,
                data,
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Success<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Failure response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: ErrorDetail,
}

/// Stable description of what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorDetail {
    const fn new(code: ErrorCode) -> Self {
        Self {
            code,
            field: None,
            fields: Vec::new(),
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Conflict,
    Storage,
    Internal,
    NotFound,
}

/// Errors a handler can end with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required fields absent or a field malformed.
    #[error("{message}")]
    Validation {
        message: &'static str,
        fields: Vec<String>,
    },

    /// A unique field is already taken.
    #[error("{field} already exists")]
    Conflict { field: String },

    /// The store failed; `message` is what the caller sees.
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: DatabaseError,
    },

    /// Anything that escaped handler logic.
    #[error("Internal Server Error: {0}")]
    Unhandled(String),

    #[error("Not found")]
    NotFound,
}

impl ApiError {
    pub fn validation(message: &'static str, fields: &[&str]) -> Self {
        Self::Validation {
            message,
            fields: fields.iter().map(ToString::to_string).collect(),
        }
    }

    /// Wrap a store failure, keeping conflicts distinct from storage errors.
    pub fn from_store(message: &'static str, e: StoreError) -> Self {
        match e {
            StoreError::Conflict { field } => Self::Conflict { field },
            StoreError::Failure(source) => Self::Storage { message, source },
        }
    }

    pub const fn storage(message: &'static str, source: DatabaseError) -> Self {
        Self::Storage { message, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::Storage { .. } | Self::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn body(self) -> ErrorBody {
        let message = match &self {
            Self::Validation { message, .. } | Self::Storage { message, .. } => {
                (*message).to_string()
            }
            Self::Conflict { field } => format!("{field} already exists"),
            Self::Unhandled(_) => "Internal Server Error".to_string(),
            Self::NotFound => "Not found".to_string(),
        };
        let error = match self {
            Self::Validation { fields, .. } => ErrorDetail {
                fields,
                ..ErrorDetail::new(ErrorCode::Validation)
            },
            Self::Conflict { field } => ErrorDetail {
                field: Some(field),
                ..ErrorDetail::new(ErrorCode::Conflict)
            },
            Self::Storage { .. } => ErrorDetail::new(ErrorCode::Storage),
            Self::Unhandled(detail) => ErrorDetail {
                detail: Some(detail),
                ..ErrorDetail::new(ErrorCode::Internal)
            },
            Self::NotFound => ErrorDetail::new(ErrorCode::NotFound),
        };

        ErrorBody { message, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Storage { source, .. } => error!(error = %source, "Store operation failed"),
            Self::Unhandled(detail) => error!(%detail, "Unhandled error"),
            Self::Conflict { field } => warn!(%field, "Duplicate value rejected"),
            Self::Validation { message, fields } => warn!(?fields, "{message}"),
            Self::NotFound => {}
        }
        (status, Json(self.body())).into_response()
    }
}
