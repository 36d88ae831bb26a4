//! # API Error Type
//!
//! Unified error body printed by every command.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Source                                   Body                    Code  │
//! │  ──────                                   ────                    ────  │
//! │  CoreError::ProductNotFound           ─►  Resource Not Found      404   │
//! │  DbError::NotFound                    ─►  Resource Not Found      404   │
//! │  CoreError::InvalidOrder              ─►  Invalid Order           409   │
//! │  DbError::StaleStock / Busy           ─►  Conflict                409   │
//! │  DbError::UniqueViolation             ─►  Conflict                409   │
//! │  CoreError::InvalidEntityState        ─►  Validation Error        422   │
//! │  CoreError::InvalidRequest            ─►  Validation Error        422   │
//! │  malformed request JSON / unreadable  ─►  Bad Request             400   │
//! │  unknown export format / no layout    ─►  Bad Request             400   │
//! │  anything else                        ─►  Internal Server Error   500   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal errors are logged with `tracing::error!` and the body carries a
//! generic message only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use herostore_core::{CoreError, ExportError, FieldViolation, ValidationError};
use herostore_db::{DbError, ServiceError};

use crate::config::ConfigError;
use crate::dto::{FieldErrorDto, InvalidLineDto};

/// Error body returned when a command fails.
///
/// ## Serialization
/// ```json
/// {
///   "error": "Invalid Order",
///   "statusCode": 409,
///   "message": "There are invalid product orders",
///   "invalidLines": [{ "id": 1, "name": "Iron Man Cup", "requestedQuantity": 20, "stock": 10 }],
///   "path": "herostore order",
///   "timestamp": "2024-05-04T12:30:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: ErrorKind,

    pub status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_lines: Option<Vec<InvalidLineDto>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_validation_errors: Option<Vec<FieldErrorDto>>,

    pub path: String,

    pub timestamp: DateTime<Utc>,
}

/// Error categories, serialized as their display title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "Bad Request")]
    BadRequest,

    #[serde(rename = "Resource Not Found")]
    NotFound,

    #[serde(rename = "Invalid Order")]
    InvalidOrder,

    #[serde(rename = "Conflict")]
    Conflict,

    #[serde(rename = "Validation Error")]
    Validation,

    #[serde(rename = "Internal Server Error")]
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::InvalidOrder | ErrorKind::Conflict => 409,
            ErrorKind::Validation => 422,
            ErrorKind::Internal => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error with a message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            error: kind,
            status_code: kind.status_code(),
            message: Some(message.into()),
            invalid_lines: None,
            field_validation_errors: None,
            path: String::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorKind::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(ErrorKind::BadRequest, message)
    }

    /// Creates a validation error listing every rejected field.
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        ApiError {
            message: None,
            field_validation_errors: Some(violations.into_iter().map(FieldErrorDto::from).collect()),
            ..ApiError::new(ErrorKind::Validation, "")
        }
    }

    /// Creates an internal error. The cause is logged, never returned.
    pub fn internal(cause: impl fmt::Display) -> Self {
        error!(error = %cause, "Command failed");
        ApiError::new(ErrorKind::Internal, "An unexpected error occurred")
    }

    /// Sets the command path the error is reported for.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::not_found(err.to_string()),
            CoreError::InvalidOrder(lines) => ApiError {
                invalid_lines: Some(lines.into_iter().map(InvalidLineDto::from).collect()),
                ..ApiError::new(ErrorKind::InvalidOrder, "There are invalid product orders")
            },
            CoreError::InsufficientStock { .. } => ApiError::new(ErrorKind::InvalidOrder, err.to_string()),
            CoreError::InvalidEntityState { violations, .. } | CoreError::InvalidRequest(violations) => {
                ApiError::validation(violations)
            }
            CoreError::Validation(e) => ApiError::from(e),
            CoreError::AmountOverflow { .. } => ApiError::internal(err),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(vec![FieldViolation::new(&err, serde_json::Value::Null)])
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DbError::StaleStock { .. } => ApiError::new(
                ErrorKind::Conflict,
                "Stock changed while the order was being registered; please retry",
            ),
            DbError::Busy(_) => ApiError::new(
                ErrorKind::Conflict,
                "The store is busy with another registration; please retry",
            ),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorKind::Conflict, err.to_string()),
            other => ApiError::internal(other),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(e) => e.into(),
            ServiceError::Db(e) => e.into(),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnsupportedFormat(_) | ExportError::NotAvailable { .. } => {
                ApiError::bad_request(err.to_string())
            }
            ExportError::Csv(_) | ExportError::Render(_) => ApiError::internal(err),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status_code, self.message.as_deref().unwrap_or("validation failed"))
    }
}

impl std::error::Error for ApiError {}
