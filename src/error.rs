//! Boundary error type for the message protocol
//!
//! Module-level errors (`ValidationError`, `StoreError`, ...) stay
//! typed inside the crate; what crosses the protocol boundary is this
//! serializable `AppError` with a stable code the calling UI can switch
//! on, a user-facing message, optional internal detail for logging, and
//! a retry hint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error categories for grouping and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Input validation errors
    Validation,
    /// Import payload errors
    Import,
    /// Underlying key-value store failed
    Persistence,
    /// Internal errors (unexpected state, bugs)
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Import => write!(f, "import"),
            Self::Persistence => write!(f, "persistence"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Stable error codes, format: CATEGORY_SPECIFIC_ERROR
pub struct ErrorCode;

impl ErrorCode {
    pub const VALIDATION_INVALID_NAME: &'static str = "VALIDATION_INVALID_NAME";
    pub const IMPORT_MALFORMED: &'static str = "IMPORT_MALFORMED";
    pub const PERSISTENCE_READ_FAILED: &'static str = "PERSISTENCE_READ_FAILED";
    pub const PERSISTENCE_WRITE_FAILED: &'static str = "PERSISTENCE_WRITE_FAILED";
    pub const PERSISTENCE_DECODE_FAILED: &'static str = "PERSISTENCE_DECODE_FAILED";
    pub const INTERNAL_ERROR: &'static str = "INTERNAL_ERROR";
    pub const INTERNAL_CHANNEL_CLOSED: &'static str = "INTERNAL_CHANNEL_CLOSED";
}

/// Protocol-level error payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    /// Stable error code for the calling UI
    pub code: String,
    /// User-friendly message
    pub message: String,
    /// Internal detail for logging, not shown to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Whether the caller may retry the operation
    pub retryable: bool,
    pub category: ErrorCategory,
}

impl AppError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        category: ErrorCategory,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            detail: None,
            retryable: false,
            category,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn invalid_name() -> Self {
        Self::new(
            ErrorCode::VALIDATION_INVALID_NAME,
            "Package name must not be empty",
            ErrorCategory::Validation,
        )
    }

    pub fn malformed_import(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::IMPORT_MALFORMED,
            "Import payload is not a valid favorites export",
            ErrorCategory::Import,
        )
        .with_detail(detail)
    }

    pub fn persistence_read(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PERSISTENCE_READ_FAILED,
            "Reading saved favorites failed",
            ErrorCategory::Persistence,
        )
        .with_detail(detail)
        .retryable()
    }

    pub fn persistence_write(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PERSISTENCE_WRITE_FAILED,
            "Saving favorites failed",
            ErrorCategory::Persistence,
        )
        .with_detail(detail)
        .retryable()
    }

    pub fn persistence_decode(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PERSISTENCE_DECODE_FAILED,
            "Saved favorites are not readable",
            ErrorCategory::Persistence,
        )
        .with_detail(detail)
    }

    pub fn channel_closed() -> Self {
        Self::new(
            ErrorCode::INTERNAL_CHANNEL_CLOSED,
            "The favorites coordinator is not running",
            ErrorCategory::Internal,
        )
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::INTERNAL_ERROR,
            "An internal error occurred",
            ErrorCategory::Internal,
        )
        .with_detail(detail)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<crate::model::ValidationError> for AppError {
    fn from(e: crate::model::ValidationError) -> Self {
        match e {
            crate::model::ValidationError::InvalidName => Self::invalid_name(),
        }
    }
}

impl From<crate::storage::StorageError> for AppError {
    fn from(e: crate::storage::StorageError) -> Self {
        match &e {
            crate::storage::StorageError::Read(detail) => Self::persistence_read(detail),
            crate::storage::StorageError::Write(detail) => Self::persistence_write(detail),
        }
    }
}

impl From<crate::store::StoreError> for AppError {
    fn from(e: crate::store::StoreError) -> Self {
        match e {
            crate::store::StoreError::Validation(inner) => inner.into(),
            crate::store::StoreError::MalformedImport(detail) => Self::malformed_import(detail),
            crate::store::StoreError::Decode { key, detail } => {
                Self::persistence_decode(format!("{key}: {detail}"))
            }
            crate::store::StoreError::Persistence(inner) => inner.into(),
        }
    }
}
