//! Boundary error type: what the renderer actually sees.
//!
//! Internal errors carry rich context for logs; the renderer only needs a
//! stable machine-readable code plus a human-readable message. The mapping
//! here is deliberately lossy — engine internals never leak across the
//! boundary.

use electrostock_core::CoreError;
use electrostock_db::DbError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error codes the renderer switches on for localized messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request malformed: unknown method or args that do not deserialize.
    BadRequest,
    /// Input failed validation before any write.
    Validation,
    /// The referenced entity does not exist.
    NotFound,
    /// A unique field (username, barcode, category name) already exists.
    Duplicate,
    /// The operation would break a reference (e.g. deleting a sold product).
    Conflict,
    /// Guarded stock decrement found fewer units than requested.
    InsufficientStock,
    /// Payment above the outstanding balance it settles.
    PaymentExceedsBalance,
    /// Anything unexpected; details stay in the logs.
    Internal,
}

/// Serializable boundary error.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::PaymentExceedsBalance { .. } => ErrorCode::PaymentExceedsBalance,
            CoreError::EmptySale
            | CoreError::TotalMismatch { .. }
            | CoreError::PaidExceedsTotal { .. }
            | CoreError::Validation(_) => ErrorCode::Validation,
        };
        Self::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),
            DbError::NotFound { .. } => Self::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } => Self::new(ErrorCode::Duplicate, err.to_string()),
            DbError::ForeignKeyViolation { .. } => Self::new(ErrorCode::Conflict, err.to_string()),
            // connection, schema, query, pool, hashing: none of it is the
            // renderer's business
            _ => Self::new(ErrorCode::Internal, "Internal error"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_code() {
        let err: ApiError = DbError::Domain(CoreError::InsufficientStock {
            product_id: 1,
            available: 0,
            requested: 2,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("Insufficient stock"));
    }

    #[test]
    fn test_internal_details_do_not_leak() {
        let err: ApiError = DbError::QueryFailed("near SELECT: syntax error".into()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "Internal error");
    }

    #[test]
    fn test_code_serializes_screaming_snake() {
        let json = serde_json::to_value(ApiError::new(ErrorCode::NotFound, "x")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
    }
}
