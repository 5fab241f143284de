//! Unified error codes for the storefront
//!
//! Error codes are shared between the service layer and any frontend and
//! are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Review errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Session has expired
    SessionExpired = 1005,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order cannot be cancelled in its current status
    OrderNotCancellable = 4002,
    /// Cart is empty, nothing to order
    OrderEmpty = 4003,
    /// Another order placement is already in flight
    OrderInFlight = 4004,

    // ==================== 5xxx: Review ====================
    /// Rating must be between 1 and 5
    RatingOutOfRange = 5001,
    /// Review comment is empty
    CommentEmpty = 5002,
    /// Order is not eligible for review
    ReviewNotEligible = 5003,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Persistence backend rejected the write
    PersistenceError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Backend rejected the submitted schema
    SchemaRejected = 9006,
    /// Local storage error
    StorageError = 9007,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::SessionExpired => "Session has expired",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",
            ErrorCode::OrderEmpty => "Cart is empty",
            ErrorCode::OrderInFlight => "An order placement is already in progress",

            // Review
            ErrorCode::RatingOutOfRange => "Rating must be between 1 and 5",
            ErrorCode::CommentEmpty => "Review comment must not be empty",
            ErrorCode::ReviewNotEligible => "Order is not eligible for review",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::PersistenceError => "Persistence backend rejected the operation",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SchemaRejected => "Backend rejected the submitted schema",
            ErrorCode::StorageError => "Local storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1005 => Ok(ErrorCode::SessionExpired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderNotCancellable),
            4003 => Ok(ErrorCode::OrderEmpty),
            4004 => Ok(ErrorCode::OrderInFlight),

            // Review
            5001 => Ok(ErrorCode::RatingOutOfRange),
            5002 => Ok(ErrorCode::CommentEmpty),
            5003 => Ok(ErrorCode::ReviewNotEligible),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::PersistenceError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::SchemaRejected),
            9007 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderNotCancellable.code(), 4002);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4003);
        assert_eq!(ErrorCode::RatingOutOfRange.code(), 5001);
        assert_eq!(ErrorCode::CommentEmpty.code(), 5002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::PersistenceError.code(), 9002);
        assert_eq!(ErrorCode::TimeoutError.code(), 9004);
        assert_eq!(ErrorCode::SchemaRejected.code(), 9006);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::OrderNotFound.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::OrderNotFound));
        assert_eq!(ErrorCode::try_from(9004), Ok(ErrorCode::TimeoutError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::OrderNotCancellable);

        let result: Result<ErrorCode, _> = serde_json::from_str("1234");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::OrderNotFound.message(), "Order not found");
        assert_eq!(
            ErrorCode::RatingOutOfRange.message(),
            "Rating must be between 1 and 5"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::OrderNotFound), "4001");
    }
}
