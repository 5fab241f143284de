//! Unified error system for the storefront
//!
//! This module provides the error handling surface every service operation
//! returns through:
//! - [`ErrorCode`]: standardized numeric error codes
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with code, message, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General / validation errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Review errors
//! - 9xxx: System / network / persistence errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::OrderNotFound);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "Shipping zone is required");
//!
//! // Create an error with details
//! let err = AppError::validation("Missing required field")
//!     .with_detail("field", "contact_number");
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
