//! Shared types for the storefront cart-to-order pipeline
//!
//! This crate holds everything both the service layer and embedding
//! frontends need to agree on:
//!
//! - **Models** (`models`): cart lines, shipping profile, orders, reviews,
//!   and the canonical order status enum
//! - **Errors** (`error`): unified error codes, categories, and the
//!   [`AppError`] type returned by every service operation

pub mod error;
pub mod models;
pub mod util;

// Re-export public types
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
