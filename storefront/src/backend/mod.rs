//! Persistence backend
//!
//! The storefront treats persistence and auth as one opaque collaborator
//! reached through [`PersistenceBackend`]. Server-side rows (orders,
//! profiles, reviews) are owned by that collaborator; this crate never
//! models its concurrency control.
//!
//! Capability negotiation for order placement: the atomic
//! [`place_order`](PersistenceBackend::place_order) remote procedure is
//! the preferred path. A backend without it returns
//! [`BackendError::Unsupported`], which routes the caller to the primary
//! insert schema; a structural [`BackendError::SchemaRejected`] on that
//! insert allows exactly one attempt with the reduced fallback schema.

pub mod memory;

pub use memory::MemoryBackend;

use async_trait::async_trait;
use shared::models::{
    Order, OrderInsert, OrderInsertMinimal, OrderRef, OrderRpcPayload, Review, ShippingProfile,
};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Backend error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend does not provide this capability (not a failure of the
    /// request itself)
    #[error("Capability not supported: {0}")]
    Unsupported(&'static str),

    /// The write was structurally rejected (unknown column, constraint
    /// violation)
    #[error("Schema rejected: {0}")]
    SchemaRejected(String),

    /// Transport-level failure; unknown whether the operation reached the
    /// backend
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Backend error: {0}")]
    Internal(String),
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unsupported(cap) => {
                AppError::with_message(ErrorCode::PersistenceError, format!("{cap} not supported"))
            }
            BackendError::SchemaRejected(msg) => {
                AppError::with_message(ErrorCode::SchemaRejected, msg)
            }
            BackendError::Unavailable(msg) => AppError::network(msg),
            BackendError::NotFound(what) => AppError::not_found(what),
            BackendError::Unauthorized => AppError::not_authenticated(),
            BackendError::Internal(msg) => AppError::persistence(msg),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque persistence/auth collaborator
///
/// Read operations are idempotent and safe to retry unconditionally;
/// write operations are not auto-retried because of double-submission
/// risk.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    // ==================== Orders ====================

    /// Atomic place-order remote procedure (preferred path)
    async fn place_order(&self, payload: OrderRpcPayload) -> BackendResult<OrderRef>;

    /// Primary insert with the full price breakdown
    async fn insert_order(&self, order: OrderInsert) -> BackendResult<OrderRef>;

    /// Reduced fallback insert
    async fn insert_order_minimal(&self, order: OrderInsertMinimal) -> BackendResult<OrderRef>;

    /// All orders for a user, newest first
    async fn fetch_orders(&self, user_id: &str) -> BackendResult<Vec<Order>>;

    async fn fetch_order(&self, order_id: &str) -> BackendResult<Order>;

    /// Overwrite the raw status text of an order
    async fn update_order_status(&self, order_id: &str, status: &str) -> BackendResult<()>;

    // ==================== Profiles ====================

    async fn upsert_profile(&self, user_id: &str, profile: &ShippingProfile) -> BackendResult<()>;

    async fn fetch_profile(&self, user_id: &str) -> BackendResult<Option<ShippingProfile>>;

    // ==================== Reviews ====================

    /// All reviews by a user limited to the given product ids
    async fn fetch_reviews(
        &self,
        user_id: &str,
        product_ids: &[String],
    ) -> BackendResult<Vec<Review>>;

    /// Review by this user for this product, if any
    async fn find_review(&self, user_id: &str, product_id: &str) -> BackendResult<Option<Review>>;

    async fn insert_review(&self, review: Review) -> BackendResult<()>;

    /// Overwrite rating/comment/timestamp of an existing review row
    async fn update_review(&self, review: Review) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mapping() {
        let err: AppError = BackendError::Unavailable("connection refused".into()).into();
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert!(err.is_retryable());

        let err: AppError = BackendError::SchemaRejected("unknown column".into()).into();
        assert_eq!(err.code, ErrorCode::SchemaRejected);
        assert!(!err.is_retryable());

        let err: AppError = BackendError::Unauthorized.into();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);

        let err: AppError = BackendError::Unsupported("place_order rpc").into();
        assert_eq!(err.code, ErrorCode::PersistenceError);
    }
}
