//! Orders
//!
//! Order placement with capability negotiation against the backend,
//! cancellation guarded by normalized status, and reads under the
//! timeout+retry policy.

pub mod retry;
pub mod service;
pub mod status;

pub use retry::retry_read;
pub use service::OrderService;
pub use status::normalize_status;
