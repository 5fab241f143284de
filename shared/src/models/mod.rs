//! Data models
//!
//! Shared between the service layer and frontends. Monetary amounts are
//! `f64` in serialized form; all arithmetic on them happens through the
//! pricing engine's decimal helpers.

pub mod cart;
pub mod order;
pub mod profile;
pub mod review;

// Re-exports
pub use cart::*;
pub use order::*;
pub use profile::*;
pub use review::*;
