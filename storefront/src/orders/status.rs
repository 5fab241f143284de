//! Order status normalization
//!
//! Backends and older order rows carry free-text status values. Display
//! and transition logic only ever sees the normalized [`OrderStatus`].

use shared::models::OrderStatus;

/// Map raw backend status text onto the canonical lifecycle.
///
/// Matching is exact after trimming and lowercasing. Anything
/// unrecognized, including blank text, is treated as not yet shipped.
pub fn normalize_status(raw: &str) -> OrderStatus {
    match raw.trim().to_lowercase().as_str() {
        "cancelled" | "canceled" => OrderStatus::Cancelled,
        "completed" => OrderStatus::Completed,
        "ship" | "shipped" | "delivering" | "out for delivery" => OrderStatus::OutForDelivery,
        _ => OrderStatus::ToShip,
    }
}
