//! Pricing
//!
//! Pure computation over cart lines: shipping fees by zone, coupon
//! discounts, and checkout totals. No I/O.

pub mod engine;

pub use engine::{discount, quote, shipping_fee, subtotal, Quote};
