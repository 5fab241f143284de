//! Review Model

use serde::{Deserialize, Serialize};

/// Customer feedback tied to a completed order's product
///
/// At most one current review exists per `(user_id, product_id)`;
/// resubmission updates the existing row (latest write wins).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Snowflake-style id generated client-side
    pub id: i64,
    pub product_id: String,
    pub user_id: String,
    /// 1..=5 inclusive
    pub rating: u8,
    pub comment: String,
    pub created_at: i64,
}
