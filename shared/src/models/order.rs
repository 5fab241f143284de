//! Order Model

use super::cart::CartLine;
use super::profile::ShippingProfile;
use serde::{Deserialize, Serialize};

/// Canonical order lifecycle status
///
/// Backends report status as free text; [`Order::status`] keeps the raw
/// string and the status normalizer maps it onto this enum. All internal
/// logic operates on this enum only, never on raw text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, awaiting fulfillment (includes the initial pending state)
    #[default]
    ToShip,
    /// Handed to the courier
    OutForDelivery,
    /// Delivered and confirmed
    Completed,
    /// Cancelled while still in `ToShip`
    Cancelled,
}

impl OrderStatus {
    /// Human-readable label, also accepted back by the normalizer
    pub const fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::ToShip => "To Ship",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Terminal states accept no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Order entity as read back from the persistence backend
///
/// Invariant: `total = max(0, subtotal - discount) + shipping_fee`, and
/// `total >= 0` always.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub lines: Vec<CartLine>,
    /// Amounts in currency unit
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_fee: f64,
    pub total: f64,
    pub zone: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    /// Snapshot of the shipping details at placement time
    pub shipping_profile: ShippingProfile,
    /// Raw status text as stored by the backend
    pub status: String,
    pub created_at: i64,
}

/// Reference to a freshly placed order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRef {
    pub id: String,
    pub total: f64,
    pub created_at: i64,
}

// ============================================================================
// Submission payloads
// ============================================================================

/// Line item for the atomic place-order remote procedure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRpcItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Payload for the atomic place-order remote procedure (preferred path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRpcPayload {
    pub items: Vec<OrderRpcItem>,
    pub discount: f64,
    pub shipping_fee: f64,
    pub zone: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub shipping_name: String,
    pub shipping_contact: String,
    pub shipping_address: String,
    /// Optional payment reference / proof-of-payment pointer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
}

/// Primary insert schema, including the full price breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInsert {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_fee: f64,
    pub total: f64,
    pub zone: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub shipping_profile: ShippingProfile,
    /// Initial raw status
    pub status: String,
    pub created_at: i64,
}

/// Reduced fallback schema, attempted once when the primary insert is
/// structurally rejected by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderInsertMinimal {
    pub user_id: String,
    pub lines: Vec<CartLine>,
    pub total: f64,
    pub status: String,
    pub created_at: i64,
}

impl OrderInsert {
    /// Reduce to the fallback schema
    pub fn into_minimal(self) -> OrderInsertMinimal {
        OrderInsertMinimal {
            user_id: self.user_id,
            lines: self.lines,
            total: self.total,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_names() {
        assert_eq!(OrderStatus::ToShip.display_name(), "To Ship");
        assert_eq!(OrderStatus::OutForDelivery.display_name(), "Out for Delivery");
        assert_eq!(OrderStatus::Completed.display_name(), "Completed");
        assert_eq!(OrderStatus::Cancelled.display_name(), "Cancelled");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::ToShip.is_terminal());
        assert!(!OrderStatus::OutForDelivery.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");

        let status: OrderStatus = serde_json::from_str("\"TO_SHIP\"").unwrap();
        assert_eq!(status, OrderStatus::ToShip);
    }

    #[test]
    fn test_insert_into_minimal_keeps_total_and_lines() {
        let insert = OrderInsert {
            user_id: "u1".into(),
            lines: vec![CartLine::new("p1", "Item", 100.0)],
            subtotal: 100.0,
            discount: 10.0,
            shipping_fee: 20.0,
            total: 110.0,
            zone: "Poblacion".into(),
            payment_method: "COD".into(),
            coupon_code: Some("SAVE10".into()),
            shipping_profile: ShippingProfile::default(),
            status: "pending".into(),
            created_at: 1,
        };
        let minimal = insert.into_minimal();
        assert_eq!(minimal.total, 110.0);
        assert_eq!(minimal.lines.len(), 1);
        assert_eq!(minimal.status, "pending");
    }
}
