//! Cart Model

use serde::{Deserialize, Serialize};

/// A selected product option on a cart line (size, variant, etc.)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineOption {
    pub name: String,
    pub value: String,
    /// Price in currency unit added by this option
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_modifier: Option<f64>,
}

/// A single line in the client-held cart
///
/// Lines are unique by `product_id`; re-adding an existing product
/// increments `quantity` instead of appending a duplicate line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product reference (String ID)
    pub product_id: String,
    pub name: String,
    /// Unit price in currency unit, captured at add time
    pub unit_price: f64,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<LineOption>>,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
            image_ref: None,
            options: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_new_defaults() {
        let line = CartLine::new("prod-7", "Calamansi Juice", 100.0);
        assert_eq!(line.quantity, 1);
        assert!(line.image_ref.is_none());
        assert!(line.options.is_none());
    }

    #[test]
    fn test_cart_line_serde_skips_empty_optionals() {
        let line = CartLine::new("prod-7", "Calamansi Juice", 100.0);
        let json = serde_json::to_string(&line).unwrap();
        assert!(!json.contains("image_ref"));
        assert!(!json.contains("options"));
    }
}
