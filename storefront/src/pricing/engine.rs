//! Fee, discount and total computation
//!
//! All money math goes through `rust_decimal` and is rounded to 2
//! decimal places with midpoint-away-from-zero before leaving this
//! module. Inputs and outputs stay `f64` to match the data model.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::CartLine;

/// Flat shipping fee for zones not in the table
const DEFAULT_SHIPPING_FEE: f64 = 50.0;

/// Delivery zone fee table
const ZONE_FEES: &[(&str, f64)] = &[
    ("Poblacion", 20.0),
    ("San Isidro", 30.0),
    ("San Roque", 30.0),
    ("Santa Cruz", 30.0),
    ("Del Pilar", 40.0),
    ("Bagong Silang", 40.0),
];

/// Price breakdown for a checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_fee: f64,
    pub total: f64,
}

/// Convert to Decimal for precise calculation
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round to 2 decimal places, away from zero at the midpoint
fn round2(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Effective unit price of a line, including option modifiers
fn effective_unit_price(line: &CartLine) -> Decimal {
    let mut price = to_decimal(line.unit_price);
    if let Some(options) = &line.options {
        for option in options {
            if let Some(modifier) = option.price_modifier {
                price += to_decimal(modifier);
            }
        }
    }
    price
}

/// Sum of line totals, rounded to 2 decimal places
pub fn subtotal(lines: &[CartLine]) -> f64 {
    let sum: Decimal = lines
        .iter()
        .map(|line| effective_unit_price(line) * Decimal::from(line.quantity))
        .sum();
    round2(sum)
}

/// Flat fee for a delivery zone; unknown or blank zones get the default
pub fn shipping_fee(zone: &str) -> f64 {
    let zone = zone.trim();
    ZONE_FEES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))
        .map(|(_, fee)| *fee)
        .unwrap_or(DEFAULT_SHIPPING_FEE)
}

/// Discount amount for a coupon code against a subtotal
///
/// Codes are matched after trimming and uppercasing. Unknown codes
/// discount nothing; fixed-amount codes never exceed the subtotal.
pub fn discount(coupon_code: Option<&str>, subtotal: f64) -> f64 {
    let Some(code) = coupon_code else {
        return 0.0;
    };

    let subtotal = to_decimal(subtotal);
    let amount = match code.trim().to_uppercase().as_str() {
        "SAVE10" => subtotal * Decimal::new(10, 2),
        "SAVE20" => subtotal * Decimal::new(20, 2),
        "LESS50" => Decimal::from(50).min(subtotal),
        _ => Decimal::ZERO,
    };
    round2(amount)
}

/// Full price breakdown: subtotal, coupon discount, zone fee, total.
/// The discounted subtotal floors at zero before the fee is added.
pub fn quote(lines: &[CartLine], zone: &str, coupon_code: Option<&str>) -> Quote {
    let subtotal = subtotal(lines);
    let discount = discount(coupon_code, subtotal);
    let shipping_fee = shipping_fee(zone);

    let discounted = (to_decimal(subtotal) - to_decimal(discount)).max(Decimal::ZERO);
    let total = round2(discounted + to_decimal(shipping_fee));

    Quote {
        subtotal,
        discount,
        shipping_fee,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::LineOption;

    fn line(product_id: &str, unit_price: f64, quantity: i64) -> CartLine {
        let mut line = CartLine::new(product_id, product_id, unit_price);
        line.quantity = quantity;
        line
    }

    #[test]
    fn test_zone_fees() {
        assert_eq!(shipping_fee("Poblacion"), 20.0);
        assert_eq!(shipping_fee("San Isidro"), 30.0);
        assert_eq!(shipping_fee("San Roque"), 30.0);
        assert_eq!(shipping_fee("Santa Cruz"), 30.0);
        assert_eq!(shipping_fee("Del Pilar"), 40.0);
        assert_eq!(shipping_fee("Bagong Silang"), 40.0);
        assert_eq!(shipping_fee("Somewhere Else"), 50.0);
        assert_eq!(shipping_fee(""), 50.0);
        assert_eq!(shipping_fee("  poblacion  "), 20.0);
    }

    #[test]
    fn test_coupon_codes() {
        assert_eq!(discount(Some("SAVE10"), 200.0), 20.0);
        assert_eq!(discount(Some("SAVE20"), 200.0), 40.0);
        assert_eq!(discount(Some("LESS50"), 200.0), 50.0);
        assert_eq!(discount(Some(" save10 "), 200.0), 20.0);
        assert_eq!(discount(Some("BOGUS"), 200.0), 0.0);
        assert_eq!(discount(None, 200.0), 0.0);
    }

    #[test]
    fn test_fixed_coupon_caps_at_subtotal() {
        assert_eq!(discount(Some("LESS50"), 30.0), 30.0);
        assert_eq!(discount(Some("LESS50"), 50.0), 50.0);
    }

    #[test]
    fn test_subtotal_includes_option_modifiers() {
        let mut l = line("p1", 100.0, 2);
        l.options = Some(vec![
            LineOption {
                name: "Size".into(),
                value: "Large".into(),
                price_modifier: Some(15.0),
            },
            LineOption {
                name: "Gift wrap".into(),
                value: "Yes".into(),
                price_modifier: None,
            },
        ]);
        assert_eq!(subtotal(&[l]), 230.0);
    }

    #[test]
    fn test_quote_breakdown() {
        let lines = vec![line("p1", 100.0, 2)];

        let q = quote(&lines, "Poblacion", Some("SAVE10"));
        assert_eq!(q.subtotal, 200.0);
        assert_eq!(q.discount, 20.0);
        assert_eq!(q.shipping_fee, 20.0);
        assert_eq!(q.total, 200.0);

        let q = quote(&lines, "Poblacion", Some("LESS50"));
        assert_eq!(q.total, 170.0);
    }

    #[test]
    fn test_total_floors_at_fee() {
        // Discount equals subtotal; only the fee remains
        let lines = vec![line("p1", 40.0, 1)];
        let q = quote(&lines, "Poblacion", Some("LESS50"));
        assert_eq!(q.discount, 40.0);
        assert_eq!(q.total, 20.0);
    }

    #[test]
    fn test_rounding_is_two_decimal_places() {
        // 3 x 33.335 = 100.005 -> 100.01 away from zero
        let lines = vec![line("p1", 33.335, 3)];
        assert_eq!(subtotal(&lines), 100.01);
    }
}
