//! Shipping Profile Model

use serde::{Deserialize, Serialize};

/// Shipping details required before an order can be placed
///
/// Also persisted onto the user's profile record after a successful
/// checkout so subsequent checkouts pre-fill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ShippingProfile {
    pub full_name: String,
    pub contact_number: String,
    /// Delivery zone name, used for the shipping fee lookup
    pub zone: String,
    pub street_address: String,
}

impl ShippingProfile {
    /// Return the name of the first blank (empty or whitespace-only)
    /// required field, or `None` when the profile is complete.
    pub fn first_blank_field(&self) -> Option<&'static str> {
        if self.full_name.trim().is_empty() {
            return Some("full_name");
        }
        if self.contact_number.trim().is_empty() {
            return Some("contact_number");
        }
        if self.zone.trim().is_empty() {
            return Some("zone");
        }
        if self.street_address.trim().is_empty() {
            return Some("street_address");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ShippingProfile {
        ShippingProfile {
            full_name: "Maria Santos".into(),
            contact_number: "09171234567".into(),
            zone: "Poblacion".into(),
            street_address: "123 Rizal St".into(),
        }
    }

    #[test]
    fn test_complete_profile_has_no_blank_field() {
        assert_eq!(complete().first_blank_field(), None);
    }

    #[test]
    fn test_blank_fields_reported_in_order() {
        let mut p = complete();
        p.contact_number = "   ".into();
        assert_eq!(p.first_blank_field(), Some("contact_number"));

        p.full_name = String::new();
        assert_eq!(p.first_blank_field(), Some("full_name"));
    }
}
