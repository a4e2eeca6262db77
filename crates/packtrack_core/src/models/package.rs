//! Package record models and validation.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of a package record.
///
/// `Pending` is the initial state. The legacy wire spelling `"ordered"` is
/// accepted on input and normalized to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[serde(alias = "ordered")]
    Pending,
    Shipped,
    Received,
}

impl Status {
    /// Stable lowercase name used for display and CSV output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Shipped => "shipped",
            Status::Received => "received",
        }
    }

    /// The two-state toggle: anything not yet received becomes `Received`,
    /// and `Received` flips back to `Pending`.
    pub fn toggled(self) -> Status {
        match self {
            Status::Received => Status::Pending,
            _ => Status::Received,
        }
    }

    /// Next state along the three-state `Pending -> Shipped -> Received` path.
    /// `Received` is terminal for this operation.
    pub fn advanced(self) -> Status {
        match self {
            Status::Pending => Status::Shipped,
            Status::Shipped | Status::Received => Status::Received,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parcel/inventory entry scoped to one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Remote-assigned identifier, or a `local-` placeholder until the
    /// optimistic insert confirms.
    pub id: String,
    pub tracking_number: Option<String>,
    pub item_name: String,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    /// Monetary value per unit; absent means 0 for aggregation.
    pub cost_price: Option<f64>,
    pub quantity: u32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    /// Weak reference to a [`crate::models::Product`]; lookup only.
    pub product_id: Option<String>,
}

impl PackageRecord {
    /// True while the record carries a client-generated placeholder id.
    pub fn is_local(&self) -> bool {
        self.id.starts_with("local-")
    }

    /// Case-insensitive substring match against the searchable fields.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        if needle_lower.is_empty() {
            return true;
        }
        let hit = |field: Option<&str>| {
            field
                .map(|value| value.to_lowercase().contains(needle_lower))
                .unwrap_or(false)
        };
        self.item_name.to_lowercase().contains(needle_lower)
            || hit(self.tracking_number.as_deref())
            || hit(self.recipient.as_deref())
            || hit(self.sender.as_deref())
    }
}

/// Draft payload for creating a package record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPackage {
    pub item_name: String,
    pub tracking_number: Option<String>,
    pub recipient: Option<String>,
    pub sender: Option<String>,
    pub cost_price: Option<f64>,
    pub quantity: Option<u32>,
}

impl NewPackage {
    /// Client-side validation, performed before any remote call is attempted.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for an empty item name, a zero
    /// quantity, or a negative price.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.item_name.trim().is_empty() {
            return Err(AppError::Validation("item name is required".to_string()));
        }
        if self.quantity == Some(0) {
            return Err(AppError::Validation(
                "quantity must be a positive integer".to_string(),
            ));
        }
        if self.cost_price.is_some_and(|price| price < 0.0) {
            return Err(AppError::Validation(
                "cost price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Materialize the draft into an optimistic local record.
    ///
    /// The id is a caller-synthesized placeholder; the remote store replaces
    /// it with the authoritative id on confirmation.
    pub fn into_local_record(self, id: String, created_at: DateTime<Utc>) -> PackageRecord {
        PackageRecord {
            id,
            tracking_number: none_if_blank(self.tracking_number),
            item_name: self.item_name.trim().to_string(),
            recipient: none_if_blank(self.recipient),
            sender: none_if_blank(self.sender),
            cost_price: self.cost_price,
            quantity: self.quantity.unwrap_or(1),
            status: Status::Pending,
            created_at,
            product_id: None,
        }
    }
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn draft(item_name: &str) -> NewPackage {
        NewPackage {
            item_name: item_name.to_string(),
            ..NewPackage::default()
        }
    }

    #[test]
    fn status_toggle_flips_between_pending_and_received() {
        assert_eq!(Status::Pending.toggled(), Status::Received);
        assert_eq!(Status::Received.toggled(), Status::Pending);
        assert_eq!(Status::Shipped.toggled(), Status::Received);
    }

    #[test]
    fn status_advance_walks_the_three_state_path() {
        assert_eq!(Status::Pending.advanced(), Status::Shipped);
        assert_eq!(Status::Shipped.advanced(), Status::Received);
        assert_eq!(Status::Received.advanced(), Status::Received);
    }

    #[test]
    fn status_deserializes_legacy_ordered_spelling() {
        let status: Status = serde_json::from_str("\"ordered\"").expect("parse");
        assert_eq!(status, Status::Pending);
        assert_eq!(serde_json::to_string(&status).expect("encode"), "\"pending\"");
    }

    #[test]
    fn validate_requires_item_name() {
        let err = draft("   ").validate().expect_err("blank name must fail");
        assert!(matches!(err, AppError::Validation(_)));
        assert!(draft("Socks").validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_quantity_and_negative_price() {
        let mut zero_quantity = draft("Socks");
        zero_quantity.quantity = Some(0);
        assert!(zero_quantity.validate().is_err());

        let mut negative_price = draft("Socks");
        negative_price.cost_price = Some(-1.0);
        assert!(negative_price.validate().is_err());
    }

    #[test]
    fn into_local_record_applies_defaults_and_trims_blanks() {
        let mut new_package = draft("  Socks  ");
        new_package.tracking_number = Some("  ".to_string());
        new_package.sender = Some(" Shop ".to_string());

        let record = new_package.into_local_record("local-1-0".to_string(), Utc::now());
        assert_eq!(record.item_name, "Socks");
        assert_eq!(record.tracking_number, None);
        assert_eq!(record.sender.as_deref(), Some("Shop"));
        assert_eq!(record.quantity, 1);
        assert_eq!(record.status, Status::Pending);
        assert!(record.is_local());
    }

    #[test]
    fn matches_search_is_case_insensitive_across_fields() {
        let record = NewPackage {
            item_name: "Red Jacket".to_string(),
            tracking_number: Some("SF123".to_string()),
            recipient: Some("Mia".to_string()),
            sender: Some("Outdoor Shop".to_string()),
            ..NewPackage::default()
        }
        .into_local_record("local-1-0".to_string(), Utc::now());

        for needle in ["red", "sf123", "mia", "outdoor"] {
            assert!(record.matches_search(needle), "needle: {}", needle);
        }
        assert!(!record.matches_search("boots"));
        assert!(record.matches_search(""));
    }
}
