//! Product (price-memory) models.

use serde::{Deserialize, Serialize};

/// Price memory for a named good, unique per tenant by `name`.
///
/// Created lazily the first time a record references a new name and updated
/// whenever another record for that name is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Most recent cost observed for this name.
    pub last_price: f64,
    /// Informational running total across all records for this name.
    pub total_quantity: u64,
}

/// Draft payload for creating a product entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub last_price: f64,
    pub quantity: u64,
}
