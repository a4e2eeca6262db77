//! redb table definitions for the local mirror.

use redb::TableDefinition;

/// Package record sets keyed by tenant id (`Vec<PackageRecord>`, bincode-encoded).
pub const PACKAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("packages");
/// Product sets keyed by tenant id (`Vec<Product>`, bincode-encoded).
pub const PRODUCTS: TableDefinition<&str, &[u8]> = TableDefinition::new("products");
