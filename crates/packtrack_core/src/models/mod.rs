//! Data models shared by cache, remote clients, and the reconciler.

/// Package record and draft types.
pub mod package;
/// Product (price-memory) types.
pub mod product;

pub use package::{NewPackage, PackageRecord, Status};
pub use product::{NewProduct, Product};
