//! Durable local mirror of the last known good record sets.
//!
//! The cache is a best-effort key-value snapshot, overwritten wholesale on
//! every successful remote read or optimistic mutation. It is never treated
//! as authoritative: callers in the reconciler log and swallow write
//! failures rather than surfacing them.

mod tables;

use crate::error::AppError;
use crate::identity::TenantId;
use crate::models::{PackageRecord, Product};
use redb::{ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use self::tables::{PACKAGES, PRODUCTS};

/// Handle to the tenant-scoped redb mirror.
#[derive(Clone)]
pub struct LocalCache {
    db: Arc<redb::Database>,
}

impl LocalCache {
    /// Open (or create) the cache database and initialize its tables.
    ///
    /// # Errors
    /// Returns an error when redb cannot open the file or initialize tables.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = redb::Database::create(path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(PACKAGES)?;
        write_txn.open_table(PRODUCTS)?;
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    fn save_row<T: Serialize>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        tenant: &TenantId,
        rows: &[T],
    ) -> Result<(), AppError> {
        let encoded = bincode::serialize(rows)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut handle = write_txn.open_table(table)?;
            handle.insert(tenant.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn load_row<T: DeserializeOwned>(
        &self,
        table: TableDefinition<&str, &[u8]>,
        tenant: &TenantId,
    ) -> Result<Vec<T>, AppError> {
        let read_txn = self.db.begin_read()?;
        let handle = read_txn.open_table(table)?;
        match handle.get(tenant.as_str())? {
            Some(guard) => Ok(bincode::deserialize(guard.value())?),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the cached package set for `tenant`.
    ///
    /// # Errors
    /// Returns an error when serialization or storage fails.
    pub fn save_packages(
        &self,
        tenant: &TenantId,
        records: &[PackageRecord],
    ) -> Result<(), AppError> {
        self.save_row(PACKAGES, tenant, records)
    }

    /// Load the cached package set for `tenant`, empty when absent.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn load_packages(&self, tenant: &TenantId) -> Result<Vec<PackageRecord>, AppError> {
        self.load_row(PACKAGES, tenant)
    }

    /// Overwrite the cached product set for `tenant`.
    ///
    /// # Errors
    /// Returns an error when serialization or storage fails.
    pub fn save_products(&self, tenant: &TenantId, products: &[Product]) -> Result<(), AppError> {
        self.save_row(PRODUCTS, tenant, products)
    }

    /// Load the cached product set for `tenant`, empty when absent.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn load_products(&self, tenant: &TenantId) -> Result<Vec<Product>, AppError> {
        self.load_row(PRODUCTS, tenant)
    }
}

#[cfg(test)]
mod tests {
    use super::LocalCache;
    use crate::identity::TenantId;
    use crate::models::{NewPackage, PackageRecord, Product};
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup_cache() -> (LocalCache, TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let cache = LocalCache::open(&dir.path().join("cache.redb")).expect("open cache");
        (cache, dir)
    }

    fn record(id: &str, item_name: &str) -> PackageRecord {
        NewPackage {
            item_name: item_name.to_string(),
            ..NewPackage::default()
        }
        .into_local_record(id.to_string(), Utc::now())
    }

    #[test]
    fn load_returns_empty_for_unknown_tenant() {
        let (cache, _dir) = setup_cache();
        let tenant = TenantId::from_string("hh-none".to_string());
        assert!(cache.load_packages(&tenant).expect("load").is_empty());
        assert!(cache.load_products(&tenant).expect("load").is_empty());
    }

    #[test]
    fn package_snapshot_roundtrip_overwrites_wholesale() {
        let (cache, _dir) = setup_cache();
        let tenant = TenantId::from_string("hh-a".to_string());

        let first = vec![record("local-1-0", "Socks"), record("local-1-1", "Mugs")];
        cache.save_packages(&tenant, &first).expect("save");
        assert_eq!(cache.load_packages(&tenant).expect("load"), first);

        let second = vec![record("R1", "Socks")];
        cache.save_packages(&tenant, &second).expect("save");
        assert_eq!(cache.load_packages(&tenant).expect("load"), second);
    }

    #[test]
    fn tenants_are_isolated() {
        let (cache, _dir) = setup_cache();
        let tenant_a = TenantId::from_string("hh-a".to_string());
        let tenant_b = TenantId::from_string("hh-b".to_string());

        cache
            .save_packages(&tenant_a, &[record("R1", "Socks")])
            .expect("save");
        assert!(cache.load_packages(&tenant_b).expect("load").is_empty());
    }

    #[test]
    fn product_snapshot_roundtrip() {
        let (cache, _dir) = setup_cache();
        let tenant = TenantId::from_string("hh-a".to_string());
        let products = vec![Product {
            id: "P1".to_string(),
            name: "Socks".to_string(),
            last_price: 9.5,
            total_quantity: 3,
        }];
        cache.save_products(&tenant, &products).expect("save");
        assert_eq!(cache.load_products(&tenant).expect("load"), products);
    }
}
