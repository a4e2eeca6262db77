//! In-memory remote store with failure injection.
//!
//! Stands in for the hosted backend in unit tests and offline demos. Supports
//! two failure modes: a persistent offline switch and a one-shot injected
//! error consumed by the next call.

use super::{RemoteError, RemoteStore};
use crate::constants::LIST_LIMIT;
use crate::identity::TenantId;
use crate::models::{NewProduct, PackageRecord, Product, Status};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    packages: HashMap<String, Vec<PackageRecord>>,
    products: HashMap<String, Vec<Product>>,
    next_package_id: u64,
    next_product_id: u64,
    offline: bool,
    fail_next: Option<RemoteError>,
    fail_products: bool,
}

impl Inner {
    fn gate(&mut self, action: &str) -> Result<(), RemoteError> {
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        if self.offline {
            return Err(RemoteError::Unavailable(format!(
                "{}: simulated network outage",
                action
            )));
        }
        Ok(())
    }

    fn gate_products(&mut self, action: &str) -> Result<(), RemoteError> {
        self.gate(action)?;
        if self.fail_products {
            return Err(RemoteError::Unavailable(format!(
                "{}: simulated product outage",
                action
            )));
        }
        Ok(())
    }
}

/// In-process [`RemoteStore`] implementation.
#[derive(Default)]
pub struct MemoryRemoteStore {
    inner: Mutex<Inner>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the persistent outage switch.
    pub fn set_offline(&self, offline: bool) {
        self.inner.lock().expect("remote store lock").offline = offline;
    }

    /// Inject an error consumed by the next call, whatever it is.
    pub fn fail_next(&self, err: RemoteError) {
        self.inner.lock().expect("remote store lock").fail_next = Some(err);
    }

    /// Fail product-collection calls only, leaving package calls healthy.
    pub fn fail_products(&self, fail: bool) {
        self.inner.lock().expect("remote store lock").fail_products = fail;
    }

    /// Snapshot the stored package set for assertions.
    pub fn stored_packages(&self, tenant: &TenantId) -> Vec<PackageRecord> {
        self.inner
            .lock()
            .expect("remote store lock")
            .packages
            .get(tenant.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot the stored product set for assertions.
    pub fn stored_products(&self, tenant: &TenantId) -> Vec<Product> {
        self.inner
            .lock()
            .expect("remote store lock")
            .products
            .get(tenant.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn list_packages(&self, tenant: &TenantId) -> Result<Vec<PackageRecord>, RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate("list")?;
        let mut rows = inner
            .packages
            .get(tenant.as_str())
            .cloned()
            .unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(LIST_LIMIT);
        Ok(rows)
    }

    async fn insert_package(
        &self,
        tenant: &TenantId,
        draft: &PackageRecord,
    ) -> Result<PackageRecord, RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate("insert")?;
        if draft.item_name.trim().is_empty() {
            return Err(RemoteError::Validation("itemName is required".to_string()));
        }
        inner.next_package_id += 1;
        let mut stored = draft.clone();
        stored.id = format!("R{}", inner.next_package_id);
        inner
            .packages
            .entry(tenant.as_str().to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_status(
        &self,
        tenant: &TenantId,
        id: &str,
        status: Status,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate("update status")?;
        let rows = inner
            .packages
            .get_mut(tenant.as_str())
            .ok_or(RemoteError::NotFound)?;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RemoteError::NotFound)?;
        row.status = status;
        Ok(())
    }

    async fn delete_package(&self, tenant: &TenantId, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate("delete")?;
        let rows = inner
            .packages
            .get_mut(tenant.as_str())
            .ok_or(RemoteError::NotFound)?;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RemoteError::NotFound);
        }
        Ok(())
    }

    async fn find_product(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<Product>, RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate_products("find product")?;
        Ok(inner
            .products
            .get(tenant.as_str())
            .and_then(|rows| rows.iter().find(|row| row.name == name).cloned()))
    }

    async fn insert_product(
        &self,
        tenant: &TenantId,
        draft: &NewProduct,
    ) -> Result<Product, RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate_products("insert product")?;
        inner.next_product_id += 1;
        let product = Product {
            id: format!("P{}", inner.next_product_id),
            name: draft.name.clone(),
            last_price: draft.last_price,
            total_quantity: draft.quantity,
        };
        inner
            .products
            .entry(tenant.as_str().to_string())
            .or_default()
            .push(product.clone());
        Ok(product)
    }

    async fn update_product_price(
        &self,
        tenant: &TenantId,
        id: &str,
        last_price: f64,
        quantity_delta: u64,
    ) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().expect("remote store lock");
        inner.gate_products("update product price")?;
        let rows = inner
            .products
            .get_mut(tenant.as_str())
            .ok_or(RemoteError::NotFound)?;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RemoteError::NotFound)?;
        row.last_price = last_price;
        row.total_quantity += quantity_delta;
        Ok(())
    }
}
