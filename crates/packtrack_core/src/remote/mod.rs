//! Remote collection clients.
//!
//! The hosted backend is an external collaborator: this module only defines
//! the boundary trait plus two implementations, an HTTP client for the real
//! collection and an in-memory store used by tests and offline demos.
//! Field-name translation to the backend's wire schema happens exclusively
//! inside the HTTP implementation.

/// HTTP implementation backed by reqwest.
pub mod http;
/// In-memory implementation with failure injection.
pub mod memory;

pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;

use crate::identity::TenantId;
use crate::models::{NewProduct, PackageRecord, Product, Status};
use async_trait::async_trait;
use thiserror::Error;

/// Failures surfaced by remote collection calls.
///
/// These never escape the reconciler boundary; they are converted into
/// rollbacks, degraded mode, or notices there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Network, auth, or backend failure. Transient from the caller's view.
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// The target record vanished remotely.
    #[error("record not found on remote")]
    NotFound,

    /// The backend rejected the payload.
    #[error("rejected by remote: {0}")]
    Validation(String),
}

/// Boundary trait over one tenant-scoped "packages" collection and its
/// secondary "products" lookup collection.
///
/// Implementations hold no local record state; all calls are network (or
/// simulated network) I/O.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List records for `tenant`, ordered by creation time descending,
    /// capped at [`crate::constants::LIST_LIMIT`] rows.
    async fn list_packages(&self, tenant: &TenantId) -> Result<Vec<PackageRecord>, RemoteError>;

    /// Insert a record; the store assigns the authoritative id.
    ///
    /// Takes the optimistic [`PackageRecord`] rather than a bare draft so the
    /// client-observed creation time rides along and list ordering stays
    /// stable across confirmation.
    async fn insert_package(
        &self,
        tenant: &TenantId,
        draft: &PackageRecord,
    ) -> Result<PackageRecord, RemoteError>;

    /// Update the status of an existing record.
    async fn update_status(
        &self,
        tenant: &TenantId,
        id: &str,
        status: Status,
    ) -> Result<(), RemoteError>;

    /// Delete a record by id.
    async fn delete_package(&self, tenant: &TenantId, id: &str) -> Result<(), RemoteError>;

    /// Look up a product by its per-tenant unique name.
    async fn find_product(
        &self,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<Product>, RemoteError>;

    /// Insert a product; the store assigns the authoritative id.
    async fn insert_product(
        &self,
        tenant: &TenantId,
        draft: &NewProduct,
    ) -> Result<Product, RemoteError>;

    /// Record a newly observed price (and quantity delta) for a product.
    async fn update_product_price(
        &self,
        tenant: &TenantId,
        id: &str,
        last_price: f64,
        quantity_delta: u64,
    ) -> Result<(), RemoteError>;
}
