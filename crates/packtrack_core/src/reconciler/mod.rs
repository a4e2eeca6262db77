//! Optimistic local/remote reconciliation.
//!
//! One [`ReconcilerSession`] per tenant owns the in-memory record set, the
//! remote store handle, the degraded-mode flag, and the notice buffer. Every
//! mutation applies locally first, mirrors to the cache, then replicates to
//! the remote; per-operation state is `Applied(local)` until the remote call
//! either confirms it or forces a policy decision.


use crate::cache::LocalCache;
use crate::error::AppError;
use crate::identity::TenantId;
use crate::models::{NewPackage, NewProduct, PackageRecord, Product, Status};
use crate::remote::{RemoteError, RemoteStore};
use crate::view;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Failure policy applied when remote replication is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Revert the optimistic change and restore the cache.
    Strict,
    /// Keep the optimistic change as local truth and enter degraded mode.
    Lenient,
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// User-visible notice; the toast equivalent of the original surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

struct SessionState {
    packages: Vec<PackageRecord>,
    products: Vec<Product>,
    degraded: bool,
    notices: Vec<Notice>,
    local_seq: u64,
}

impl SessionState {
    fn push_info(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        });
    }

    fn push_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        });
    }

    /// Placeholder ids stay unique and monotonic even within one millisecond.
    fn next_local_id(&mut self) -> String {
        self.local_seq += 1;
        let millis = Utc::now().timestamp_millis().max(0);
        format!("local-{}-{}", millis, self.local_seq)
    }
}

/// Serialized mutation owner for one tenant's record set.
pub struct ReconcilerSession {
    tenant: TenantId,
    remote: Arc<dyn RemoteStore>,
    cache: LocalCache,
    state: Mutex<SessionState>,
}

impl ReconcilerSession {
    const ADD_POLICY: WritePolicy = WritePolicy::Lenient;
    const STATUS_POLICY: WritePolicy = WritePolicy::Strict;
    const DELETE_POLICY: WritePolicy = WritePolicy::Strict;

    /// Build a session seeded from the local cache.
    ///
    /// Cache read failures start the session empty; the cache is best-effort
    /// and never blocks the surface. `offline` starts the session degraded so
    /// no remote call is ever issued.
    pub fn open(
        tenant: TenantId,
        remote: Arc<dyn RemoteStore>,
        cache: LocalCache,
        offline: bool,
    ) -> Self {
        let packages = cache.load_packages(&tenant).unwrap_or_else(|err| {
            tracing::warn!("Cache read failed, starting empty: {}", err);
            Vec::new()
        });
        let products = cache.load_products(&tenant).unwrap_or_else(|err| {
            tracing::warn!("Cache read failed, starting empty: {}", err);
            Vec::new()
        });
        Self {
            tenant,
            remote,
            cache,
            state: Mutex::new(SessionState {
                packages,
                products,
                degraded: offline,
                notices: Vec::new(),
                local_seq: 0,
            }),
        }
    }

    /// The tenant this session is scoped to.
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Snapshot of the in-memory record set in display order.
    pub async fn packages(&self) -> Vec<PackageRecord> {
        self.state.lock().await.packages.clone()
    }

    /// Snapshot of the in-memory product set.
    pub async fn products(&self) -> Vec<Product> {
        self.state.lock().await.products.clone()
    }

    /// Price memory for a named good, when one exists.
    pub async fn product_by_name(&self, name: &str) -> Option<Product> {
        self.state
            .lock()
            .await
            .products
            .iter()
            .find(|product| product.name == name)
            .cloned()
    }

    /// Whether the session has fallen back to local-only operation.
    pub async fn is_degraded(&self) -> bool {
        self.state.lock().await.degraded
    }

    /// Drain accumulated notices, oldest first.
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.lock().await.notices)
    }

    /// Fetch the remote list and replace local state with it.
    ///
    /// Success clears degraded mode. On failure the current (cache-seeded)
    /// state stays visible, the session degrades, and a notice is pushed.
    /// Unconfirmed local records are not merged back in; a failed lenient
    /// write was accepted as local truth only until the next good read.
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;
        match self.remote.list_packages(&self.tenant).await {
            Ok(mut rows) => {
                view::sort_for_display(&mut rows);
                state.packages = rows;
                state.degraded = false;
                self.persist(&state);
                tracing::debug!(
                    tenant = %self.tenant,
                    count = state.packages.len(),
                    "refreshed from remote"
                );
            }
            Err(err) => {
                state.degraded = true;
                state.push_error(format!("Refresh failed, showing local data: {}", err));
            }
        }
    }

    /// Add a record: optimistic insert, cache mirror, then remote replication
    /// under the lenient policy.
    ///
    /// # Returns
    /// The record as currently known: authoritative after confirmation, the
    /// `local-` placeholder while degraded or when replication failed.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] before any state change when the
    /// draft is invalid. Remote failures do not surface as errors.
    pub async fn add(&self, draft: NewPackage) -> Result<PackageRecord, AppError> {
        draft.validate()?;
        let mut state = self.state.lock().await;

        let placeholder_id = state.next_local_id();
        let record = draft.into_local_record(placeholder_id.clone(), Utc::now());
        state.packages.insert(0, record.clone());
        upsert_local_product(&mut state, &record);
        self.persist(&state);

        if state.degraded {
            state.push_info(format!("\"{}\" saved locally (offline)", record.item_name));
            return Ok(record);
        }

        match self.remote.insert_package(&self.tenant, &record).await {
            Ok(mut confirmed) => {
                if let Some(price) = confirmed.cost_price {
                    let name = confirmed.item_name.clone();
                    if let Some(product_id) = self
                        .replicate_product(&mut state, &name, price, confirmed.quantity)
                        .await
                    {
                        confirmed.product_id = Some(product_id);
                    }
                }
                if let Some(index) = state
                    .packages
                    .iter()
                    .position(|row| row.id == placeholder_id)
                {
                    state.packages[index] = confirmed.clone();
                }
                self.persist(&state);
                state.push_info(format!("Added \"{}\"", confirmed.item_name));
                Ok(confirmed)
            }
            Err(err) => {
                let message = format!(
                    "\"{}\" saved locally, sync failed: {}",
                    record.item_name, err
                );
                self.settle_failure(&mut state, Self::ADD_POLICY, None, message);
                Ok(record)
            }
        }
    }

    /// Flip a record between not-yet-received and received (strict policy).
    ///
    /// # Returns
    /// The status the record ended up with after reconciliation; on a remote
    /// rejection that is the original status.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when no local record has `id`.
    pub async fn toggle_status(&self, id: &str) -> Result<Status, AppError> {
        self.apply_status(id, Status::toggled).await
    }

    /// Set an explicit status (strict policy), e.g. the three-state
    /// `Pending -> Shipped -> Received` path.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when no local record has `id`.
    pub async fn set_status(&self, id: &str, status: Status) -> Result<Status, AppError> {
        self.apply_status(id, move |_| status).await
    }

    async fn apply_status(
        &self,
        id: &str,
        next: impl FnOnce(Status) -> Status,
    ) -> Result<Status, AppError> {
        let mut state = self.state.lock().await;
        let index = state
            .packages
            .iter()
            .position(|row| row.id == id)
            .ok_or(AppError::NotFound)?;

        let snapshot = state.packages.clone();
        let previous = state.packages[index].status;
        let updated = next(previous);
        state.packages[index].status = updated;
        self.persist(&state);

        let unconfirmed = state.packages[index].is_local();
        if state.degraded || unconfirmed {
            state.push_info(format!("Marked {} locally (offline)", updated));
            return Ok(updated);
        }

        match self.remote.update_status(&self.tenant, id, updated).await {
            Ok(()) => {
                state.push_info(format!("Marked {}", updated));
                Ok(updated)
            }
            Err(err) => {
                let message = format!("Status update failed: {}", err);
                self.settle_failure(&mut state, Self::STATUS_POLICY, Some(snapshot), message);
                Ok(previous)
            }
        }
    }

    /// Delete a record (strict policy).
    ///
    /// A remote `NotFound` keeps the removal: the record is gone either way,
    /// so resurrecting it locally would contradict the next refresh.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] when no local record has `id`.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        let index = state
            .packages
            .iter()
            .position(|row| row.id == id)
            .ok_or(AppError::NotFound)?;

        let snapshot = state.packages.clone();
        let removed = state.packages.remove(index);
        self.persist(&state);

        if state.degraded || removed.is_local() {
            state.push_info(format!(
                "Deleted \"{}\" locally (offline)",
                removed.item_name
            ));
            return Ok(());
        }

        match self.remote.delete_package(&self.tenant, id).await {
            Ok(()) => {
                state.push_info(format!("Deleted \"{}\"", removed.item_name));
                Ok(())
            }
            Err(RemoteError::NotFound) => {
                state.push_info(format!(
                    "\"{}\" was already removed remotely",
                    removed.item_name
                ));
                Ok(())
            }
            Err(err) => {
                let message = format!("Delete failed: {}", err);
                self.settle_failure(&mut state, Self::DELETE_POLICY, Some(snapshot), message);
                Ok(())
            }
        }
    }

    /// Resolve a remote failure according to the operation's policy.
    fn settle_failure(
        &self,
        state: &mut SessionState,
        policy: WritePolicy,
        snapshot: Option<Vec<PackageRecord>>,
        message: String,
    ) {
        match policy {
            WritePolicy::Strict => {
                if let Some(snapshot) = snapshot {
                    state.packages = snapshot;
                    self.persist(state);
                }
                state.push_error(message);
            }
            WritePolicy::Lenient => {
                state.degraded = true;
                state.push_error(message);
            }
        }
    }

    /// Replicate product price memory for a confirmed add. Best-effort: any
    /// failure is logged and the add still counts as confirmed.
    async fn replicate_product(
        &self,
        state: &mut SessionState,
        name: &str,
        price: f64,
        quantity: u32,
    ) -> Option<String> {
        let quantity = u64::from(quantity);
        let outcome = match self.remote.find_product(&self.tenant, name).await {
            Ok(Some(product)) => self
                .remote
                .update_product_price(&self.tenant, &product.id, price, quantity)
                .await
                .map(|()| product),
            Ok(None) => {
                self.remote
                    .insert_product(
                        &self.tenant,
                        &NewProduct {
                            name: name.to_string(),
                            last_price: price,
                            quantity,
                        },
                    )
                    .await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(product) => {
                if let Some(index) = state.products.iter().position(|row| row.name == product.name)
                {
                    state.products[index].id = product.id.clone();
                }
                Some(product.id)
            }
            Err(err) => {
                tracing::warn!("Product sync for '{}' failed (ignored): {}", name, err);
                None
            }
        }
    }

    /// Mirror the in-memory sets to the cache, logging and swallowing
    /// failures: the cache is best-effort, never authoritative.
    fn persist(&self, state: &SessionState) {
        if let Err(err) = self.cache.save_packages(&self.tenant, &state.packages) {
            tracing::warn!("Package cache write failed (ignored): {}", err);
        }
        if let Err(err) = self.cache.save_products(&self.tenant, &state.products) {
            tracing::warn!("Product cache write failed (ignored): {}", err);
        }
    }
}

/// Keep the local price memory current for a new record. Runs before remote
/// replication so the memory survives offline adds.
fn upsert_local_product(state: &mut SessionState, record: &PackageRecord) {
    let Some(price) = record.cost_price else {
        return;
    };
    let quantity = u64::from(record.quantity);
    match state
        .products
        .iter()
        .position(|product| product.name == record.item_name)
    {
        Some(index) => {
            state.products[index].last_price = price;
            state.products[index].total_quantity += quantity;
        }
        None => {
            let id = format!("local-p-{}", state.local_seq);
            state.products.push(Product {
                id,
                name: record.item_name.clone(),
                last_price: price,
                total_quantity: quantity,
            });
        }
    }
}
