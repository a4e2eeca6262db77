//! Core domain library for Packtrack (config, cache, remote sync, derived state).

/// Durable local mirror of tenant record sets.
pub mod cache;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants for endpoints and storage layout.
pub mod constants;
/// Process-global environment mutation helpers.
pub mod env;
/// Application error types (cache/remote/domain).
pub mod error;
/// CSV export of the current record set.
pub mod export;
/// Tenant identity provisioning.
pub mod identity;
/// Data models for package records, products, and drafts.
pub mod models;
/// Remote collection clients (HTTP and in-memory).
pub mod remote;
/// Optimistic local/remote reconciliation session.
pub mod reconciler;
/// Pure derived-state helpers (filtering, statistics, price history).
pub mod view;

pub use cache::LocalCache;
pub use config::Config;
pub use constants::{DEFAULT_REMOTE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::AppError;
pub use identity::TenantId;
pub use reconciler::ReconcilerSession;
pub use remote::{RemoteError, RemoteStore};
