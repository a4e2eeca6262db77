//! Tenant identity provisioning.
//!
//! Every record set is scoped to one opaque tenant identifier. The identifier
//! is minted once and persisted to a file in the data directory; losing the
//! file means starting over with an empty remote view, so the provisioner
//! prefers the persisted value whenever one exists.

use chrono::Utc;
use std::fmt;
use std::path::Path;

/// Opaque identifier scoping all records to one household or shop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Wrap an already-known identifier (tests, fixed-tenant deployments).
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Load the persisted tenant id, minting and persisting one on first use.
    ///
    /// Never fails: when the file cannot be read or written the identifier is
    /// regenerated for this call and a warning is logged. That degrades to a
    /// fresh tenant per process, which the design accepts over hard failure.
    pub fn get_or_create(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return Self(trimmed.to_string());
                }
            }
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                tracing::warn!("Failed to read tenant id from {}: {}", path.display(), err);
            }
            Err(_) => {}
        }

        let id = generate_tenant_id();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        if let Err(err) = std::fs::write(path, &id) {
            tracing::warn!(
                "Failed to persist tenant id to {}: {} (id will be regenerated next run)",
                path.display(),
                err
            );
        }
        Self(id)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mint an identifier from a millisecond time component and a random suffix.
fn generate_tenant_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    let suffix: u32 = rand::random();
    format!("hh-{:x}-{:08x}", millis, suffix)
}
