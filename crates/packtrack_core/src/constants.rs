//! Shared constants for endpoints and storage layout.

/// Default base URL for the hosted record collection.
pub const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:8787";

/// Default request timeout for remote calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of rows fetched by a remote list call.
pub const LIST_LIMIT: usize = 100;

/// File name for the persisted tenant identifier within the data directory.
pub const TENANT_ID_FILE: &str = "tenant_id";

/// File name for the redb cache within the data directory.
pub const CACHE_FILE_NAME: &str = "cache.redb";
