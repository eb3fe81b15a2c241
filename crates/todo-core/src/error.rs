use thiserror::Error;

/// A value could not be serialized or the storage backend refused it.
///
/// Callers of [`crate::storage::Persisted`] never see this: the in-memory
/// value is updated and the failure is logged.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize value for key `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage quota exceeded writing `{key}` ({needed} bytes, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("storage backend failed on `{key}`: {message}")]
    Backend { key: String, message: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Network or HTTP failure while loading a remote resource.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request failed with status {status}")]
    Status { status: u16 },

    #[error("failed to decode response body: {0}")]
    Decode(String),
}

/// Rejected login attempt.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}
