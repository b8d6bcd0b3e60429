// Vaultlink — Store error types

use thiserror::Error;

/// Errors reported by the record store adapter.
///
/// The external network reports most failures as free-form text; the adapter
/// classifies that text into these kinds at its boundary. `Store` carries the
/// original message verbatim for anything that matched no known pattern.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Grantee identity not known to the network: {0}")]
    GranteeNotFound(String),

    #[error("No access granted to this identity: {0}")]
    NoAccessGranted(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Store(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}
