// Vaultlink — Identity error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Malformed persisted identity: {0}")]
    Malformed(String),

    #[error("Identity storage error: {0}")]
    Storage(String),
}
