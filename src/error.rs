// Vaultlink — Top-level error types
//
// Aggregates errors from the identity, service and gateway modules into a
// single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all vaultlink operations.
#[derive(Debug, Error)]
pub enum VaultlinkError {
    #[error("Identity error: {0}")]
    Identity(#[from] crate::identity::IdentityError),

    #[error("Service error: {0}")]
    Service(#[from] crate::service::ServiceError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VaultlinkError>;
