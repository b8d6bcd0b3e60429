// Vaultlink — Identity Module
//
// Manages the caller's keypair and its derived public identifier. The
// identity is generated on first use, persisted in the platform keyring
// (Keychain/DPAPI/libsecret), and reused for the lifetime of the
// installation.

mod error;
mod provider;

pub use error::IdentityError;
pub use provider::{Identity, IdentityProvider, KeyringIdentityProvider, DID_PREFIX};

#[cfg(test)]
pub use provider::mock;
