// Vaultlink — Identity Provider
//
// The caller identity is an Ed25519 keypair plus the public identifier
// derived from it. It is persisted once in the platform keyring as a small
// JSON blob `{ private_key, did }` and reused on every subsequent
// resolution.
//
// Recovery rules:
//   - persisted private key malformed (bad hex, wrong length) → fail closed,
//     never silently regenerate
//   - persisted DID does not match the DID re-derived from the private key →
//     generate and persist a fresh identity, discarding the mismatched one

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::IdentityError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Prefix of every derived public identifier.
pub const DID_PREFIX: &str = "did:vault:";

/// Service name identifying vaultlink entries in the platform keyring.
const KEYRING_SERVICE: &str = "vaultlink";

/// Username for the keyring entry holding the identity blob.
const KEYRING_USER: &str = "identity";

/// Length of the Ed25519 private key in bytes.
const PRIVATE_KEY_LEN: usize = 32;

// ─── Identity ────────────────────────────────────────────────────────────────

/// A caller identity: the signing keypair and its derived public identifier.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
    did: String,
}

impl Identity {
    /// Generate a fresh identity from OS randomness.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        rand::rng().fill_bytes(bytes.as_mut());
        Self::from_signing_key(SigningKey::from_bytes(&bytes))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let did = derive_did(&signing_key.verifying_key());
        Self { signing_key, did }
    }

    /// The public identifier other parties address this identity by.
    pub fn did(&self) -> &str {
        &self.did
    }

    fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.signing_key.to_bytes()))
    }
}

/// Never reveal key material in Debug output.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("did", &self.did)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

fn derive_did(key: &VerifyingKey) -> String {
    format!("{}{}", DID_PREFIX, hex::encode(key.as_bytes()))
}

/// Rebuild an identity from persisted private-key hex. A leading `0x` is
/// tolerated; anything else malformed fails closed.
fn identity_from_stored(private_key_hex: &str) -> Result<Identity, IdentityError> {
    let trimmed = private_key_hex
        .strip_prefix("0x")
        .unwrap_or(private_key_hex);
    let bytes = hex::decode(trimmed)
        .map_err(|e| IdentityError::Malformed(format!("private key is not hex: {}", e)))?;
    let key: [u8; PRIVATE_KEY_LEN] = bytes.try_into().map_err(|_| {
        IdentityError::Malformed(format!("private key must be {} bytes", PRIVATE_KEY_LEN))
    })?;
    Ok(Identity::from_signing_key(SigningKey::from_bytes(&key)))
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct PersistedIdentity {
    private_key: String,
    did: String,
}

/// Outcome of resolving against the persisted blob. A `Generated` identity
/// must be persisted by the caller before being handed out.
#[derive(Debug)]
enum Resolution {
    Existing(Identity),
    Generated(Identity),
}

/// Resolution logic, independent of the backing keyring so it can be tested
/// against raw blobs.
fn resolve_stored(raw: Option<&str>) -> Result<Resolution, IdentityError> {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            tracing::info!("No persisted identity — generating a new one");
            return Ok(Resolution::Generated(Identity::generate()));
        }
    };

    let stored: PersistedIdentity = serde_json::from_str(raw)
        .map_err(|e| IdentityError::Malformed(format!("identity blob is not valid JSON: {}", e)))?;

    let identity = identity_from_stored(&stored.private_key)?;

    if identity.did() == stored.did {
        Ok(Resolution::Existing(identity))
    } else {
        tracing::warn!(
            stored = %stored.did,
            derived = %identity.did(),
            "Persisted identifier does not match its private key — generating a new identity"
        );
        Ok(Resolution::Generated(Identity::generate()))
    }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over identity resolution, enabling mock implementations for
/// testing.
pub trait IdentityProvider: Send + Sync {
    /// Return the caller identity, creating and persisting one on first use.
    /// Idempotent: subsequent calls return the same identity.
    fn resolve(&self) -> Result<Identity, IdentityError>;
}

// ─── Keyring implementation ──────────────────────────────────────────────────

/// Production provider backed by the platform keyring.
/// Dispatches to:
///   - Linux: D-Bus Secret Service (GNOME Keyring / KDE Wallet)
///   - macOS: Security.framework Keychain
///   - Windows: Windows Credential Manager
pub struct KeyringIdentityProvider {
    service: String,
    user: String,
}

impl KeyringIdentityProvider {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: KEYRING_USER.to_string(),
        }
    }

    /// Custom service/user names, useful for testing isolation.
    #[allow(dead_code)]
    pub fn with_names(service: &str, user: &str) -> Self {
        Self {
            service: service.to_string(),
            user: user.to_string(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, IdentityError> {
        keyring::Entry::new(&self.service, &self.user)
            .map_err(|e| IdentityError::Storage(format!("failed to create keyring entry: {}", e)))
    }

    fn persist(entry: &keyring::Entry, identity: &Identity) -> Result<(), IdentityError> {
        let blob = serde_json::to_string(&PersistedIdentity {
            private_key: identity.private_key_hex().to_string(),
            did: identity.did().to_string(),
        })
        .map_err(|e| IdentityError::Storage(format!("failed to encode identity: {}", e)))?;
        entry
            .set_password(&blob)
            .map_err(|e| IdentityError::Storage(format!("failed to store identity: {}", e)))?;
        tracing::info!(did = %identity.did(), "Identity persisted to platform keyring");
        Ok(())
    }
}

impl Default for KeyringIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for KeyringIdentityProvider {
    fn resolve(&self) -> Result<Identity, IdentityError> {
        let entry = self.entry()?;

        let raw = match entry.get_password() {
            Ok(raw) => Some(raw),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                return Err(IdentityError::Storage(format!(
                    "failed to read identity: {}",
                    e
                )))
            }
        };

        match resolve_stored(raw.as_deref())? {
            Resolution::Existing(identity) => Ok(identity),
            Resolution::Generated(identity) => {
                Self::persist(&entry, &identity)?;
                Ok(identity)
            }
        }
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

/// A mock provider holding a fixed identity in memory, so unit tests never
/// touch the real platform keyring.
#[cfg(test)]
pub mod mock {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    pub struct MockIdentityProvider {
        identity: Identity,
        fail: AtomicBool,
    }

    impl MockIdentityProvider {
        pub fn new() -> Self {
            Self {
                identity: Identity::generate(),
                fail: AtomicBool::new(false),
            }
        }

        pub fn did(&self) -> &str {
            self.identity.did()
        }

        /// Make every subsequent resolution fail.
        pub fn fail_resolution(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    impl IdentityProvider for MockIdentityProvider {
        fn resolve(&self) -> Result<Identity, IdentityError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(IdentityError::Storage("keyring unavailable".to_string()));
            }
            Ok(self.identity.clone())
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
