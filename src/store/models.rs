// Vaultlink — Record data models
//
// SECURITY: the secret payload is wrapped in `SecretValue`, whose Debug
// output is redacted and whose memory is zeroized on drop. It is never
// included in log messages or Display output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Separator between the owner identifier and the label in a record's
/// composite name.
pub const NAME_SEPARATOR: char = '_';

/// Build the composite name a record is stored and searched under.
pub fn composite_name(owner: &str, label: &str) -> String {
    format!("{}{}{}", owner, NAME_SEPARATOR, label)
}

/// Recover the label from a composite name by discarding the owner prefix.
/// Labels may themselves contain the separator, so everything after the
/// first occurrence belongs to the label. Returns `None` for names that
/// carry no separator at all.
pub fn label_from_composite(name: &str) -> Option<&str> {
    name.split_once(NAME_SEPARATOR).map(|(_, label)| label)
}

/// The owner prefix of a composite name.
pub fn owner_from_composite(name: &str) -> Option<&str> {
    name.split_once(NAME_SEPARATOR).map(|(owner, _)| owner)
}

/// Addresses one stored record at the external network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub collection: String,
    pub document: String,
}

impl Locator {
    pub fn new(collection: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            document: document.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.document)
    }
}

/// An opaque secret payload. Redacted in Debug, zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretValue(String);

impl SecretValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw secret. Callers must not log or display the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue([REDACTED])")
    }
}

/// A single stored secret entry.
/// The `secret` field is private — access only via `secret()`/`into_secret()`.
#[derive(Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub owner: String,
    pub label: String,
    secret: SecretValue,
    pub locator: Locator,
    pub created_at: DateTime<Utc>,
}

impl Record {
    pub fn new(
        id: Uuid,
        owner: String,
        label: String,
        secret: SecretValue,
        locator: Locator,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner,
            label,
            secret,
            locator,
            created_at,
        }
    }

    /// The composite name this record is stored under.
    pub fn composite_name(&self) -> String {
        composite_name(&self.owner, &self.label)
    }

    pub fn secret(&self) -> &SecretValue {
        &self.secret
    }

    pub fn into_secret(self) -> SecretValue {
        self.secret
    }
}

/// Custom Debug implementation that never reveals the secret.
impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("label", &self.label)
            .field("secret", &"[REDACTED]")
            .field("locator", &self.locator)
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.label, self.locator)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, secret: &str) -> Record {
        Record::new(
            Uuid::new_v4(),
            "did:vault:abc123".to_string(),
            label.to_string(),
            SecretValue::new(secret),
            Locator::new("col-1", "doc-1"),
            Utc::now(),
        )
    }

    #[test]
    fn test_composite_name_round_trip() {
        let name = composite_name("did:vault:abc123", "example.com");
        assert_eq!(name, "did:vault:abc123_example.com");
        assert_eq!(label_from_composite(&name), Some("example.com"));
        assert_eq!(owner_from_composite(&name), Some("did:vault:abc123"));
    }

    #[test]
    fn test_label_with_separator_survives_round_trip() {
        // Only the first separator belongs to the owner prefix.
        let name = composite_name("did:vault:abc123", "my_bank_login");
        assert_eq!(label_from_composite(&name), Some("my_bank_login"));
    }

    #[test]
    fn test_name_without_separator_has_no_label() {
        assert_eq!(label_from_composite("nounderscores"), None);
    }

    #[test]
    fn test_secret_value_debug_is_redacted() {
        let secret = SecretValue::new("hunter2");
        let debug = format!("{:?}", secret);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_record_debug_redacts_secret() {
        let rec = record("example.com", "p@ssw0rd-123");
        let debug = format!("{:?}", rec);
        assert!(debug.contains("[REDACTED]"));
        assert!(
            !debug.contains("p@ssw0rd-123"),
            "Debug output must never contain the raw secret"
        );
    }

    #[test]
    fn test_record_display_has_no_secret() {
        let rec = record("example.com", "p@ssw0rd-123");
        let display = format!("{}", rec);
        assert!(!display.contains("p@ssw0rd-123"));
        assert!(display.contains("example.com"));
        assert!(display.contains("col-1/doc-1"));
    }

    #[test]
    fn test_record_composite_name() {
        let rec = record("example.com", "x");
        assert_eq!(rec.composite_name(), "did:vault:abc123_example.com");
    }

    #[test]
    fn test_locator_display() {
        let locator = Locator::new("8714e211", "d0c5");
        assert_eq!(locator.to_string(), "8714e211/d0c5");
    }
}
