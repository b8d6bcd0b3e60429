// Vaultlink — Runtime configuration
//
// Compiled defaults for the storage network, overridable through the
// environment. The service DID is the administrative counterpart that is
// granted read+execute on every record at creation time; only its public
// identifier is needed here.

use std::time::Duration;

use crate::cache::DEFAULT_TTL;

/// Default network node the store client talks to.
pub const DEFAULT_NODE_URL: &str = "https://node-1.vaultnet.example.network";

/// Default collection all password records live in.
pub const DEFAULT_COLLECTION_ID: &str = "5d3f2a61-74c8-4e0b-9b1a-2f6c8d40a917";

/// Default public identifier of the administrative service.
pub const DEFAULT_SERVICE_DID: &str =
    "did:vault:8a1f6c0d3e5b29747c1a90f2b8d4e6a1c3f5d7092b4e6c8a0d2f4b6e8a1c3d5f";

#[derive(Debug, Clone)]
pub struct Config {
    pub node_url: String,
    pub collection_id: String,
    pub service_did: String,
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_url: DEFAULT_NODE_URL.to_string(),
            collection_id: DEFAULT_COLLECTION_ID.to_string(),
            service_did: DEFAULT_SERVICE_DID.to_string(),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

impl Config {
    /// Defaults with `VAULTLINK_NODE_URL`, `VAULTLINK_COLLECTION_ID` and
    /// `VAULTLINK_SERVICE_DID` applied on top.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("VAULTLINK_NODE_URL") {
            config.node_url = url;
        }
        if let Ok(collection) = std::env::var("VAULTLINK_COLLECTION_ID") {
            config.collection_id = collection;
        }
        if let Ok(did) = std::env::var("VAULTLINK_SERVICE_DID") {
            config.service_did = did;
        }
        config
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.node_url, DEFAULT_NODE_URL);
        assert_eq!(config.collection_id, DEFAULT_COLLECTION_ID);
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_env_overrides_node_url() {
        std::env::set_var("VAULTLINK_NODE_URL", "http://localhost:9000");
        let config = Config::from_env();
        assert_eq!(config.node_url, "http://localhost:9000");
        std::env::remove_var("VAULTLINK_NODE_URL");
    }
}
