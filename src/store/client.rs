// Vaultlink — Record Store Client
//
// Thin adapter over the external secret-storage network. Every operation is
// a single network round trip with no local retry; failures propagate to the
// caller. Creation attaches an access-control entry granting the configured
// service identity read+execute (never write), so the administrative side of
// the network can serve the record without being able to alter it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;

use super::models::{composite_name, label_from_composite, owner_from_composite};
use super::{Locator, Record, SecretValue, StoreError};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the external record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a new record under `owner`'s composite name. Returns the locator
    /// of the created document.
    async fn create(
        &self,
        owner: &str,
        label: &str,
        secret: &SecretValue,
    ) -> Result<Locator, StoreError>;

    /// Enumerate all record locators visible to `owner`. Order is
    /// network-defined.
    async fn list_locators(&self, owner: &str) -> Result<Vec<Locator>, StoreError>;

    /// Fetch one record's full content, including the decrypted secret.
    async fn read(&self, locator: &Locator) -> Result<Record, StoreError>;

    /// Remove a record. Fails with `StoreError::NotFound` if absent.
    async fn delete(&self, locator: &Locator) -> Result<(), StoreError>;

    /// Add read+write+execute permission on a record for `grantee`.
    /// Fails with `StoreError::GranteeNotFound` if the identity is unknown
    /// to the network.
    async fn grant(&self, locator: &Locator, grantee: &str) -> Result<(), StoreError>;

    /// Remove a previously granted permission. Fails with
    /// `StoreError::NoAccessGranted` when no grant existed.
    async fn revoke(&self, locator: &Locator, grantee: &str) -> Result<(), StoreError>;
}

// ─── Error-text classification ───────────────────────────────────────────────
//
// The network reports grant/revoke failures as free-form text. These two
// helpers are the only place that text is interpreted; anything unmatched is
// surfaced verbatim as `StoreError::Store`.

fn classify_grant_error(message: &str) -> StoreError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("not found") || lower.contains("does not exist") {
        StoreError::GranteeNotFound(message.to_string())
    } else {
        StoreError::Store(message.to_string())
    }
}

fn classify_revoke_error(message: &str) -> StoreError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("not found")
        || lower.contains("no access granted")
        || lower.contains("does not exist")
    {
        StoreError::NoAccessGranted(message.to_string())
    } else {
        StoreError::Store(message.to_string())
    }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AclEntry<'a> {
    grantee: &'a str,
    read: bool,
    write: bool,
    execute: bool,
}

#[derive(Debug, Serialize)]
struct StoredDocument<'a> {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    secret: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    collection: &'a str,
    owner: &'a str,
    acl: AclEntry<'a>,
    data: Vec<StoredDocument<'a>>,
}

#[derive(Debug, Deserialize)]
struct LocatorRef {
    collection: String,
    document: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Vec<LocatorRef>,
}

#[derive(Debug, Deserialize)]
struct DocumentBody {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    secret: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: DocumentBody,
}

#[derive(Debug, Serialize)]
struct GrantRequest<'a> {
    collection: &'a str,
    document: &'a str,
    acl: AclEntry<'a>,
}

#[derive(Debug, Serialize)]
struct RevokeRequest<'a> {
    collection: &'a str,
    document: &'a str,
    grantee: &'a str,
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// Production store client speaking JSON over HTTP to a network node.
pub struct HttpRecordStore {
    http: reqwest::Client,
    node_url: String,
    collection_id: String,
    service_did: String,
}

impl HttpRecordStore {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            node_url: config.node_url.trim_end_matches('/').to_string(),
            collection_id: config.collection_id.clone(),
            service_did: config.service_did.clone(),
        }
    }

    fn data_url(&self, locator: &Locator) -> String {
        format!(
            "{}/v1/data/{}/{}",
            self.node_url, locator.collection, locator.document
        )
    }

    /// Extract the failure text from a non-success response, falling back to
    /// the status code when the body is empty.
    async fn failure_text(response: reqwest::Response) -> String {
        let status = response.status();
        match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            _ => format!("store returned status {}", status),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create(
        &self,
        owner: &str,
        label: &str,
        secret: &SecretValue,
    ) -> Result<Locator, StoreError> {
        let id = Uuid::new_v4();
        let request = CreateRequest {
            collection: &self.collection_id,
            owner,
            acl: AclEntry {
                grantee: &self.service_did,
                read: true,
                write: false,
                execute: true,
            },
            data: vec![StoredDocument {
                id,
                name: composite_name(owner, label),
                secret: secret.expose(),
                created_at: Utc::now(),
            }],
        };

        let response = self
            .http
            .post(format!("{}/v1/data", self.node_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Store(Self::failure_text(response).await));
        }

        tracing::debug!(document = %id, collection = %self.collection_id, "Record stored");
        Ok(Locator::new(self.collection_id.clone(), id.to_string()))
    }

    async fn list_locators(&self, owner: &str) -> Result<Vec<Locator>, StoreError> {
        let response = self
            .http
            .get(format!("{}/v1/data/owned", self.node_url))
            .query(&[("owner", owner)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Store(Self::failure_text(response).await));
        }

        let refs: ListResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Store(format!("malformed list response: {}", e)))?;

        Ok(refs
            .data
            .into_iter()
            .map(|r| Locator::new(r.collection, r.document))
            .collect())
    }

    async fn read(&self, locator: &Locator) -> Result<Record, StoreError> {
        let response = self.http.get(self.data_url(locator)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(locator.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Store(Self::failure_text(response).await));
        }

        let body: ReadResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Store(format!("malformed record response: {}", e)))?;
        let doc = body.data;

        let label = label_from_composite(&doc.name)
            .ok_or_else(|| StoreError::Store(format!("malformed record name: {}", doc.name)))?
            .to_string();
        let owner = owner_from_composite(&doc.name)
            .unwrap_or_default()
            .to_string();

        Ok(Record::new(
            doc.id,
            owner,
            label,
            SecretValue::new(doc.secret),
            locator.clone(),
            doc.created_at.unwrap_or_else(Utc::now),
        ))
    }

    async fn delete(&self, locator: &Locator) -> Result<(), StoreError> {
        let response = self.http.delete(self.data_url(locator)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(locator.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::Store(Self::failure_text(response).await));
        }

        tracing::debug!(%locator, "Record deleted from store");
        Ok(())
    }

    async fn grant(&self, locator: &Locator, grantee: &str) -> Result<(), StoreError> {
        let request = GrantRequest {
            collection: &locator.collection,
            document: &locator.document,
            acl: AclEntry {
                grantee,
                read: true,
                write: true,
                execute: true,
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/acl/grant", self.node_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_grant_error(&Self::failure_text(response).await));
        }
        Ok(())
    }

    async fn revoke(&self, locator: &Locator, grantee: &str) -> Result<(), StoreError> {
        let request = RevokeRequest {
            collection: &locator.collection,
            document: &locator.document,
            grantee,
        };

        let response = self
            .http
            .post(format!("{}/v1/acl/revoke", self.node_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_revoke_error(&Self::failure_text(response).await));
        }
        Ok(())
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
