// Vaultlink — Record Service
//
// Implements the six record operations (list/get/save/remove/grant/revoke)
// plus a fresh single-record read, composing the identity provider, the
// store client and the cache. Constructed once at process start with its
// dependencies injected, and shared by reference with every caller.
//
// Cache discipline: `list_for_site` is the only reader; any successful
// `save` or `remove` drops the snapshot wholesale; `get_by_label` and
// `read_secret` always bypass the cache so autofill and copy see fresh
// store state.

use std::cmp::Ordering;

use thiserror::Error;

use crate::cache::RecordCache;
use crate::identity::{IdentityError, IdentityProvider};
use crate::store::{composite_name, Locator, Record, RecordStore, SecretValue, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct RecordService<S, I> {
    store: S,
    identity: I,
    cache: RecordCache,
}

impl<S: RecordStore, I: IdentityProvider> RecordService<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self::with_cache(store, identity, RecordCache::new())
    }

    pub fn with_cache(store: S, identity: I, cache: RecordCache) -> Self {
        Self {
            store,
            identity,
            cache,
        }
    }

    /// All records visible to the caller, ordered for display: records whose
    /// label equals `current_site` first, everything else by ascending label.
    ///
    /// This boundary never fails — any unhandled error is logged and yields
    /// an empty sequence, so a popup can always render. Callers that must
    /// distinguish "no records" from "failed to fetch" use
    /// [`try_list_for_site`](Self::try_list_for_site).
    pub async fn list_for_site(&self, current_site: Option<&str>, force_refresh: bool) -> Vec<Record> {
        match self.try_list_for_site(current_site, force_refresh).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(error = %err, "Failed to list records — returning empty set");
                Vec::new()
            }
        }
    }

    /// Fallible listing: serves the cached snapshot while it is valid (unless
    /// `force_refresh`), otherwise re-enumerates the store and replaces the
    /// snapshot wholesale.
    pub async fn try_list_for_site(
        &self,
        current_site: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<Record>, ServiceError> {
        let cached = if force_refresh { None } else { self.cache.get() };
        let mut records = match cached {
            Some(records) => records,
            None => self.refresh().await?,
        };
        sort_for_site(&mut records, current_site);
        Ok(records)
    }

    /// Re-enumerate the store and rebuild the snapshot. A record that fails
    /// to read is skipped, not fatal to the refresh.
    async fn refresh(&self) -> Result<Vec<Record>, ServiceError> {
        let identity = self.identity.resolve()?;
        let locators = self.store.list_locators(identity.did()).await?;

        let mut records = Vec::with_capacity(locators.len());
        for locator in &locators {
            match self.store.read(locator).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(%locator, error = %err, "Skipping unreadable record");
                }
            }
        }

        self.cache.set(records.clone());
        tracing::debug!(count = records.len(), "Record snapshot refreshed");
        Ok(records)
    }

    /// Look up the caller's record for `label` by fresh enumeration — the
    /// cache is never consulted here. Returns the first record whose
    /// composite name matches; duplicate labels are possible and the match
    /// order is the network's enumeration order. Unrelated read failures are
    /// skipped, not fatal.
    pub async fn get_by_label(&self, label: &str) -> Result<Option<Record>, ServiceError> {
        let identity = self.identity.resolve()?;
        let wanted = composite_name(identity.did(), label);
        let locators = self.store.list_locators(identity.did()).await?;

        for locator in &locators {
            match self.store.read(locator).await {
                Ok(record) if record.composite_name() == wanted => return Ok(Some(record)),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(%locator, error = %err, "Skipping unreadable record during lookup");
                }
            }
        }
        Ok(None)
    }

    /// Create a record for `label`. No uniqueness check is performed — saving
    /// the same label twice stores two records. Invalidates the snapshot on
    /// success; the new record is not merged into it.
    pub async fn save(&self, label: &str, secret: SecretValue) -> Result<Locator, ServiceError> {
        let identity = self.identity.resolve()?;
        let locator = self.store.create(identity.did(), label, &secret).await?;
        self.cache.invalidate();
        tracing::info!(%locator, label, "Record created");
        Ok(locator)
    }

    /// Delete a record. Invalidates the snapshot on success.
    pub async fn remove(&self, locator: &Locator) -> Result<(), ServiceError> {
        self.store.delete(locator).await?;
        self.cache.invalidate();
        tracing::info!(%locator, "Record removed");
        Ok(())
    }

    /// Grant `grantee` read+write+execute on a record. Grants do not change
    /// the caller's own record set, so the cache is untouched.
    pub async fn grant_access(&self, locator: &Locator, grantee: &str) -> Result<(), ServiceError> {
        self.store.grant(locator, grantee).await?;
        tracing::info!(%locator, grantee, "Access granted");
        Ok(())
    }

    /// Revoke a previously granted permission. No cache interaction.
    pub async fn revoke_access(&self, locator: &Locator, grantee: &str) -> Result<(), ServiceError> {
        self.store.revoke(locator, grantee).await?;
        tracing::info!(%locator, grantee, "Access revoked");
        Ok(())
    }

    /// Read one record's secret directly from the store, bypassing the
    /// cache, so copy-to-clipboard always sees current data.
    pub async fn read_secret(&self, locator: &Locator) -> Result<SecretValue, ServiceError> {
        let record = self.store.read(locator).await?;
        Ok(record.into_secret())
    }
}

/// Records whose label equals `current_site` sort first; all others by
/// ascending label. The sort is stable, so several current-site matches keep
/// their original relative order.
fn sort_for_site(records: &mut [Record], current_site: Option<&str>) {
    records.sort_by(|a, b| match current_site {
        Some(site) => {
            let a_current = a.label == site;
            let b_current = b.label == site;
            match (a_current, b_current) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.label.cmp(&b.label),
            }
        }
        None => a.label.cmp(&b.label),
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────
