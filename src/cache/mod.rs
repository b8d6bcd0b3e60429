// Vaultlink — Record Cache
//
// Holds the most recent full snapshot of the caller's records, time-boxed to
// a fixed TTL. Pure data holder: no network access, no background expiry —
// staleness is checked lazily on each read. The snapshot and its timestamp
// live in a single Option so presence and age cannot disagree, and the Mutex
// guarantees readers only ever observe whole snapshots.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::store::Record;

/// How long a snapshot stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Snapshot {
    records: Vec<Record>,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct RecordCache {
    inner: Mutex<Option<Snapshot>>,
    ttl: Duration,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(None),
            ttl,
        }
    }

    /// The cached records, or `None` when no snapshot exists or it has
    /// outlived the TTL.
    pub fn get(&self) -> Option<Vec<Record>> {
        let guard = self.inner.lock().unwrap();
        match guard.as_ref() {
            Some(snapshot) if snapshot.fetched_at.elapsed() < self.ttl => {
                tracing::debug!(count = snapshot.records.len(), "Cache hit");
                Some(snapshot.records.clone())
            }
            Some(_) => {
                tracing::debug!("Cache expired");
                None
            }
            None => None,
        }
    }

    /// Replace the snapshot wholesale and restart its clock.
    pub fn set(&self, records: Vec<Record>) {
        let mut guard = self.inner.lock().unwrap();
        *guard = Some(Snapshot {
            records,
            fetched_at: Instant::now(),
        });
    }

    /// Drop the snapshot entirely. Called after any successful mutation.
    pub fn invalidate(&self) {
        let mut guard = self.inner.lock().unwrap();
        if guard.take().is_some() {
            tracing::debug!("Cache invalidated");
        }
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Locator, SecretValue};
    use chrono::Utc;
    use uuid::Uuid;

    fn records(labels: &[&str]) -> Vec<Record> {
        labels
            .iter()
            .map(|label| {
                Record::new(
                    Uuid::new_v4(),
                    "did:vault:owner".to_string(),
                    label.to_string(),
                    SecretValue::new("s3cret"),
                    Locator::new("col", Uuid::new_v4().to_string()),
                    Utc::now(),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = RecordCache::new();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_snapshot_within_ttl_is_served() {
        let cache = RecordCache::new();
        cache.set(records(&["a.com", "b.com"]));

        let cached = cache.get().expect("snapshot should be valid");
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].label, "a.com");
    }

    #[test]
    fn test_expired_snapshot_misses() {
        // A zero TTL expires immediately: elapsed() is never < 0.
        let cache = RecordCache::with_ttl(Duration::ZERO);
        cache.set(records(&["a.com"]));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_invalidate_drops_snapshot() {
        let cache = RecordCache::new();
        cache.set(records(&["a.com"]));
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cache = RecordCache::new();
        cache.set(records(&["a.com", "b.com"]));
        cache.set(records(&["c.com"]));

        let cached = cache.get().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].label, "c.com");
    }

    #[test]
    fn test_set_restarts_clock() {
        let cache = RecordCache::with_ttl(Duration::from_secs(60));
        cache.set(records(&["a.com"]));
        cache.set(records(&["b.com"]));
        assert!(cache.get().is_some());
    }

    #[test]
    fn test_invalidate_on_empty_cache_is_harmless() {
        let cache = RecordCache::new();
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
