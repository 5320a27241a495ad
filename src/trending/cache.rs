use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::clock::iso_date;
use crate::{prompts::PromptItem, store::KeyValueStore};

/// Storage key of the trending record; bump the version when the record format changes
pub const CACHE_KEY: &str = "trending_prompts.v1";
/// Oldest record still served, in milliseconds
pub const MAX_AGE_MS: i64 = 24 * 60 * 60 * 1000;

/// Persisted result of one trending computation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendingCacheRecord {
    pub prompts: Vec<PromptItem>,
    /// Generation instant, epoch milliseconds
    pub timestamp: i64,
    /// UTC calendar date of `timestamp`, `YYYY-MM-DD`
    pub date: String,
}

impl TrendingCacheRecord {
    pub fn new(prompts: Vec<PromptItem>, generated_at: DateTime<Utc>) -> Self {
        Self {
            prompts,
            timestamp: generated_at.timestamp_millis(),
            date: iso_date(generated_at),
        }
    }

    /// Milliseconds elapsed since the record was generated
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis() - self.timestamp
    }

    /// Same UTC day as `now` and no older than [`MAX_AGE_MS`]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if self.date != iso_date(now) {
            debug!(date = %self.date, "Trending record expired - different day");
            return false;
        }

        if self.age_ms(now) > MAX_AGE_MS {
            debug!(timestamp = self.timestamp, "Trending record expired - older than 24 hours");
            return false;
        }

        true
    }
}

/// The trending record inside a [`KeyValueStore`]. Every operation fails soft: problems are
/// logged and the caller sees a cache miss or a no-op.
pub struct TrendingCache<S: KeyValueStore> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TrendingCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, CACHE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn read(&self) -> Option<TrendingCacheRecord> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(%e, key = %self.key, "Error reading cached trending prompts");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                error!(%e, key = %self.key, "Error parsing cached trending prompts");
                None
            }
        }
    }

    pub fn write(&self, record: &TrendingCacheRecord) {
        let raw = match serde_json::to_string(record) {
            Ok(raw) => raw,
            Err(e) => {
                error!(%e, "Error serializing trending prompts");
                return;
            }
        };

        match self.store.set(&self.key, &raw) {
            Ok(()) => info!(
                count = record.prompts.len(),
                date = %record.date,
                "Cached trending prompts"
            ),
            Err(e) => error!(%e, key = %self.key, "Error caching trending prompts"),
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.delete(&self.key) {
            error!(%e, key = %self.key, "Error clearing cached trending prompts");
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        prompts::tests::prompts,
        store::{MemoryStore, StoreError},
        trending::clock::{Clock, tests::FixedClock},
    };

    /// Store whose every operation fails
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Location("broken".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Location("broken".to_string()))
        }

        fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Location("broken".to_string()))
        }
    }

    #[test]
    fn record_carries_date_of_timestamp() {
        let clock = FixedClock::at(2024, 1, 15, 10);
        let record = TrendingCacheRecord::new(prompts(2), clock.now());

        assert_eq!(record.date, "2024-01-15");
        assert_eq!(record.timestamp, clock.now().timestamp_millis());
    }

    #[test]
    fn valid_on_the_same_day() {
        let clock = FixedClock::at(2024, 1, 15, 1);
        let record = TrendingCacheRecord::new(prompts(2), clock.now());

        clock.advance(Duration::hours(22));
        assert!(record.is_valid(clock.now()));
    }

    #[test]
    fn yesterday_is_rejected_even_when_young() {
        let clock = FixedClock::at(2024, 1, 15, 23);
        let record = TrendingCacheRecord::new(prompts(2), clock.now());

        clock.advance(Duration::hours(2));
        assert!(record.age_ms(clock.now()) < MAX_AGE_MS);
        assert!(!record.is_valid(clock.now()));
    }

    #[test]
    fn older_than_a_day_is_rejected_even_with_todays_date() {
        let clock = FixedClock::at(2024, 1, 15, 12);
        let mut record = TrendingCacheRecord::new(prompts(2), clock.now());
        record.timestamp -= 25 * 60 * 60 * 1000;

        assert_eq!(record.date, iso_date(clock.now()));
        assert!(!record.is_valid(clock.now()));
    }

    #[test]
    fn write_read_clear() {
        let clock = FixedClock::at(2024, 1, 15, 12);
        let cache = TrendingCache::new(MemoryStore::new());
        let record = TrendingCacheRecord::new(prompts(3), clock.now());

        assert!(cache.read().is_none());
        cache.write(&record);
        assert_eq!(cache.read(), Some(record));

        cache.clear();
        assert!(cache.read().is_none());
        cache.clear();
    }

    #[test]
    fn garbage_is_a_miss() {
        let store = MemoryStore::new();
        store.set(CACHE_KEY, "{not json").expect("seed store");

        let cache = TrendingCache::new(&store);
        assert!(cache.read().is_none());
    }

    #[test]
    fn broken_store_fails_soft() {
        let clock = FixedClock::at(2024, 1, 15, 12);
        let cache = TrendingCache::new(BrokenStore);

        cache.write(&TrendingCacheRecord::new(prompts(1), clock.now()));
        assert!(cache.read().is_none());
        cache.clear();
    }

    #[test]
    fn keys_are_isolated() {
        let clock = FixedClock::at(2024, 1, 15, 12);
        let store = MemoryStore::new();
        let old = TrendingCache::with_key(&store, "trending_prompts.v0");
        old.write(&TrendingCacheRecord::new(prompts(1), clock.now()));

        let current = TrendingCache::new(&store);
        assert!(current.read().is_none());
    }
}
