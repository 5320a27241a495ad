use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::{
    TRENDING_COUNT,
    cache::{TrendingCache, TrendingCacheRecord},
    clock::{Clock, date_seed, iso_date},
    sampler::select_trending,
};
use crate::{prompts::PromptItem, store::KeyValueStore};

const MS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// Diagnostics about the stored trending record
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    pub has_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Whole hours since generation, rounded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
}

/// The selection for the UTC day of `now`. Both the cached and the server path go through
/// here, so they agree for the same day and collection.
pub fn daily_selection(all: &[PromptItem], now: DateTime<Utc>, count: usize) -> Vec<PromptItem> {
    select_trending(all, count, &date_seed(now))
}

/// Server-side trending: no storage, same output as [`TrendingService::get_trending`] on the
/// same day
pub fn server_trending(all: &[PromptItem], now: DateTime<Utc>) -> Vec<PromptItem> {
    let selected = daily_selection(all, now, TRENDING_COUNT);
    info!(date = %iso_date(now), count = selected.len(), "Generated deterministic trending prompts");
    selected
}

/// Daily trending prompts backed by a device-local cache
pub struct TrendingService<S: KeyValueStore> {
    cache: TrendingCache<S>,
    clock: Arc<dyn Clock>,
    count: usize,
}

impl<S: KeyValueStore> TrendingService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TrendingCache::new(store),
            clock,
            count: TRENDING_COUNT,
        }
    }

    /// Today's cached selection, or a freshly generated and cached one
    pub fn get_trending(&self, all: &[PromptItem]) -> Vec<PromptItem> {
        let now = self.clock.now();

        if let Some(cached) = self.cache.read().filter(|record| record.is_valid(now)) {
            info!(date = %cached.date, "Using cached trending prompts");
            return cached.prompts;
        }

        info!("Generating new trending prompts");
        let selected = daily_selection(all, now, self.count);
        self.cache
            .write(&TrendingCacheRecord::new(selected.clone(), now));
        selected
    }

    /// Drop the stored record and generate again
    pub fn refresh_trending(&self, all: &[PromptItem]) -> Vec<PromptItem> {
        info!("Force refreshing trending prompts");
        self.cache.clear();
        self.get_trending(all)
    }

    pub fn cache_info(&self) -> CacheInfo {
        match self.cache.read() {
            Some(record) => {
                let age = record.age_ms(self.clock.now()) as f64 / MS_PER_HOUR;
                CacheInfo {
                    has_cache: true,
                    date: Some(record.date),
                    // Halves round up, also for negative ages after clock skew
                    age: Some((age + 0.5).floor() as i64),
                }
            }
            None => CacheInfo {
                has_cache: false,
                date: None,
                age: None,
            },
        }
    }
}
