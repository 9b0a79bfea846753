use std::collections::HashMap;

use chrono::{DateTime, Utc};
use fissales_core::{CacheStats, LoadedFrom, PromptRecord};
use tokio::sync::RwLock;

struct CacheEntry {
    record: PromptRecord,
    last_accessed: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// In-process prompt cache keyed by prompt name.
///
/// Unbounded and without expiry: an entry lives until it is replaced, deleted,
/// or the cache is cleared. Hit and miss counters are aggregate for the whole
/// instance and only [`clear`](PromptCache::clear) resets them.
///
/// Every operation takes the internal lock once, so operations never
/// interleave. None of them can fail.
pub struct PromptCache {
    state: RwLock<CacheState>,
}

impl PromptCache {
    /// Create an empty cache with zeroed counters.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Look up `name`.
    ///
    /// A hit refreshes the entry's last-access time and returns a copy tagged
    /// [`LoadedFrom::Cache`]. A miss only bumps the miss counter.
    pub async fn get(&self, name: &str) -> Option<PromptRecord> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        match state.entries.get_mut(name) {
            Some(entry) => {
                entry.last_accessed = Utc::now();
                let record = entry.record.clone().loaded_from(LoadedFrom::Cache);
                state.hits += 1;
                tracing::debug!(prompt = %name, "prompt cache hit");
                Some(record)
            }
            None => {
                state.misses += 1;
                tracing::debug!(prompt = %name, "prompt cache miss");
                None
            }
        }
    }

    /// Insert or wholesale replace the entry for `name`.
    ///
    /// The stored copy always carries `name` as its record name, so a record
    /// can never be served under another prompt's key.
    pub async fn set(&self, name: &str, record: &PromptRecord) {
        let mut stored = record.clone().loaded_from(LoadedFrom::Cache);
        if stored.name != name {
            tracing::warn!(
                prompt = %name,
                record_name = %stored.name,
                "record name differs from cache key, storing under the key"
            );
            stored.name = name.to_string();
        }

        let mut state = self.state.write().await;
        state.entries.insert(
            name.to_string(),
            CacheEntry {
                record: stored,
                last_accessed: Utc::now(),
            },
        );
        tracing::debug!(prompt = %name, version = record.version, "prompt cached");
    }

    /// Remove the entry for `name`, returning whether one was present.
    pub async fn delete(&self, name: &str) -> bool {
        let mut state = self.state.write().await;
        let removed = state.entries.remove(name).is_some();
        if removed {
            tracing::debug!(prompt = %name, "prompt evicted from cache");
        }
        removed
    }

    /// Drop every entry and reset the hit/miss counters.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        let dropped = state.entries.len();
        *state = CacheState::default();
        tracing::debug!(dropped, "prompt cache cleared");
    }

    /// Snapshot size, keys, last-access times and hit rate.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        let last_accessed = state
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), e.last_accessed))
            .collect();

        CacheStats {
            size: state.entries.len(),
            keys,
            last_accessed,
            hit_rate: CacheStats::compute_hit_rate(state.hits, state.misses),
            hits: state.hits,
            misses: state.misses,
        }
    }

    /// Number of cached prompts.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Whether the cache holds no prompts.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Whether `name` is cached. Unlike [`get`](PromptCache::get) this is not
    /// counted as a lookup.
    pub async fn contains(&self, name: &str) -> bool {
        self.state.read().await.entries.contains_key(name)
    }
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::new()
    }
}
