//! Thread-safe cache of [`ParsedQuery`] values keyed by exact source text.
//!
//! Entries expire when idle for longer than `idle_timeout` or older than
//! `max_lifetime`. When the cache is full the least recently used entry is
//! evicted; recency is a monotonic access sequence, so entries touched in
//! the same millisecond still order correctly. Readers only take a shared
//! lock; access stamps are atomics.

use crate::error::ParseResult;
use crate::parsed::ParsedQuery;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Configuration for [`ParseCache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseCacheConfig {
    /// Maximum number of cached queries. `0` disables caching.
    pub capacity: usize,
    /// Evict entries not accessed for this long.
    pub idle_timeout: Duration,
    /// Evict entries older than this regardless of access.
    pub max_lifetime: Duration,
    /// Minimum time between access-triggered sweeps.
    pub sweep_interval: Duration,
}

impl Default for ParseCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            idle_timeout: Duration::from_secs(10 * 60),
            max_lifetime: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl ParseCacheConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, idle: Duration) -> Self {
        self.idle_timeout = idle;
        self
    }

    /// Set the absolute lifetime ceiling.
    pub fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the minimum interval between sweeps.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

/// Parse cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
    pub capacity: usize,
}

impl ParseCacheStats {
    /// Cache hit ratio (0.0 - 1.0). Returns 0.0 if no lookups have occurred.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    query: Arc<ParsedQuery>,
    created_ms: u64,
    last_access_ms: AtomicU64,
    last_access_seq: AtomicU64,
}

impl CacheEntry {
    fn is_expired(&self, now_ms: u64, idle_ms: u64, lifetime_ms: u64) -> bool {
        let last = self.last_access_ms.load(Ordering::Relaxed);
        now_ms.saturating_sub(self.created_ms) > lifetime_ms
            || now_ms.saturating_sub(last) > idle_ms
    }
}

/// Bounded, expiring cache of parsed queries.
#[derive(Debug)]
pub struct ParseCache {
    config: ParseCacheConfig,
    epoch: Instant,
    entries: RwLock<HashMap<String, CacheEntry>>,
    last_sweep_ms: AtomicU64,
    access_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(ParseCacheConfig::default())
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl ParseCache {
    pub fn new(config: ParseCacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_capacity(config.capacity.min(4096))),
            config,
            epoch: Instant::now(),
            last_sweep_ms: AtomicU64::new(0),
            access_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create a cache with default timeouts and the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(ParseCacheConfig::default().with_capacity(capacity))
    }

    pub fn config(&self) -> &ParseCacheConfig {
        &self.config
    }

    fn now_ms(&self) -> u64 {
        millis(self.epoch.elapsed())
    }

    fn idle_ms(&self) -> u64 {
        millis(self.config.idle_timeout)
    }

    fn lifetime_ms(&self) -> u64 {
        millis(self.config.max_lifetime)
    }

    /// Return the parsed form of `sql`, parsing and caching it on a miss.
    ///
    /// Parse errors are returned to the caller and never cached.
    pub fn parse(&self, sql: &str) -> ParseResult<Arc<ParsedQuery>> {
        if self.config.capacity == 0 {
            return ParsedQuery::parse(sql).map(Arc::new);
        }

        let now = self.now_ms();
        self.maybe_sweep(now);

        if let Some(found) = self.lookup(sql, now) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(found);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: "cqlorm.parse", sql_len = sql.len(), "parse cache miss");

        // Parse outside the lock; concurrent misses for the same text converge
        // on whichever entry is published first.
        let parsed = Arc::new(ParsedQuery::parse(sql)?);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let now = self.now_ms();
        if let Some(existing) = entries.get(sql) {
            if !existing.is_expired(now, self.idle_ms(), self.lifetime_ms()) {
                self.touch(existing, now);
                return Ok(Arc::clone(&existing.query));
            }
        }

        entries.insert(
            sql.to_string(),
            CacheEntry {
                query: Arc::clone(&parsed),
                created_ms: now,
                last_access_ms: AtomicU64::new(now),
                last_access_seq: AtomicU64::new(self.next_seq()),
            },
        );
        let evicted = self.evict_over_capacity(&mut entries, now);
        if evicted > 0 {
            self.evictions.fetch_add(evicted, Ordering::Relaxed);
        }

        Ok(parsed)
    }

    fn lookup(&self, sql: &str, now: u64) -> Option<Arc<ParsedQuery>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(sql)?;
        if entry.is_expired(now, self.idle_ms(), self.lifetime_ms()) {
            return None;
        }
        self.touch(entry, now);
        Some(Arc::clone(&entry.query))
    }

    fn touch(&self, entry: &CacheEntry, now: u64) {
        entry.last_access_ms.store(now, Ordering::Relaxed);
        entry
            .last_access_seq
            .store(self.next_seq(), Ordering::Relaxed);
    }

    fn next_seq(&self) -> u64 {
        self.access_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Drop expired entries first, then least recently used ones.
    fn evict_over_capacity(&self, entries: &mut HashMap<String, CacheEntry>, now: u64) -> u64 {
        if entries.len() <= self.config.capacity {
            return 0;
        }
        let mut evicted = self.remove_expired(entries, now);
        while entries.len() > self.config.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_access_seq.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                    evicted += 1;
                }
                None => break,
            }
        }
        evicted
    }

    fn remove_expired(&self, entries: &mut HashMap<String, CacheEntry>, now: u64) -> u64 {
        let (idle, lifetime) = (self.idle_ms(), self.lifetime_ms());
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now, idle, lifetime));
        (before - entries.len()) as u64
    }

    /// Access-triggered sweep. Skipped when another thread holds the lock.
    fn maybe_sweep(&self, now: u64) {
        let last = self.last_sweep_ms.load(Ordering::Relaxed);
        if now.saturating_sub(last) < millis(self.config.sweep_interval) {
            return;
        }
        if self
            .last_sweep_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let Ok(mut entries) = self.entries.try_write() else {
            return;
        };
        let removed = self.remove_expired(&mut entries, now);
        if removed > 0 {
            self.evictions.fetch_add(removed, Ordering::Relaxed);
            tracing::debug!(target: "cqlorm.parse", removed, "parse cache sweep");
        }
    }

    /// Remove every expired entry now. Returns the number removed.
    pub fn sweep(&self) -> u64 {
        let now = self.now_ms();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = self.remove_expired(&mut entries, now);
        self.evictions.fetch_add(removed, Ordering::Relaxed);
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of entries currently held (expired ones included until swept).
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> ParseCacheStats {
        ParseCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.config.capacity,
        }
    }
}

static DEFAULT_CACHE: OnceLock<ParseCache> = OnceLock::new();

/// The process-wide cache used by [`parse`].
pub fn default_cache() -> &'static ParseCache {
    DEFAULT_CACHE.get_or_init(ParseCache::default)
}

/// Parse `sql` through the process-wide cache.
pub fn parse(sql: &str) -> ParseResult<Arc<ParsedQuery>> {
    default_cache().parse(sql)
}
