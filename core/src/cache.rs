// core/src/cache.rs

//! Best-effort TTL cache used for read-through response caching.
//!
//! Entries are not kept consistent with the store; a reader may see data up to
//! one TTL old. Writers that need fresh data call `invalidate` first.
//!
//! Keys come from clients (query strings, session keys), so expired entries are
//! swept from the write path at most once per TTL.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{event, Level};

use crate::error::Result;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<V> {
  value: V,
  expires_at: Instant,
}

pub struct TtlCache<V> {
  entries: RwLock<HashMap<String, CacheEntry<V>>>,
  ttl: Duration,
  last_sweep: Mutex<Instant>,
}

impl<V: Clone> TtlCache<V> {
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
      ttl,
      last_sweep: Mutex::new(Instant::now()),
    }
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Returns a live entry. Expired entries are treated as absent and left for
  /// the next sweep to drop.
  pub fn get(&self, key: &str) -> Option<V> {
    let entries = self.entries.read();
    entries
      .get(key)
      .filter(|entry| entry.expires_at > Instant::now())
      .map(|entry| entry.value.clone())
  }

  pub fn insert(&self, key: impl Into<String>, value: V) {
    let now = Instant::now();
    let entry = CacheEntry {
      value,
      expires_at: now + self.ttl,
    };
    let mut entries = self.entries.write();
    let mut last_sweep = self.last_sweep.lock();
    if now.saturating_duration_since(*last_sweep) >= self.ttl {
      let before = entries.len();
      entries.retain(|_, entry| entry.expires_at > now);
      *last_sweep = now;
      event!(Level::DEBUG, dropped = before - entries.len(), "Swept expired cache entries.");
    }
    drop(last_sweep);
    entries.insert(key.into(), entry);
  }

  pub fn invalidate(&self, key: &str) {
    self.entries.write().remove(key);
  }

  pub fn purge_expired(&self) {
    let now = Instant::now();
    let mut entries = self.entries.write();
    entries.retain(|_, entry| entry.expires_at > now);
    *self.last_sweep.lock() = now;
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Cache-aside read: returns the cached value for `key`, or runs `load`,
  /// stores its result and returns it. Errors are never cached.
  pub async fn get_or_try_insert_with<F, Fut>(&self, key: &str, load: F) -> Result<V>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V>>,
  {
    if let Some(hit) = self.get(key) {
      event!(Level::DEBUG, cache_key = %key, "Cache hit.");
      return Ok(hit);
    }
    event!(Level::DEBUG, cache_key = %key, "Cache miss.");
    let value = load().await?;
    self.insert(key, value.clone());
    Ok(value)
  }
}

impl<V: Clone> Default for TtlCache<V> {
  fn default() -> Self {
    Self::new(DEFAULT_TTL)
  }
}
