//! Tagged, TTL-based settings cache
//!
//! Entries are keyed by `settings:<dotted key>` inside the namespace formed by
//! the scope's ordered tag list. Flushing a tag set drops every entry whose
//! tags contain all of them, so flushing a bag also drops its groups.
//!
//! The cache never fails an operation: backend errors are logged and reads
//! degrade to misses.

use crate::contract::Scope;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Prefix of every settings cache key
pub const CACHE_KEY_PREFIX: &str = "settings:";

/// Default time-to-live of cache entries (one day)
pub const DEFAULT_TTL: Duration = Duration::from_secs(86_400);

/// Minimum time between two expiry sweeps triggered by writes
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Discriminated cache payload: type tag plus encoded value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum CachedValue {
    String(String),
    Integer(Number),
    Float(f64),
    Boolean(bool),
    Array(Value),
}

impl CachedValue {
    /// Wrap a value, `None` for `Null` which is never cached
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => Some(Self::Float(f)),
                _ => Some(Self::Integer(n.clone())),
            },
            Value::Object(_) | Value::Array(_) => Some(Self::Array(value.clone())),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::String(s) => Value::String(s),
            Self::Integer(n) => Value::Number(n),
            Self::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(b),
            Self::Array(v) => v,
        }
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Storage behind the cache layer
///
/// Keys are namespaced by the ordered `tags`; two scopes with different tag
/// lists never see each other's entries.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Read one entry
    async fn get(&self, tags: &[String], key: &str) -> Result<Option<String>>;

    /// Read several entries, omitting absent ones
    async fn get_many(&self, tags: &[String], keys: &[String]) -> Result<HashMap<String, String>>;

    /// Store one entry
    async fn put(&self, tags: &[String], key: &str, payload: String, ttl: Duration) -> Result<()>;

    /// Store several entries
    async fn put_many(
        &self,
        tags: &[String],
        entries: Vec<(String, String)>,
        ttl: Duration,
    ) -> Result<()>;

    /// Remove one entry
    async fn forget(&self, tags: &[String], key: &str) -> Result<bool>;

    /// Remove `key` and every entry whose key continues with `key.`
    async fn forget_tree(&self, tags: &[String], key: &str) -> Result<u64>;

    /// Remove every entry tagged with all of `tags`
    async fn flush(&self, tags: &[String]) -> Result<u64>;
}

struct Entry {
    key: String,
    tags: Vec<String>,
    payload: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Process-local tagged cache backend
///
/// Expired entries are dropped when a read finds them, and writes sweep the
/// whole map at most once per [`SWEEP_INTERVAL`].
#[derive(Default)]
pub struct InMemoryTaggedCache {
    entries: RwLock<HashMap<String, Entry>>,
    last_sweep: Mutex<Option<Instant>>,
}

impl InMemoryTaggedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop expired entries
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }

    fn slot(tags: &[String], key: &str) -> String {
        format!("{}#{}", tags.join("|"), key)
    }

    fn sweep_if_due(&self, now: Instant) {
        {
            let mut last = self.last_sweep.lock();
            match *last {
                Some(at) if now.duration_since(at) < SWEEP_INTERVAL => return,
                _ => *last = Some(now),
            }
        }
        let dropped = self.purge_expired();
        if dropped > 0 {
            tracing::trace!(dropped, "Expired settings cache entries swept");
        }
    }

    fn evict_dead(&self, slots: &[String], now: Instant) {
        if slots.is_empty() {
            return;
        }
        let mut entries = self.entries.write();
        for slot in slots {
            // Another writer may have refreshed the slot meanwhile
            if entries.get(slot).is_some_and(|e| !e.is_live(now)) {
                entries.remove(slot);
            }
        }
    }

    fn insert(&self, tags: &[String], key: String, payload: String, ttl: Duration) {
        let entry = Entry {
            tags: tags.to_vec(),
            payload,
            expires_at: Instant::now() + ttl,
            key,
        };
        self.entries
            .write()
            .insert(Self::slot(tags, &entry.key), entry);
    }
}

#[async_trait]
impl CacheBackend for InMemoryTaggedCache {
    async fn get(&self, tags: &[String], key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let slot = Self::slot(tags, key);
        let expired = match self.entries.read().get(&slot) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.payload.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.evict_dead(&[slot], now);
        }
        Ok(None)
    }

    async fn get_many(&self, tags: &[String], keys: &[String]) -> Result<HashMap<String, String>> {
        let now = Instant::now();
        let mut found = HashMap::new();
        let mut dead = Vec::new();
        {
            let entries = self.entries.read();
            for key in keys {
                let slot = Self::slot(tags, key);
                match entries.get(&slot) {
                    Some(entry) if entry.is_live(now) => {
                        found.insert(key.clone(), entry.payload.clone());
                    }
                    Some(_) => dead.push(slot),
                    None => {}
                }
            }
        }
        self.evict_dead(&dead, now);
        Ok(found)
    }

    async fn put(&self, tags: &[String], key: &str, payload: String, ttl: Duration) -> Result<()> {
        self.sweep_if_due(Instant::now());
        self.insert(tags, key.to_string(), payload, ttl);
        Ok(())
    }

    async fn put_many(
        &self,
        tags: &[String],
        entries: Vec<(String, String)>,
        ttl: Duration,
    ) -> Result<()> {
        self.sweep_if_due(Instant::now());
        for (key, payload) in entries {
            self.insert(tags, key, payload, ttl);
        }
        Ok(())
    }

    async fn forget(&self, tags: &[String], key: &str) -> Result<bool> {
        Ok(self.entries.write().remove(&Self::slot(tags, key)).is_some())
    }

    async fn forget_tree(&self, tags: &[String], key: &str) -> Result<u64> {
        let descendant_prefix = format!("{}.", key);
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| {
            !(e.tags == tags && (e.key == key || e.key.starts_with(&descendant_prefix)))
        });
        Ok((before - entries.len()) as u64)
    }

    async fn flush(&self, tags: &[String]) -> Result<u64> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| !tags.iter().all(|t| e.tags.contains(t)));
        Ok((before - entries.len()) as u64)
    }
}

/// Scope-aware cache facade used by the settings manager
///
/// Every operation is a no-op returning nothing when the cache is disabled.
#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn CacheBackend>,
    enabled: bool,
    ttl: Duration,
}

impl CacheLayer {
    pub fn new(backend: Arc<dyn CacheBackend>, enabled: bool, ttl: Duration) -> Self {
        Self {
            backend,
            enabled,
            ttl,
        }
    }

    /// A layer that never stores anything
    pub fn disabled() -> Self {
        Self::new(Arc::new(InMemoryTaggedCache::new()), false, DEFAULT_TTL)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key of a dotted settings key
    pub fn cache_key(full_key: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, full_key)
    }

    /// Store `value` for `full_key`; `Null` forgets the entry instead.
    pub async fn set(&self, scope: &Scope, full_key: &str, value: &Value, ttl: Option<Duration>) {
        if !self.enabled {
            return;
        }
        let Some(cached) = CachedValue::from_value(value) else {
            self.forget(scope, full_key).await;
            return;
        };
        let payload = match cached.encode() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = full_key, error = %e, "Failed to encode cache payload");
                return;
            }
        };
        let ttl = ttl.unwrap_or(self.ttl);
        if let Err(e) = self
            .backend
            .put(scope.tags(), &Self::cache_key(full_key), payload, ttl)
            .await
        {
            tracing::warn!(key = full_key, %scope, error = %e, "Cache write failed");
        }
    }

    /// Read `full_key`, `None` on miss or on any backend failure
    pub async fn get(&self, scope: &Scope, full_key: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        match self.backend.get(scope.tags(), &Self::cache_key(full_key)).await {
            Ok(Some(payload)) => decode_payload(full_key, &payload),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = full_key, %scope, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Read several keys; only present entries are returned
    pub async fn get_many(&self, scope: &Scope, full_keys: &[String]) -> HashMap<String, Value> {
        if !self.enabled || full_keys.is_empty() {
            return HashMap::new();
        }
        let cache_keys: Vec<String> = full_keys.iter().map(|k| Self::cache_key(k)).collect();
        let found = match self.backend.get_many(scope.tags(), &cache_keys).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(%scope, error = %e, "Cache batch read failed, treating as miss");
                return HashMap::new();
            }
        };
        full_keys
            .iter()
            .zip(cache_keys.iter())
            .filter_map(|(full_key, cache_key)| {
                let payload = found.get(cache_key)?;
                decode_payload(full_key, payload).map(|v| (full_key.clone(), v))
            })
            .collect()
    }

    /// Store several entries in one backend call; `Null` values are skipped
    pub async fn set_many(&self, scope: &Scope, values: &[(String, Value)], ttl: Option<Duration>) {
        if !self.enabled || values.is_empty() {
            return;
        }
        let entries: Vec<(String, String)> = values
            .iter()
            .filter_map(|(key, value)| {
                let payload = CachedValue::from_value(value)?.encode().ok()?;
                Some((Self::cache_key(key), payload))
            })
            .collect();
        let ttl = ttl.unwrap_or(self.ttl);
        if let Err(e) = self.backend.put_many(scope.tags(), entries, ttl).await {
            tracing::warn!(%scope, error = %e, "Cache batch write failed");
        }
    }

    /// Drop the entry of one dotted key
    pub async fn forget(&self, scope: &Scope, full_key: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.backend.forget(scope.tags(), &Self::cache_key(full_key)).await {
            tracing::warn!(key = full_key, %scope, error = %e, "Cache forget failed");
        }
    }

    /// Drop the entry of a root key and of every dotted key below it
    pub async fn forget_root(&self, scope: &Scope, root: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.backend.forget_tree(scope.tags(), &Self::cache_key(root)).await {
            tracing::warn!(key = root, %scope, error = %e, "Cache invalidation failed");
        }
    }

    /// Drop every entry written under the scope's tags
    pub async fn flush(&self, scope: &Scope) {
        if !self.enabled {
            return;
        }
        match self.backend.flush(scope.tags()).await {
            Ok(dropped) => tracing::debug!(%scope, dropped, "Settings cache flushed"),
            Err(e) => tracing::warn!(%scope, error = %e, "Cache flush failed"),
        }
    }
}

fn decode_payload(full_key: &str, payload: &str) -> Option<Value> {
    match CachedValue::decode(payload) {
        Ok(cached) => Some(cached.into_value()),
        Err(e) => {
            tracing::warn!(key = full_key, error = %e, "Undecodable cache payload, treating as miss");
            None
        }
    }
}
