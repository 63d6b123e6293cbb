//! Common test utilities: in-memory store, failing cache, manager builders
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use settings_manager::contract::{PageRequest, Scope, Setting, SettingType, SettingsPage};
use settings_manager::domain::{CacheBackend, CacheLayer, InMemoryTaggedCache, SettingsManager, SettingsStore};
use settings_manager::NullWritePolicy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

pub fn print_json(label: &str, value: &Value) {
    println!("   {}: {}", label, serde_json::to_string_pretty(value).unwrap());
}

// ===== Mock store =====

type RecordKey = (Option<i64>, Option<String>, String);

/// In-memory `SettingsStore` with call counters and injectable failures
#[derive(Default)]
pub struct MockSettingsStore {
    data: RwLock<HashMap<RecordKey, Setting>>,
    next_id: AtomicI64,
    fail_all: AtomicBool,
    fail_upsert_key: RwLock<Option<String>>,
    pub find_one_calls: AtomicUsize,
    pub find_many_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockSettingsStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn record_key(scope: &Scope, key: &str) -> RecordKey {
        (scope.bag_id(), scope.group().map(str::to_string), key.to_string())
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }

    /// Make every call fail
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Make upserts of one root key fail
    pub fn fail_upsert_of(&self, key: &str) {
        *self.fail_upsert_key.write() = Some(key.to_string());
    }

    /// Direct lookup, bypassing counters
    pub fn record(&self, scope: &Scope, key: &str) -> Option<Setting> {
        self.data.read().get(&Self::record_key(scope, key)).cloned()
    }

    pub fn count(&self) -> usize {
        self.data.read().len()
    }

    pub fn find_one_count(&self) -> usize {
        self.find_one_calls.load(Ordering::SeqCst)
    }

    pub fn find_many_count(&self) -> usize {
        self.find_many_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_count(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Print verbose information about store state
    pub fn print_state(&self, context: &str) {
        let data = self.data.read();
        println!("\n========== SettingsStore State: {} ==========", context);
        println!("Total settings: {}", data.len());
        for setting in data.values() {
            println!(
                "  [{}] bag={:?} group={:?} key={} type={} value={:?} cache={}",
                setting.id,
                setting.bag,
                setting.group,
                setting.key,
                setting.r#type,
                setting.value,
                setting.cacheable
            );
        }
        println!("==============================================\n");
    }
}

#[async_trait]
impl SettingsStore for MockSettingsStore {
    async fn find_one(&self, scope: &Scope, key: &str) -> anyhow::Result<Option<Setting>> {
        self.find_one_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.record(scope, key))
    }

    async fn find_many(&self, scope: &Scope, keys: &[String]) -> anyhow::Result<Vec<Setting>> {
        self.find_many_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let data = self.data.read();
        Ok(keys
            .iter()
            .filter_map(|k| data.get(&Self::record_key(scope, k)).cloned())
            .collect())
    }

    async fn upsert(
        &self,
        scope: &Scope,
        key: &str,
        r#type: SettingType,
        value: Option<String>,
        cacheable: bool,
    ) -> anyhow::Result<Setting> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.fail_upsert_key.read().as_deref() == Some(key) {
            anyhow::bail!("write rejected for {}", key);
        }

        let now = chrono::Utc::now();
        let mut data = self.data.write();
        let setting = data
            .entry(Self::record_key(scope, key))
            .and_modify(|s| {
                s.r#type = r#type.as_str().to_string();
                s.value = value.clone();
                s.updated_at = now;
            })
            .or_insert_with(|| Setting {
                id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                bag: scope.bag_id(),
                group: scope.group().map(str::to_string),
                key: key.to_string(),
                r#type: r#type.as_str().to_string(),
                value: value.clone(),
                cacheable,
                created_at: now,
                updated_at: now,
            });
        Ok(setting.clone())
    }

    async fn delete(&self, scope: &Scope, key: &str) -> anyhow::Result<bool> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.data.write().remove(&Self::record_key(scope, key)).is_some())
    }

    async fn paginate(&self, scope: &Scope, request: &PageRequest) -> anyhow::Result<SettingsPage> {
        self.check()?;
        let data = self.data.read();
        let mut rows: Vec<Setting> = data
            .values()
            .filter(|s| s.bag == scope.bag_id() && s.group.as_deref() == scope.group())
            .filter(|s| request.keys.as_ref().map_or(true, |keys| keys.contains(&s.key)))
            .filter(|s| request.cursor.map_or(true, |cursor| s.id > cursor))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.id);

        let per_page = request.per_page as usize;
        let next_cursor = if rows.len() > per_page {
            rows.truncate(per_page);
            rows.last().map(|s| s.id)
        } else {
            None
        };
        Ok(SettingsPage {
            items: rows,
            per_page: request.per_page,
            next_cursor,
        })
    }
}

// ===== Failing cache =====

/// Cache backend whose every call fails
pub struct FailingCache;

#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _tags: &[String], _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("cache down")
    }

    async fn get_many(
        &self,
        _tags: &[String],
        _keys: &[String],
    ) -> anyhow::Result<HashMap<String, String>> {
        anyhow::bail!("cache down")
    }

    async fn put(
        &self,
        _tags: &[String],
        _key: &str,
        _payload: String,
        _ttl: Duration,
    ) -> anyhow::Result<()> {
        anyhow::bail!("cache down")
    }

    async fn put_many(
        &self,
        _tags: &[String],
        _entries: Vec<(String, String)>,
        _ttl: Duration,
    ) -> anyhow::Result<()> {
        anyhow::bail!("cache down")
    }

    async fn forget(&self, _tags: &[String], _key: &str) -> anyhow::Result<bool> {
        anyhow::bail!("cache down")
    }

    async fn forget_tree(&self, _tags: &[String], _key: &str) -> anyhow::Result<u64> {
        anyhow::bail!("cache down")
    }

    async fn flush(&self, _tags: &[String]) -> anyhow::Result<u64> {
        anyhow::bail!("cache down")
    }
}

// ===== Builders =====

pub const TTL: Duration = Duration::from_secs(86_400);

/// Manager with an enabled in-memory cache; the backend is returned for inspection
pub fn cached_manager(
    store: Arc<MockSettingsStore>,
    policy: NullWritePolicy,
) -> (SettingsManager, Arc<InMemoryTaggedCache>) {
    let backend = Arc::new(InMemoryTaggedCache::new());
    let cache = CacheLayer::new(backend.clone(), true, TTL);
    (SettingsManager::new(store, cache, policy), backend)
}

/// Manager that never caches
pub fn uncached_manager(store: Arc<MockSettingsStore>) -> SettingsManager {
    SettingsManager::new(store, CacheLayer::disabled(), NullWritePolicy::Delete)
}

/// Manager whose cache backend always fails
pub fn failing_cache_manager(store: Arc<MockSettingsStore>) -> SettingsManager {
    let cache = CacheLayer::new(Arc::new(FailingCache), true, TTL);
    SettingsManager::new(store, cache, NullWritePolicy::Delete)
}
