//! Settings manager - scope, path and cache orchestration

use crate::config::{Config, NullWritePolicy};
use crate::contract::{PageRequest, Scope, Setting, SettingType, SettingsError, SettingsPage};
use super::cache::CacheLayer;
use super::coercion::{coerce_on_read, encode_on_write};
use super::path::{deep_get, deep_remove, deep_set, empty_structure, KeyPath};
use super::repository::SettingsStore;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Scoped handle over the settings store and cache
///
/// A handle is bound to one [`Scope`]. `bag()` and `general()` return a new
/// handle sharing the same store and cache, so handles can be created per
/// request and never race on scope state.
#[derive(Clone)]
pub struct SettingsManager {
    store: Arc<dyn SettingsStore>,
    cache: CacheLayer,
    null_write: NullWritePolicy,
    scope: Scope,
}

impl SettingsManager {
    /// Create a manager in the general scope
    pub fn new(store: Arc<dyn SettingsStore>, cache: CacheLayer, null_write: NullWritePolicy) -> Self {
        Self {
            store,
            cache,
            null_write,
            scope: Scope::general(),
        }
    }

    /// Create a manager from module configuration
    pub fn from_config(store: Arc<dyn SettingsStore>, cache: CacheLayer, config: &Config) -> Self {
        Self::new(store, cache, config.null_write)
    }

    // ===== Scope =====

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Handle for a bag, optionally narrowed to a group
    pub fn bag(&self, bag: i64, group: Option<&str>) -> Self {
        self.with_scope(Scope::bag(bag, group))
    }

    /// Handle for the general scope
    pub fn general(&self) -> Self {
        self.with_scope(Scope::general())
    }

    pub fn with_scope(&self, scope: Scope) -> Self {
        Self {
            scope,
            ..self.clone()
        }
    }

    // ===== Reads =====

    /// Resolve a key, `None` when absent
    pub async fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        let path = KeyPath::parse(key)?;

        if let Some(hit) = self.cache.get(&self.scope, path.full()).await {
            tracing::debug!(key, scope = %self.scope, "Settings cache hit");
            return Ok(Some(hit));
        }
        tracing::debug!(key, scope = %self.scope, "Settings cache miss");

        let Some(setting) = self.store.find_one(&self.scope, path.root()).await? else {
            return Ok(None);
        };
        let Some(resolved) = resolve(&setting, &path) else {
            return Ok(None);
        };

        if setting.cacheable {
            self.cache.set(&self.scope, path.full(), &resolved, None).await;
        }
        Ok(Some(resolved))
    }

    /// Resolve a key, falling back to `default` when absent
    pub async fn get_or(&self, key: &str, default: Value) -> Result<Value, SettingsError> {
        Ok(self.get(key).await?.unwrap_or(default))
    }

    /// Resolve several keys; absent keys are left out of the result.
    ///
    /// The cache answers alone only when it holds every requested key.
    /// Otherwise the store is consulted and its results win over cached ones.
    pub async fn get_many<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<HashMap<String, Value>, SettingsError> {
        let paths = keys
            .iter()
            .map(|k| KeyPath::parse(k.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()?;
        let full_keys: Vec<String> = paths.iter().map(|p| p.full().to_string()).collect();

        let mut resolved = self.cache.get_many(&self.scope, &full_keys).await;
        if resolved.len() == full_keys.len() {
            tracing::debug!(count = full_keys.len(), scope = %self.scope, "Settings batch served from cache");
            return Ok(resolved);
        }

        let roots: Vec<String> = paths
            .iter()
            .map(|p| p.root().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let settings = self.store.find_many(&self.scope, &roots).await?;
        let by_root: HashMap<&str, &Setting> =
            settings.iter().map(|s| (s.key.as_str(), s)).collect();

        let mut fresh = Vec::new();
        for path in &paths {
            let Some(setting) = by_root.get(path.root()) else {
                continue;
            };
            let Some(value) = resolve(setting, path) else {
                continue;
            };
            if setting.cacheable {
                fresh.push((path.full().to_string(), value.clone()));
            }
            resolved.insert(path.full().to_string(), value);
        }

        self.cache.set_many(&self.scope, &fresh, None).await;
        Ok(resolved)
    }

    /// List stored records of the current scope.
    ///
    /// `per_page` must be at least 1 and fit a signed 64-bit row count.
    pub async fn list(&self, request: &PageRequest) -> Result<SettingsPage, SettingsError> {
        if request.per_page == 0 || i64::try_from(request.per_page).is_err() {
            return Err(SettingsError::validation(format!(
                "per_page out of range: {}",
                request.per_page
            )));
        }
        Ok(self.store.paginate(&self.scope, request).await?)
    }

    // ===== Writes =====

    /// Write a value and cache it. `Value::Null` deletes.
    pub async fn set(&self, key: &str, value: Value) -> Result<Value, SettingsError> {
        self.set_with(key, value, true).await
    }

    /// Write a value.
    ///
    /// A dotted key merges the value into the structure stored under its root
    /// key; siblings are preserved. Returns what was persisted: the merged
    /// structure for dotted keys, the value itself otherwise.
    pub async fn set_with(
        &self,
        key: &str,
        value: Value,
        save_in_cache: bool,
    ) -> Result<Value, SettingsError> {
        let path = KeyPath::parse(key)?;

        if value.is_null() {
            self.write_null(&path).await?;
            return Ok(Value::Null);
        }

        let existing = self.store.find_one(&self.scope, path.root()).await?;
        let cacheable = existing.as_ref().map_or(save_in_cache, |s| s.cacheable);

        let persisted = match path.nested() {
            Some(nested) => deep_set(current_structure(existing.as_ref()), nested, value.clone()),
            None => value.clone(),
        };
        let ty = SettingType::infer(&persisted, path.is_nested());

        self.store
            .upsert(
                &self.scope,
                path.root(),
                ty,
                encode_on_write(&persisted),
                cacheable,
            )
            .await?;

        self.cache.forget_root(&self.scope, path.root()).await;
        if save_in_cache && cacheable {
            self.cache.set(&self.scope, path.full(), &value, None).await;
        }

        Ok(persisted)
    }

    /// Write several values in the given order.
    ///
    /// There is no atomicity across keys: a failure stops the batch and the
    /// writes before it stay in place.
    pub async fn set_many<K, I>(
        &self,
        values: I,
        save_in_cache: bool,
    ) -> Result<IndexMap<String, Value>, SettingsError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut written = IndexMap::new();
        for (key, value) in values {
            let key = key.into();
            let persisted = self.set_with(&key, value, save_in_cache).await?;
            written.insert(key, persisted);
        }
        Ok(written)
    }

    /// Remove a key
    pub async fn forget(&self, key: &str) -> Result<(), SettingsError> {
        self.set_with(key, Value::Null, false).await.map(|_| ())
    }

    // ===== Cache =====

    /// Drop every cache entry of the current scope; storage is untouched
    pub async fn clear_cache(&self) {
        self.cache.flush(&self.scope).await;
    }

    /// Alias of [`SettingsManager::clear_cache`]
    pub async fn flush(&self) {
        self.clear_cache().await;
    }

    // ===== Helper Methods =====

    async fn write_null(&self, path: &KeyPath) -> Result<(), SettingsError> {
        match (self.null_write, path.nested()) {
            (NullWritePolicy::ClearCache, _) => {}
            (NullWritePolicy::Delete, None) => {
                let existed = self.store.delete(&self.scope, path.root()).await?;
                tracing::info!(key = path.full(), scope = %self.scope, existed, "Setting deleted");
            }
            (NullWritePolicy::Delete, Some(nested)) => {
                self.remove_leaf(path, nested).await?;
            }
        }
        self.cache.forget_root(&self.scope, path.root()).await;
        Ok(())
    }

    async fn remove_leaf(&self, path: &KeyPath, nested: &str) -> Result<(), SettingsError> {
        let Some(setting) = self.store.find_one(&self.scope, path.root()).await? else {
            return Ok(());
        };
        if setting.r#type != SettingType::Array.as_str() {
            return Ok(());
        }

        let mut structure = coerce_on_read(setting.value.as_deref(), &setting.r#type);
        if deep_remove(&mut structure, nested) {
            self.store
                .upsert(
                    &self.scope,
                    path.root(),
                    SettingType::Array,
                    encode_on_write(&structure),
                    setting.cacheable,
                )
                .await?;
            tracing::info!(key = path.full(), scope = %self.scope, "Nested setting removed");
        }
        Ok(())
    }
}

/// Decode a record and follow the key's nested path
fn resolve(setting: &Setting, path: &KeyPath) -> Option<Value> {
    let decoded = coerce_on_read(setting.value.as_deref(), &setting.r#type);
    match path.nested() {
        Some(nested) => deep_get(&decoded, nested).cloned(),
        None => Some(decoded),
    }
}

/// Structure a nested write merges into: the stored one, or a fresh object
fn current_structure(existing: Option<&Setting>) -> Value {
    match existing {
        Some(s) if s.r#type == SettingType::Array.as_str() => {
            coerce_on_read(s.value.as_deref(), &s.r#type)
        }
        _ => empty_structure(),
    }
}
