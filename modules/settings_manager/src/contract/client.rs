//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to read and write settings.
//! NO HTTP - direct function calls. The scope is an explicit argument on every
//! call, so one client can serve any number of concurrent sessions.

use super::{error::SettingsError, scope::Scope};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Settings manager API for inter-module communication
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Resolve a (possibly dotted) key, `None` when absent
    async fn get(&self, scope: &Scope, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Write a value; `Value::Null` deletes
    async fn set(&self, scope: &Scope, key: &str, value: Value) -> Result<Value, SettingsError>;

    /// Resolve several keys, omitting absent ones
    async fn get_many(
        &self,
        scope: &Scope,
        keys: &[String],
    ) -> Result<HashMap<String, Value>, SettingsError>;

    /// Write several keys in order, without cross-key atomicity
    async fn set_many(
        &self,
        scope: &Scope,
        values: IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>, SettingsError>;

    /// Remove a key (same as writing `Value::Null`)
    async fn forget(&self, scope: &Scope, key: &str) -> Result<(), SettingsError>;

    /// Drop every cache entry of the scope
    async fn clear_cache(&self, scope: &Scope) -> Result<(), SettingsError>;
}
