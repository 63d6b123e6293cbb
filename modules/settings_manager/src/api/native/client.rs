//! Native client implementation - wraps the settings manager for in-process calls

use crate::contract::{Scope, SettingsApi, SettingsError};
use crate::domain::SettingsManager;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// Native client implementation that directly calls the settings manager
///
/// Every call binds a fresh manager handle to the requested scope, so the
/// client can be shared between concurrent callers.
#[derive(Clone)]
pub struct NativeClient {
    manager: SettingsManager,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(manager: SettingsManager) -> Self {
        Self { manager }
    }

    fn scoped(&self, scope: &Scope) -> SettingsManager {
        self.manager.with_scope(scope.clone())
    }
}

#[async_trait]
impl SettingsApi for NativeClient {
    async fn get(&self, scope: &Scope, key: &str) -> Result<Option<Value>, SettingsError> {
        self.scoped(scope).get(key).await
    }

    async fn set(&self, scope: &Scope, key: &str, value: Value) -> Result<Value, SettingsError> {
        self.scoped(scope).set(key, value).await
    }

    async fn get_many(
        &self,
        scope: &Scope,
        keys: &[String],
    ) -> Result<HashMap<String, Value>, SettingsError> {
        self.scoped(scope).get_many(keys).await
    }

    async fn set_many(
        &self,
        scope: &Scope,
        values: IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>, SettingsError> {
        self.scoped(scope).set_many(values, true).await
    }

    async fn forget(&self, scope: &Scope, key: &str) -> Result<(), SettingsError> {
        self.scoped(scope).forget(key).await
    }

    async fn clear_cache(&self, scope: &Scope) -> Result<(), SettingsError> {
        self.scoped(scope).clear_cache().await;
        Ok(())
    }
}
