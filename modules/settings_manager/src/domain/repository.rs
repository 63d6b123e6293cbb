//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use crate::contract::{PageRequest, Scope, Setting, SettingType, SettingsPage};
use anyhow::Result;
use async_trait::async_trait;

/// Durable settings storage
///
/// Every call names its scope explicitly; a `None` bag or group in the scope
/// only matches records where that column is absent.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Find the record of one root key
    async fn find_one(&self, scope: &Scope, key: &str) -> Result<Option<Setting>>;

    /// Find the records of several root keys; absent keys are skipped
    async fn find_many(&self, scope: &Scope, keys: &[String]) -> Result<Vec<Setting>>;

    /// Create the record if absent, else update its type and value in place.
    ///
    /// `cacheable` is only applied when the record is created.
    async fn upsert(
        &self,
        scope: &Scope,
        key: &str,
        r#type: SettingType,
        value: Option<String>,
        cacheable: bool,
    ) -> Result<Setting>;

    /// Delete the record of one root key, returning whether it existed
    async fn delete(&self, scope: &Scope, key: &str) -> Result<bool>;

    /// List records of the scope in id order
    async fn paginate(&self, scope: &Scope, request: &PageRequest) -> Result<SettingsPage>;
}
