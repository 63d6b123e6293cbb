//! Module declaration and lifecycle implementation

use crate::api::rest::auth::RequestAuthorizer;
use crate::config::Config;
use crate::contract::SettingsApi;
use crate::domain::{CacheLayer, InMemoryTaggedCache, SettingsManager, SettingsStore};
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Settings manager module
///
/// Lifecycle: `migrate` prepares the schema, `init` wires the store, cache and
/// manager, `register_rest` mounts the HTTP routes.
pub struct SettingsManagerModule {
    config: RwLock<Arc<Config>>,
    manager: RwLock<Option<SettingsManager>>,
}

impl Default for SettingsManagerModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Arc::new(Config::default())),
            manager: RwLock::new(None),
        }
    }
}

impl SettingsManagerModule {
    /// Wire the module against a database connection
    pub async fn init(&self, cfg: Config, db: Arc<DatabaseConnection>) -> Result<()> {
        let store = Arc::new(crate::infra::storage::SeaOrmSettingsStore::new(db));
        self.init_with_store(cfg, store)
    }

    /// Wire the module against any store implementation
    pub fn init_with_store(&self, cfg: Config, store: Arc<dyn SettingsStore>) -> Result<()> {
        let cache = CacheLayer::new(
            Arc::new(InMemoryTaggedCache::new()),
            cfg.enable_cache,
            cfg.cache_ttl(),
        );
        let manager = SettingsManager::from_config(store, cache, &cfg);

        tracing::info!(
            enable_cache = cfg.enable_cache,
            cache_expiration = cfg.cache_expiration,
            null_write = ?cfg.null_write,
            enable_api = cfg.enable_api,
            "Settings manager initialized"
        );

        *self.config.write() = Arc::new(cfg);
        *self.manager.write() = Some(manager);
        Ok(())
    }

    /// Run pending database migrations
    pub async fn migrate(&self, db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Settings manager migrations completed");
        Ok(())
    }

    /// Manager handle in the general scope
    pub fn manager(&self) -> Result<SettingsManager> {
        self.manager
            .read()
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Settings manager not initialized"))
    }

    /// In-process client for other modules
    pub fn client(&self) -> Result<Arc<dyn SettingsApi>> {
        let client = crate::api::native::NativeClient::new(self.manager()?);
        Ok(Arc::new(client))
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.read().clone()
    }

    /// Mount the REST routes onto `router`
    pub fn register_rest(
        &self,
        router: axum::Router,
        authorizer: Arc<dyn RequestAuthorizer>,
    ) -> Result<axum::Router> {
        let manager = self.manager()?;
        let config = self.config();

        if !config.enable_api {
            tracing::warn!("Settings API is disabled; routes will answer 403");
        }
        tracing::info!("Registering settings manager REST routes");
        Ok(crate::api::rest::routes::register_routes(
            router, manager, config, authorizer,
        ))
    }
}
