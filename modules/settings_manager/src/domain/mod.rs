//! Domain layer - business logic and services

pub mod cache;
pub mod coercion;
pub mod manager;
pub mod path;
pub mod repository;

pub use cache::{CacheBackend, CacheLayer, CachedValue, InMemoryTaggedCache};
pub use manager::SettingsManager;
pub use path::KeyPath;
pub use repository::SettingsStore;
