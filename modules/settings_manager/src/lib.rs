//! Settings Manager Module
//!
//! Scoped key-value settings for HyperSpot. Values live in the general scope
//! or inside a bag (optionally narrowed to a group), are addressed by dotted
//! keys that reach into structured values, and are served through a tagged
//! write-through cache.

// Public exports
pub mod contract;
pub use contract::{
    client::SettingsApi, error::SettingsError, PageRequest, Scope, Setting, SettingType,
    SettingsPage,
};

pub mod config;
pub use config::{Config, NullWritePolicy};

pub mod module;
pub use module::SettingsManagerModule;

pub use api::native::NativeClient;
pub use api::rest::auth::{AllowAll, BearerToken, RequestAuthorizer};
pub use domain::{CacheBackend, CacheLayer, InMemoryTaggedCache, SettingsManager, SettingsStore};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
