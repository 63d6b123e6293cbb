//! In-process client tests

mod common;

use common::MockSettingsStore;
use indexmap::IndexMap;
use serde_json::json;
use settings_manager::{Config, Scope, SettingsApi, SettingsManagerModule};

#[tokio::test]
async fn test_client_passes_scope_per_call() {
    let module = SettingsManagerModule::default();
    module
        .init_with_store(Config::default(), MockSettingsStore::new())
        .unwrap();
    let client = module.client().unwrap();

    let tenant = Scope::bag(9, Some("billing"));
    client.set(&tenant, "plan.tier", json!("gold")).await.unwrap();
    client.set(&Scope::general(), "retries", json!(3)).await.unwrap();

    assert_eq!(
        client.get(&tenant, "plan.tier").await.unwrap(),
        Some(json!("gold"))
    );
    assert_eq!(client.get(&tenant, "retries").await.unwrap(), None);
    assert_eq!(
        client.get(&Scope::general(), "retries").await.unwrap(),
        Some(json!(3))
    );
}

#[tokio::test]
async fn test_client_batch_operations() {
    let module = SettingsManagerModule::default();
    module
        .init_with_store(Config::default(), MockSettingsStore::new())
        .unwrap();
    let client = module.client().unwrap();
    let scope = Scope::bag(1, None);

    let mut values = IndexMap::new();
    values.insert("a".to_string(), json!(1));
    values.insert("b".to_string(), json!("two"));
    let written = client.set_many(&scope, values).await.unwrap();
    assert_eq!(written.len(), 2);

    let read = client
        .get_many(&scope, &["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(read.len(), 2);
    assert_eq!(read["b"], json!("two"));

    client.forget(&scope, "a").await.unwrap();
    client.clear_cache(&scope).await.unwrap();
    assert_eq!(client.get(&scope, "a").await.unwrap(), None);
    assert_eq!(client.get(&scope, "b").await.unwrap(), Some(json!("two")));
}

#[tokio::test]
async fn test_client_requires_initialised_module() {
    let module = SettingsManagerModule::default();
    assert!(module.client().is_err());
    assert!(module.manager().is_err());
}
