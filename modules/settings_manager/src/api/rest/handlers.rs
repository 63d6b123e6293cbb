//! HTTP request handlers - thin layer that delegates to the settings manager

use super::{
    dto::*,
    error::{map_domain_error, Problem},
};
use crate::config::Config;
use crate::contract::{PageRequest, SettingsError};
use crate::domain::{KeyPath, SettingsManager};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared state of the REST handlers
#[derive(Clone)]
pub struct RestState {
    pub manager: SettingsManager,
    pub config: Arc<Config>,
}

// ===== Settings Handlers =====

/// List stored settings of a scope
#[utoipa::path(
    get,
    path = "/settings",
    tag = "Settings",
    params(ListSettingsQuery),
    responses(
        (status = 200, description = "Page of settings", body = SettingsListResponse),
        (status = 400, description = "Invalid scope, key or page size", body = Problem),
        (status = 401, description = "Unauthorized", body = Problem),
        (status = 403, description = "Settings API disabled", body = Problem),
    )
)]
pub async fn list_settings(
    Extension(state): Extension<Arc<RestState>>,
    Query(query): Query<ListSettingsQuery>,
) -> Result<Json<SettingsListResponse>, Problem> {
    let scope = query.to_scope().map_err(map_domain_error)?;

    let per_page = query.per_page.unwrap_or(state.config.default_per_page);
    if per_page == 0 || per_page > state.config.max_per_page {
        return Err(Problem::bad_request(format!(
            "per_page must be between 1 and {}",
            state.config.max_per_page
        )));
    }

    let keys = query.key_filter();
    if let Some(keys) = &keys {
        for key in keys {
            // Records are stored under root keys only
            if KeyPath::parse(key).map_err(map_domain_error)?.is_nested() {
                return Err(Problem::bad_request(format!(
                    "keys filter accepts root keys only, got {}",
                    key
                )));
            }
        }
    }

    let request = PageRequest {
        keys,
        per_page,
        cursor: query.cursor,
    };
    let page = state
        .manager
        .with_scope(scope)
        .list(&request)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(page.into()))
}

/// Resolve one key
#[utoipa::path(
    get,
    path = "/settings/{key}",
    tag = "Settings",
    params(
        ("key" = String, Path, description = "Setting key, dotted for nested values"),
        ScopeQuery
    ),
    responses(
        (status = 200, description = "Resolved value", body = SettingValueResponse),
        (status = 400, description = "Invalid key or scope", body = Problem),
        (status = 404, description = "Key not set", body = Problem),
    )
)]
pub async fn get_setting(
    Extension(state): Extension<Arc<RestState>>,
    Path(key): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<SettingValueResponse>, Problem> {
    let scope = query.to_scope().map_err(map_domain_error)?;

    let value = state
        .manager
        .with_scope(scope)
        .get(&key)
        .await
        .map_err(map_domain_error)?
        .ok_or_else(|| {
            map_domain_error(SettingsError::NotFound {
                resource: "Setting".to_string(),
                id: key.clone(),
            })
        })?;

    Ok(Json(SettingValueResponse { key, value }))
}

/// Write one key
#[utoipa::path(
    put,
    path = "/settings/{key}",
    tag = "Settings",
    params(
        ("key" = String, Path, description = "Setting key, dotted for nested values"),
        ScopeQuery
    ),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Persisted value", body = SettingValueResponse),
        (status = 400, description = "Invalid key, scope or value", body = Problem),
    )
)]
pub async fn upsert_setting(
    Extension(state): Extension<Arc<RestState>>,
    Path(key): Path<String>,
    Query(query): Query<ScopeQuery>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<SettingValueResponse>, Problem> {
    let scope = query.to_scope().map_err(map_domain_error)?;
    let value = validate_value(req.value, state.config.max_value_length)?;

    let persisted = state
        .manager
        .with_scope(scope)
        .set(&key, value)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(SettingValueResponse {
        key,
        value: persisted,
    }))
}

/// Delete one key
#[utoipa::path(
    delete,
    path = "/settings/{key}",
    tag = "Settings",
    params(
        ("key" = String, Path, description = "Setting key, dotted for nested values"),
        ScopeQuery
    ),
    responses(
        (status = 204, description = "Key removed"),
        (status = 400, description = "Invalid key or scope", body = Problem),
    )
)]
pub async fn delete_setting(
    Extension(state): Extension<Arc<RestState>>,
    Path(key): Path<String>,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, Problem> {
    let scope = query.to_scope().map_err(map_domain_error)?;

    state
        .manager
        .with_scope(scope)
        .forget(&key)
        .await
        .map_err(map_domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Drop cached entries of a scope
#[utoipa::path(
    delete,
    path = "/settings-cache/clear",
    tag = "Settings",
    params(ScopeQuery),
    responses(
        (status = 204, description = "Cache cleared"),
        (status = 400, description = "Invalid scope", body = Problem),
    )
)]
pub async fn clear_cache(
    Extension(state): Extension<Arc<RestState>>,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, Problem> {
    let scope = query.to_scope().map_err(map_domain_error)?;

    state.manager.with_scope(scope).clear_cache().await;

    Ok(StatusCode::NO_CONTENT)
}

// ===== Helpers =====

fn validate_value(value: Option<Value>, max_length: usize) -> Result<Value, Problem> {
    let value = match value {
        Some(Value::Null) | None => return Err(Problem::bad_request("value is required")),
        Some(value) => value,
    };

    let length = match &value {
        Value::String(s) => s.chars().count(),
        other => other.to_string().chars().count(),
    };
    if length > max_length {
        return Err(Problem::bad_request(format!(
            "value may not be longer than {} characters",
            max_length
        )));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_value() {
        assert!(validate_value(None, 10).is_err());
        assert!(validate_value(Some(Value::Null), 10).is_err());
        assert_eq!(validate_value(Some(json!(5)), 10).unwrap(), json!(5));
        assert_eq!(
            validate_value(Some(json!("0123456789")), 10).unwrap(),
            json!("0123456789")
        );
        assert_eq!(validate_value(Some(json!("0123456789x")), 10).unwrap_err().status, 400);
        assert!(validate_value(Some(json!({"a": "0123456789"})), 10).is_err());
    }
}
