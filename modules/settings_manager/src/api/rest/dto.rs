//! REST DTOs with serde derives for HTTP API

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ===== Setting DTOs =====

/// Stored setting record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingDto {
    /// Record identifier, also the listing cursor
    pub id: i64,

    /// Root key
    #[schema(example = "plan")]
    pub key: String,

    /// Owning bag, absent for general settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag: Option<i64>,

    /// Group inside the bag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Stored value type
    #[schema(example = "array")]
    pub r#type: String,

    /// Decoded value
    pub value: serde_json::Value,

    /// Whether reads of this record are cached
    pub cacheable: bool,

    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Last update timestamp
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Resolved value of one key
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingValueResponse {
    /// Requested key, possibly dotted
    #[schema(example = "plan.tier")]
    pub key: String,

    /// Resolved value
    pub value: serde_json::Value,
}

/// Setting write request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateSettingRequest {
    /// Value to store; required and non-null
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Page of stored settings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsListResponse {
    pub items: Vec<SettingDto>,
    pub per_page: u64,
    /// Pass back as `cursor` to fetch the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
}

// ===== Query parameters =====

/// Scope selection shared by every route
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    /// Bag identifier; absent selects the general scope
    pub bag: Option<i64>,
    /// Group inside the bag; requires `bag`
    pub group: Option<String>,
}

/// Listing parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSettingsQuery {
    /// Bag identifier; absent selects the general scope
    pub bag: Option<i64>,
    /// Group inside the bag; requires `bag`
    pub group: Option<String>,
    /// Comma-separated root keys to restrict the listing to
    pub keys: Option<String>,
    /// Page size
    pub per_page: Option<u64>,
    /// Id of the last record of the previous page
    pub cursor: Option<i64>,
}
